//! 表的统一接口
//!
//! 四种引擎（行存、列存、单索引行存、多索引行存）都只通过该接口访问，
//! 因此同一份数据和同一组查询可以在不同引擎间直接对比。

use crate::common::{ColId, Result, RowId};
use crate::loader::DataLoader;

pub trait Table: Send + Sync {
    /// 引擎名（日志与 demo 使用）
    fn name(&self) -> &'static str;

    /// 一次性装载全部数据；再次调用会丢弃旧状态并重建，
    /// 装载失败后表回到未初始化状态
    fn load(&mut self, loader: &dyn DataLoader) -> Result<()>;

    fn num_rows(&self) -> usize;
    fn num_cols(&self) -> usize;

    fn get_int_field(&self, row: RowId, col: ColId) -> Result<i32>;

    /// 唯一的写入口：缓冲区、索引、聚合在一次调用中同时更新
    fn put_int_field(&mut self, row: RowId, col: ColId, value: i32) -> Result<()>;

    /// `SELECT SUM(col0) FROM table`
    fn column_sum(&self) -> Result<i64>;

    /// `SELECT SUM(col0) FROM table WHERE col1 > threshold1 AND col2 < threshold2`
    fn predicated_column_sum(&self, threshold1: i32, threshold2: i32) -> Result<i64>;

    /// `SELECT SUM(col0) + ... + SUM(colN) FROM table WHERE col0 > threshold`
    fn predicated_all_columns_sum(&self, threshold: i32) -> Result<i64>;

    /// `UPDATE table SET col3 = col3 + col2 WHERE col0 < threshold`，返回更新行数
    fn predicated_update(&mut self, threshold: i32) -> Result<usize>;

    /// 用全表扫描重建所有索引/聚合并与现有结构比较
    fn verify_integrity(&self) -> Result<()> {
        Ok(())
    }
}
