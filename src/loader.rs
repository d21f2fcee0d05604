//! 数据装载边界
//!
//! 外部 loader 只需提供列数和每行一条定长记录（`num_cols × 4` 字节）；
//! 表在 `load` 时一次性把记录拷入自己的缓冲区。

use crate::codec::FieldOrder;
use crate::common::{OlapError, Result, FIELD_LEN};

pub trait DataLoader {
    fn num_cols(&self) -> usize;

    /// 每行一条记录，按列顺序排列的 Int32
    fn rows(&self) -> &[Vec<u8>];

    /// 记录使用的字节序
    fn field_order(&self) -> FieldOrder {
        FieldOrder::Big
    }

    fn num_rows(&self) -> usize {
        self.rows().len()
    }
}

// ── MemoryLoader ──────────────────────────────────────────────────────────────

/// 内存中的 loader，测试与 demo 使用
#[derive(Debug, Clone)]
pub struct MemoryLoader {
    num_cols: usize,
    order:    FieldOrder,
    rows:     Vec<Vec<u8>>,
}

impl MemoryLoader {
    /// 直接使用已编码的记录
    pub fn from_records(num_cols: usize, order: FieldOrder, rows: Vec<Vec<u8>>) -> Self {
        Self { num_cols, order, rows }
    }

    /// 从整数行构建（大端编码）
    pub fn from_rows(num_cols: usize, rows: &[Vec<i32>]) -> Self {
        Self::from_rows_with_order(num_cols, FieldOrder::Big, rows)
    }

    pub fn from_rows_with_order(num_cols: usize, order: FieldOrder, rows: &[Vec<i32>]) -> Self {
        let rows = rows.iter().map(|r| order.encode_record(r)).collect();
        Self { num_cols, order, rows }
    }

    /// 从列向量构建：`columns[c][r]` 为第 r 行第 c 列
    ///
    /// 各列长度不一致时，第一条缺字段的行报 `RecordWidth`。
    pub fn from_columns(columns: &[Vec<i32>]) -> Result<Self> {
        let num_cols = columns.len();
        let num_rows = columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(num_rows);
        for r in 0..num_rows {
            let row: Vec<i32> = columns.iter().filter_map(|col| col.get(r).copied()).collect();
            if row.len() != num_cols {
                return Err(OlapError::RecordWidth {
                    row:      r,
                    expected: num_cols * FIELD_LEN,
                    actual:   row.len() * FIELD_LEN,
                });
            }
            rows.push(row);
        }
        Ok(Self::from_rows(num_cols, &rows))
    }
}

impl DataLoader for MemoryLoader {
    fn num_cols(&self) -> usize { self.num_cols }
    fn rows(&self) -> &[Vec<u8>] { &self.rows }
    fn field_order(&self) -> FieldOrder { self.order }
}
