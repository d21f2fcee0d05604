//! 引擎配置、构建与共享句柄

use std::sync::{Arc, RwLock};
use crate::codec::FieldOrder;
use crate::column_table::ColumnTable;
use crate::common::{ColId, OlapError, Result, RowId};
use crate::custom_table::CustomTable;
use crate::indexed_table::IndexedRowTable;
use crate::loader::DataLoader;
use crate::row_table::RowTable;
use crate::table::Table;

// ── 配置 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// 行存，无索引
    Row,
    /// 列存，无索引
    Column,
    /// 行存 + `index_column` 上的单列索引
    Indexed,
    /// 行存 + col0 索引 + (col1,col2) 组合索引 + col0 累加和
    Custom,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [Self::Row, Self::Column, Self::Indexed, Self::Custom];
}

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub kind:         EngineKind,
    /// 仅 `EngineKind::Indexed` 使用
    pub index_column: ColId,
    pub field_order:  FieldOrder,
}

impl TableConfig {
    pub fn new(kind: EngineKind) -> Self {
        Self { kind, index_column: 0, field_order: FieldOrder::default() }
    }

    pub fn with_index_column(mut self, col: ColId) -> Self {
        self.index_column = col; self
    }
    pub fn with_field_order(mut self, order: FieldOrder) -> Self {
        self.field_order = order; self
    }

    /// 构建一个尚未装载数据的空表
    pub fn open(&self) -> Result<Box<dyn Table>> {
        open_table(self)
    }
}

pub fn open_table(config: &TableConfig) -> Result<Box<dyn Table>> {
    let order = config.field_order;
    let table: Box<dyn Table> = match config.kind {
        EngineKind::Row     => Box::new(RowTable::with_order(order)),
        EngineKind::Column  => Box::new(ColumnTable::with_order(order)),
        EngineKind::Indexed => Box::new(IndexedRowTable::with_order(config.index_column, order)?),
        EngineKind::Custom  => Box::new(CustomTable::with_order(order)),
    };
    Ok(table)
}

// ── 共享句柄 ──────────────────────────────────────────────────────────────────

/// 多线程共享的表句柄
///
/// 每张表一把读写锁：写字段与 `predicated_update` 持有写锁，
/// 缓冲区、索引、聚合在同一个临界区内一起变更，读者不会看到中间状态。
#[derive(Clone)]
pub struct SharedTable(Arc<RwLock<Box<dyn Table>>>);

impl SharedTable {
    pub fn new(table: Box<dyn Table>) -> Self {
        Self(Arc::new(RwLock::new(table)))
    }

    fn read<T>(&self, f: impl FnOnce(&dyn Table) -> Result<T>) -> Result<T> {
        let guard = self.0.read().map_err(|_| OlapError::LockPoisoned)?;
        f(&**guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut dyn Table) -> Result<T>) -> Result<T> {
        let mut guard = self.0.write().map_err(|_| OlapError::LockPoisoned)?;
        f(&mut **guard)
    }

    pub fn name(&self) -> Result<&'static str> {
        self.read(|t| Ok(t.name()))
    }

    pub fn load(&self, loader: &dyn DataLoader) -> Result<()> {
        self.write(|t| t.load(loader))
    }

    pub fn num_rows(&self) -> Result<usize> {
        self.read(|t| Ok(t.num_rows()))
    }

    pub fn get_int_field(&self, row: RowId, col: ColId) -> Result<i32> {
        self.read(|t| t.get_int_field(row, col))
    }

    pub fn put_int_field(&self, row: RowId, col: ColId, value: i32) -> Result<()> {
        self.write(|t| t.put_int_field(row, col, value))
    }

    pub fn column_sum(&self) -> Result<i64> {
        self.read(|t| t.column_sum())
    }

    pub fn predicated_column_sum(&self, threshold1: i32, threshold2: i32) -> Result<i64> {
        self.read(|t| t.predicated_column_sum(threshold1, threshold2))
    }

    pub fn predicated_all_columns_sum(&self, threshold: i32) -> Result<i64> {
        self.read(|t| t.predicated_all_columns_sum(threshold))
    }

    pub fn predicated_update(&self, threshold: i32) -> Result<usize> {
        self.write(|t| t.predicated_update(threshold))
    }

    pub fn verify_integrity(&self) -> Result<()> {
        self.read(|t| t.verify_integrity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use std::thread;

    #[test]
    fn config_rejects_bad_index_column() {
        let cfg = TableConfig::new(EngineKind::Indexed).with_index_column(7);
        assert!(matches!(cfg.open(), Err(OlapError::InvalidIndexColumn { col: 7, .. })));
        // 非 Indexed 引擎忽略 index_column
        assert!(TableConfig::new(EngineKind::Row).with_index_column(7).open().is_ok());
    }

    #[test]
    fn engine_names() {
        let names: Vec<_> = EngineKind::ALL
            .iter()
            .map(|&k| TableConfig::new(k).open().unwrap().name())
            .collect();
        assert_eq!(names, vec!["row", "column", "indexed", "custom"]);
    }

    #[test]
    fn concurrent_writers_keep_indexes_consistent() {
        let rows: Vec<Vec<i32>> = (0..64).map(|i| vec![i, i % 7, i % 5, 0]).collect();
        let loader = MemoryLoader::from_rows(4, &rows);
        let shared = SharedTable::new(TableConfig::new(EngineKind::Custom).open().unwrap());
        shared.load(&loader).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|w| {
                let t = shared.clone();
                thread::spawn(move || {
                    for r in (w..64).step_by(4) {
                        t.put_int_field(r, 0, 1).unwrap();
                        t.put_int_field(r, 1, w as i32).unwrap();
                        let _ = t.predicated_column_sum(0, 3).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.column_sum().unwrap(), 64);
        assert_eq!(shared.num_rows().unwrap(), 64);
        shared.verify_integrity().unwrap();
    }

    #[test]
    fn panicking_writer_poisons_the_table() {
        let shared = SharedTable::new(TableConfig::new(EngineKind::Row).open().unwrap());
        shared.load(&MemoryLoader::from_rows(1, &[vec![3]])).unwrap();

        let t = shared.clone();
        let crashed = thread::spawn(move || {
            t.write(|table| -> Result<()> {
                table.put_int_field(0, 0, 4)?;
                panic!("writer died inside the critical section");
            })
        })
        .join();
        assert!(crashed.is_err());

        assert_eq!(shared.column_sum(), Err(OlapError::LockPoisoned));
        assert_eq!(shared.put_int_field(0, 0, 5), Err(OlapError::LockPoisoned));
        assert_eq!(shared.name(), Err(OlapError::LockPoisoned));
    }
}
