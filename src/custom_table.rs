//! 针对固定查询组合调优的多索引行存表
//!
//! 同时维护三份派生结构：
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ rows        行存缓冲区                                    │
//! │ col0_index  RangeIndex      col0 → rows                  │  predicated_all_columns_sum / predicated_update
//! │ composite   CompositeIndex  col1 → col2 → (rows, Σcol0)  │  predicated_column_sum
//! │ total       RunningTotal    Σcol0                        │  column_sum，O(1)
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! 所有写入都经过 `put_int_field`，三份结构与缓冲区在同一次调用中更新。

use crate::codec::FieldOrder;
use crate::common::{ColId, OlapError, Result, RowId};
use crate::index::{CompositeIndex, RangeIndex, RunningTotal};
use crate::layout::{FieldBuffer, Layout};
use crate::loader::DataLoader;
use crate::table::Table;

/// 组合索引需要 col0、col1、col2
const REQUIRED_COLUMNS: usize = 3;

#[derive(Debug)]
struct Indexes {
    rows:       FieldBuffer,
    col0_index: RangeIndex,
    composite:  CompositeIndex,
    total:      RunningTotal,
}

impl Indexes {
    fn build(rows: FieldBuffer) -> Self {
        let col0_index = RangeIndex::build(rows.column(0));
        let composite  = CompositeIndex::build(
            (0..rows.num_rows()).map(|r| (rows.read(r, 0), rows.read(r, 1), rows.read(r, 2))),
        );
        let total = RunningTotal::build(rows.column(0));
        Self { rows, col0_index, composite, total }
    }
}

#[derive(Debug, Default)]
pub struct CustomTable {
    order: FieldOrder,
    state: Option<Indexes>,
}

impl CustomTable {
    pub fn new() -> Self { Self::default() }

    pub fn with_order(order: FieldOrder) -> Self {
        Self { order, state: None }
    }

    fn state(&self) -> Result<&Indexes> {
        self.state.as_ref().ok_or(OlapError::Uninitialized)
    }

    fn state_mut(&mut self) -> Result<&mut Indexes> {
        self.state.as_mut().ok_or(OlapError::Uninitialized)
    }
}

impl Table for CustomTable {
    fn name(&self) -> &'static str { "custom" }

    fn load(&mut self, loader: &dyn DataLoader) -> Result<()> {
        self.state = None;
        let rows = FieldBuffer::from_loader(Layout::RowMajor, self.order, loader)?;
        if rows.num_cols() < REQUIRED_COLUMNS {
            return Err(OlapError::TooFewColumns {
                required: REQUIRED_COLUMNS,
                actual:   rows.num_cols(),
            });
        }
        let state = Indexes::build(rows);
        tracing::debug!(
            engine = self.name(),
            rows = state.rows.num_rows(),
            cols = state.rows.num_cols(),
            col0_keys = state.col0_index.num_keys(),
            composite_leaves = state.composite.num_leaves(),
            "loaded"
        );
        self.state = Some(state);
        Ok(())
    }

    fn num_rows(&self) -> usize { self.state.as_ref().map_or(0, |s| s.rows.num_rows()) }
    fn num_cols(&self) -> usize { self.state.as_ref().map_or(0, |s| s.rows.num_cols()) }

    fn get_int_field(&self, row: RowId, col: ColId) -> Result<i32> {
        self.state()?.rows.get(row, col)
    }

    fn put_int_field(&mut self, row: RowId, col: ColId, value: i32) -> Result<()> {
        let Indexes { rows, col0_index, composite, total } = self.state_mut()?;
        rows.check(row, col)?;
        // 所有索引都以写入前的快照为旧值
        let old = rows.read(row, col);
        match col {
            0 => {
                total.replace(old, value);
                col0_index.relocate(row, old, value);
                composite.adjust(rows.read(row, 1), rows.read(row, 2), value as i64 - old as i64);
            }
            1 => {
                let v2 = rows.read(row, 2);
                composite.relocate((old, v2), (value, v2), rows.read(row, 0));
            }
            2 => {
                let v1 = rows.read(row, 1);
                composite.relocate((v1, old), (v1, value), rows.read(row, 0));
            }
            _ => {}
        }
        rows.write(row, col, value);
        Ok(())
    }

    fn column_sum(&self) -> Result<i64> {
        let sum = self.state()?.total.get();
        tracing::debug!(engine = self.name(), sum, "column_sum");
        Ok(sum)
    }

    fn predicated_column_sum(&self, threshold1: i32, threshold2: i32) -> Result<i64> {
        let sum = self.state()?.composite.sum_where(threshold1, threshold2);
        tracing::debug!(engine = self.name(), threshold1, threshold2, sum, "predicated_column_sum");
        Ok(sum)
    }

    fn predicated_all_columns_sum(&self, threshold: i32) -> Result<i64> {
        let Indexes { rows, col0_index, .. } = self.state()?;
        let sum: i64 = col0_index.rows_above(threshold).map(|r| rows.row_sum(r)).sum();
        tracing::debug!(engine = self.name(), threshold, sum, "predicated_all_columns_sum");
        Ok(sum)
    }

    fn predicated_update(&mut self, threshold: i32) -> Result<usize> {
        let Indexes { rows, col0_index, .. } = self.state_mut()?;
        rows.check_col(3)?;
        // col3 不在任何索引中，直接改写缓冲区
        let mut updated = 0;
        for r in col0_index.rows_below(threshold) {
            let v = rows.read(r, 3).wrapping_add(rows.read(r, 2));
            rows.write(r, 3, v);
            updated += 1;
        }
        tracing::debug!(engine = self.name(), threshold, updated, "predicated_update");
        Ok(updated)
    }

    fn verify_integrity(&self) -> Result<()> {
        let live    = self.state()?;
        let rebuilt = Indexes::build(live.rows.clone());

        let mut diverged = Vec::new();
        if !rebuilt.col0_index.same_entries(&live.col0_index) {
            diverged.push("col0 range index");
        }
        if !rebuilt.composite.same_entries(&live.composite) {
            diverged.push("composite index");
        }
        if rebuilt.total != live.total {
            diverged.push("col0 running total");
        }
        if diverged.is_empty() {
            return Ok(());
        }
        tracing::warn!(?diverged, "derived structures diverged from buffer");
        Err(OlapError::IndexCorrupted(diverged.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    fn loaded() -> CustomTable {
        let loader = MemoryLoader::from_columns(&[
            vec![10, 5, 8, 3, 12],
            vec![1, 9, 2, 7, 4],
            vec![5, 1, 9, 2, 0],
            vec![0, 0, 0, 0, 0],
        ])
        .unwrap();
        let mut t = CustomTable::new();
        t.load(&loader).unwrap();
        t
    }

    #[test]
    fn scenario_queries() {
        let mut t = loaded();
        assert_eq!(t.column_sum().unwrap(), 38);
        assert_eq!(t.predicated_column_sum(4, 5).unwrap(), 8);
        assert_eq!(t.predicated_all_columns_sum(6).unwrap(), 51);
        assert_eq!(t.predicated_update(6).unwrap(), 2);
        assert_eq!(t.get_int_field(1, 3).unwrap(), 1);
        assert_eq!(t.get_int_field(3, 3).unwrap(), 2);
        t.verify_integrity().unwrap();
    }

    #[test]
    fn col0_write_updates_total_and_composite() {
        let mut t = loaded();
        // row1 = (5, 9, 1) 满足 col1 > 4 && col2 < 5
        t.put_int_field(1, 0, 100).unwrap();
        assert_eq!(t.column_sum().unwrap(), 38 - 5 + 100);
        assert_eq!(t.predicated_column_sum(4, 5).unwrap(), 103);
        assert_eq!(t.predicated_all_columns_sum(50).unwrap(), 100 + 9 + 1);
        t.verify_integrity().unwrap();
    }

    #[test]
    fn col1_and_col2_writes_move_composite_leaves() {
        let mut t = loaded();
        t.put_int_field(0, 1, 8).unwrap(); // row0 = (10, 8, 5)
        assert_eq!(t.predicated_column_sum(4, 5).unwrap(), 8);
        t.put_int_field(0, 2, 4).unwrap(); // row0 = (10, 8, 4)
        assert_eq!(t.predicated_column_sum(4, 5).unwrap(), 18);
        t.put_int_field(3, 2, 5).unwrap(); // row3 = (3, 7, 5)
        assert_eq!(t.predicated_column_sum(4, 5).unwrap(), 15);
        t.verify_integrity().unwrap();
    }

    #[test]
    fn outer_bound_inside_key_range() {
        let t = loaded();
        // col1 > 7 只剩 row1，内层边界远大于所有 col2
        assert_eq!(t.predicated_column_sum(7, i32::MAX).unwrap(), 5);
        assert_eq!(t.predicated_column_sum(i32::MIN, 1).unwrap(), 12);
    }

    #[test]
    fn rejects_narrow_tables() {
        let mut t = CustomTable::new();
        let err = t.load(&MemoryLoader::from_rows(2, &[vec![1, 2]])).unwrap_err();
        assert_eq!(err, OlapError::TooFewColumns { required: 3, actual: 2 });
        assert_eq!(t.column_sum(), Err(OlapError::Uninitialized));
    }

    #[test]
    fn failed_reload_discards_previous_state() {
        let mut t = loaded();
        let err = t.load(&MemoryLoader::from_rows(1, &[vec![7]])).unwrap_err();
        assert_eq!(err, OlapError::TooFewColumns { required: 3, actual: 1 });
        assert_eq!(t.num_cols(), 0);
        assert_eq!(t.predicated_column_sum(4, 5), Err(OlapError::Uninitialized));
    }

    #[test]
    fn three_column_table_cannot_update() {
        let mut t = CustomTable::new();
        t.load(&MemoryLoader::from_rows(3, &[vec![1, 2, 3]])).unwrap();
        assert_eq!(t.predicated_column_sum(0, 10).unwrap(), 1);
        assert!(matches!(t.predicated_update(5), Err(OlapError::OutOfRange { col: 3, .. })));
    }
}
