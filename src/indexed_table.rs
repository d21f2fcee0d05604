//! 单索引行存表
//!
//! 行存布局 + 一棵建在 `index_column` 上的 [`RangeIndex`]。
//! 查询的谓词列恰好是索引列时走有界索引遍历，否则回退全表扫描。

use crate::codec::FieldOrder;
use crate::common::{ColId, OlapError, Result, RowId};
use crate::index::RangeIndex;
use crate::layout::{FieldBuffer, Layout};
use crate::loader::DataLoader;
use crate::scan;
use crate::table::Table;

/// 固定查询涉及的列数（col0..col3），索引列只能在其中选
pub const QUERY_COLUMNS: usize = 4;

#[derive(Debug)]
struct Indexed {
    rows:  FieldBuffer,
    index: RangeIndex,
}

#[derive(Debug)]
pub struct IndexedRowTable {
    index_column: ColId,
    order:        FieldOrder,
    state:        Option<Indexed>,
}

impl IndexedRowTable {
    pub fn new(index_column: ColId) -> Result<Self> {
        Self::with_order(index_column, FieldOrder::default())
    }

    pub fn with_order(index_column: ColId, order: FieldOrder) -> Result<Self> {
        if index_column >= QUERY_COLUMNS {
            return Err(OlapError::InvalidIndexColumn { col: index_column, num_cols: QUERY_COLUMNS });
        }
        Ok(Self { index_column, order, state: None })
    }

    fn state(&self) -> Result<&Indexed> {
        self.state.as_ref().ok_or(OlapError::Uninitialized)
    }

    fn state_mut(&mut self) -> Result<&mut Indexed> {
        self.state.as_mut().ok_or(OlapError::Uninitialized)
    }
}

impl Table for IndexedRowTable {
    fn name(&self) -> &'static str { "indexed" }

    fn load(&mut self, loader: &dyn DataLoader) -> Result<()> {
        // 旧数据先丢弃，装载失败时表处于未初始化状态
        self.state = None;
        let rows = FieldBuffer::from_loader(Layout::RowMajor, self.order, loader)?;
        if self.index_column >= rows.num_cols() {
            return Err(OlapError::InvalidIndexColumn {
                col:      self.index_column,
                num_cols: rows.num_cols(),
            });
        }
        let index = RangeIndex::build(rows.column(self.index_column));
        tracing::debug!(
            engine = self.name(),
            rows = rows.num_rows(),
            cols = rows.num_cols(),
            index_column = self.index_column,
            keys = index.num_keys(),
            "loaded"
        );
        self.state = Some(Indexed { rows, index });
        Ok(())
    }

    fn num_rows(&self) -> usize { self.state.as_ref().map_or(0, |s| s.rows.num_rows()) }
    fn num_cols(&self) -> usize { self.state.as_ref().map_or(0, |s| s.rows.num_cols()) }

    fn get_int_field(&self, row: RowId, col: ColId) -> Result<i32> {
        self.state()?.rows.get(row, col)
    }

    fn put_int_field(&mut self, row: RowId, col: ColId, value: i32) -> Result<()> {
        let index_column = self.index_column;
        let Indexed { rows, index } = self.state_mut()?;
        rows.check(row, col)?;
        if col == index_column {
            // 旧 key 取写入前的值
            index.relocate(row, rows.read(row, col), value);
        }
        rows.write(row, col, value);
        Ok(())
    }

    fn column_sum(&self) -> Result<i64> {
        let sum = scan::column_sum(&self.state()?.rows)?;
        tracing::debug!(engine = self.name(), sum, "column_sum");
        Ok(sum)
    }

    fn predicated_column_sum(&self, threshold1: i32, threshold2: i32) -> Result<i64> {
        let Indexed { rows, index } = self.state()?;
        rows.check_col(2)?;
        let sum: i64 = match self.index_column {
            1 => index
                .rows_above(threshold1)
                .filter(|&r| rows.read(r, 2) < threshold2)
                .map(|r| rows.read(r, 0) as i64)
                .sum(),
            2 => index
                .rows_below(threshold2)
                .filter(|&r| rows.read(r, 1) > threshold1)
                .map(|r| rows.read(r, 0) as i64)
                .sum(),
            _ => scan::predicated_column_sum(rows, threshold1, threshold2)?,
        };
        tracing::debug!(engine = self.name(), threshold1, threshold2, sum, "predicated_column_sum");
        Ok(sum)
    }

    fn predicated_all_columns_sum(&self, threshold: i32) -> Result<i64> {
        let Indexed { rows, index } = self.state()?;
        let sum: i64 = if self.index_column == 0 {
            index.rows_above(threshold).map(|r| rows.row_sum(r)).sum()
        } else {
            scan::predicated_all_columns_sum(rows, threshold)?
        };
        tracing::debug!(engine = self.name(), threshold, sum, "predicated_all_columns_sum");
        Ok(sum)
    }

    fn predicated_update(&mut self, threshold: i32) -> Result<usize> {
        let index_column = self.index_column;
        let Indexed { rows, index } = self.state_mut()?;
        rows.check_col(3)?;
        let updated: usize = match index_column {
            0 => {
                let mut n = 0;
                for r in index.rows_below(threshold) {
                    let v = rows.read(r, 3).wrapping_add(rows.read(r, 2));
                    rows.write(r, 3, v);
                    n += 1;
                }
                n
            }
            3 => {
                let mut n = 0;
                for r in 0..rows.num_rows() {
                    if rows.read(r, 0) < threshold {
                        let old = rows.read(r, 3);
                        let v   = old.wrapping_add(rows.read(r, 2));
                        index.relocate(r, old, v);
                        rows.write(r, 3, v);
                        n += 1;
                    }
                }
                n
            }
            _ => scan::predicated_update(rows, threshold)?,
        };
        tracing::debug!(engine = self.name(), threshold, updated, "predicated_update");
        Ok(updated)
    }

    fn verify_integrity(&self) -> Result<()> {
        let Indexed { rows, index } = self.state()?;
        let rebuilt = RangeIndex::build(rows.column(self.index_column));
        if !rebuilt.same_entries(index) {
            tracing::warn!(index_column = self.index_column, "range index diverged from buffer");
            return Err(OlapError::IndexCorrupted(format!(
                "range index on col{} diverged from buffer",
                self.index_column
            )));
        }
        Ok(())
    }
}
