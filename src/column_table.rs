//! 列存表：`col 0 | col 1 | ... | col m`
//!
//! 与行存只有偏移公式不同；单列聚合在列存上是连续内存访问。

use crate::codec::FieldOrder;
use crate::common::{ColId, OlapError, Result, RowId};
use crate::layout::{FieldBuffer, Layout};
use crate::loader::DataLoader;
use crate::scan;
use crate::table::Table;

#[derive(Debug, Default)]
pub struct ColumnTable {
    order:   FieldOrder,
    columns: Option<FieldBuffer>,
}

impl ColumnTable {
    pub fn new() -> Self { Self::default() }

    pub fn with_order(order: FieldOrder) -> Self {
        Self { order, columns: None }
    }

    fn buffer(&self) -> Result<&FieldBuffer> {
        self.columns.as_ref().ok_or(OlapError::Uninitialized)
    }

    fn buffer_mut(&mut self) -> Result<&mut FieldBuffer> {
        self.columns.as_mut().ok_or(OlapError::Uninitialized)
    }
}

impl Table for ColumnTable {
    fn name(&self) -> &'static str { "column" }

    fn load(&mut self, loader: &dyn DataLoader) -> Result<()> {
        self.columns = None;
        let buf = FieldBuffer::from_loader(Layout::ColumnMajor, self.order, loader)?;
        tracing::debug!(engine = self.name(), rows = buf.num_rows(), cols = buf.num_cols(), "loaded");
        self.columns = Some(buf);
        Ok(())
    }

    fn num_rows(&self) -> usize { self.columns.as_ref().map_or(0, FieldBuffer::num_rows) }
    fn num_cols(&self) -> usize { self.columns.as_ref().map_or(0, FieldBuffer::num_cols) }

    fn get_int_field(&self, row: RowId, col: ColId) -> Result<i32> {
        self.buffer()?.get(row, col)
    }

    fn put_int_field(&mut self, row: RowId, col: ColId, value: i32) -> Result<()> {
        self.buffer_mut()?.put(row, col, value)
    }

    fn column_sum(&self) -> Result<i64> {
        let sum = scan::column_sum(self.buffer()?)?;
        tracing::debug!(engine = self.name(), sum, "column_sum");
        Ok(sum)
    }

    fn predicated_column_sum(&self, threshold1: i32, threshold2: i32) -> Result<i64> {
        let sum = scan::predicated_column_sum(self.buffer()?, threshold1, threshold2)?;
        tracing::debug!(engine = self.name(), threshold1, threshold2, sum, "predicated_column_sum");
        Ok(sum)
    }

    fn predicated_all_columns_sum(&self, threshold: i32) -> Result<i64> {
        let sum = scan::predicated_all_columns_sum(self.buffer()?, threshold)?;
        tracing::debug!(engine = self.name(), threshold, sum, "predicated_all_columns_sum");
        Ok(sum)
    }

    fn predicated_update(&mut self, threshold: i32) -> Result<usize> {
        let updated = scan::predicated_update(self.buffer_mut()?, threshold)?;
        tracing::debug!(engine = self.name(), threshold, updated, "predicated_update");
        Ok(updated)
    }
}
