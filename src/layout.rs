//! 物理布局与扁平字段缓冲区
//!
//! ```text
//! RowMajor    : | r0c0 r0c1 .. r0cm | r1c0 r1c1 .. | ...
//! ColumnMajor : | r0c0 r1c0 .. rnc0 | r0c1 r1c1 .. | ...
//! ```
//!
//! 两种布局只有偏移公式不同，其余逻辑完全共享。

use crate::codec::FieldOrder;
use crate::common::{ColId, OlapError, Result, RowId, FIELD_LEN};
use crate::loader::DataLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    RowMajor,
    ColumnMajor,
}

impl Layout {
    #[inline]
    pub fn offset(self, row: RowId, col: ColId, num_rows: usize, num_cols: usize) -> usize {
        match self {
            Self::RowMajor    => (row * num_cols + col) * FIELD_LEN,
            Self::ColumnMajor => (col * num_rows + row) * FIELD_LEN,
        }
    }
}

// ── FieldBuffer ───────────────────────────────────────────────────────────────

/// 一张表的全部字段：维度 + 扁平字节缓冲区
///
/// 不变量：`data.len() == num_rows * num_cols * FIELD_LEN`
#[derive(Debug, Clone)]
pub struct FieldBuffer {
    layout:   Layout,
    order:    FieldOrder,
    num_rows: usize,
    num_cols: usize,
    data:     Vec<u8>,
}

impl FieldBuffer {
    /// 从 loader 批量装载；记录宽度必须恰为 `num_cols × 4`
    pub fn from_loader(
        layout: Layout,
        order:  FieldOrder,
        loader: &dyn DataLoader,
    ) -> Result<Self> {
        let num_cols  = loader.num_cols();
        let rows      = loader.rows();
        let num_rows  = rows.len();
        let src_order = loader.field_order();
        let width     = num_cols * FIELD_LEN;

        let mut buf = Self {
            layout, order, num_rows, num_cols,
            data: vec![0u8; num_rows * width],
        };
        for (row, record) in rows.iter().enumerate() {
            if record.len() != width {
                return Err(OlapError::RecordWidth { row, expected: width, actual: record.len() });
            }
            for (col, value) in src_order.decode_record(record).enumerate() {
                buf.write(row, col, value);
            }
        }
        Ok(buf)
    }

    pub fn num_rows(&self) -> usize { self.num_rows }
    pub fn num_cols(&self) -> usize { self.num_cols }

    fn out_of_range(&self, row: RowId, col: ColId) -> OlapError {
        OlapError::OutOfRange { row, col, num_rows: self.num_rows, num_cols: self.num_cols }
    }

    pub fn check(&self, row: RowId, col: ColId) -> Result<()> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(self.out_of_range(row, col));
        }
        Ok(())
    }

    /// 查询访问的列必须存在（与行数无关，空表同样校验）
    pub fn check_col(&self, col: ColId) -> Result<()> {
        if col >= self.num_cols {
            return Err(self.out_of_range(0, col));
        }
        Ok(())
    }

    pub fn get(&self, row: RowId, col: ColId) -> Result<i32> {
        self.check(row, col)?;
        Ok(self.read(row, col))
    }

    pub fn put(&mut self, row: RowId, col: ColId, value: i32) -> Result<()> {
        self.check(row, col)?;
        self.write(row, col, value);
        Ok(())
    }

    /// 不做范围检查的读；越界直接 panic
    #[inline]
    pub fn read(&self, row: RowId, col: ColId) -> i32 {
        let off = self.layout.offset(row, col, self.num_rows, self.num_cols);
        self.order.read_i32(&self.data, off)
    }

    #[inline]
    pub fn write(&mut self, row: RowId, col: ColId, value: i32) {
        let off = self.layout.offset(row, col, self.num_rows, self.num_cols);
        self.order.write_i32(&mut self.data, off, value);
    }

    /// 一行所有字段之和
    pub fn row_sum(&self, row: RowId) -> i64 {
        (0..self.num_cols).map(|c| self.read(row, c) as i64).sum()
    }

    /// 按行号顺序遍历一列
    pub fn column(&self, col: ColId) -> impl Iterator<Item = i32> + '_ {
        (0..self.num_rows).map(move |r| self.read(r, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    fn sample(layout: Layout) -> FieldBuffer {
        let loader = MemoryLoader::from_rows(3, &[vec![1, 2, 3], vec![4, 5, 6]]);
        FieldBuffer::from_loader(layout, FieldOrder::Big, &loader).unwrap()
    }

    #[test]
    fn offsets_follow_layout() {
        assert_eq!(Layout::RowMajor.offset(1, 2, 2, 3), (1 * 3 + 2) * 4);
        assert_eq!(Layout::ColumnMajor.offset(1, 2, 2, 3), (2 * 2 + 1) * 4);
    }

    #[test]
    fn both_layouts_read_the_same_matrix() {
        let rm = sample(Layout::RowMajor);
        let cm = sample(Layout::ColumnMajor);
        for r in 0..2 {
            for c in 0..3 {
                assert_eq!(rm.get(r, c).unwrap(), cm.get(r, c).unwrap());
            }
        }
        assert_eq!(cm.column(1).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(rm.row_sum(1), 15);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut buf = sample(Layout::RowMajor);
        assert!(matches!(buf.get(2, 0), Err(OlapError::OutOfRange { row: 2, .. })));
        assert!(matches!(buf.put(0, 3, 9), Err(OlapError::OutOfRange { col: 3, .. })));
        assert!(buf.check_col(2).is_ok());
        assert!(buf.check_col(3).is_err());
    }

    #[test]
    fn short_record_is_rejected() {
        let loader = MemoryLoader::from_records(2, FieldOrder::Big, vec![vec![0u8; 8], vec![0u8; 7]]);
        let err = FieldBuffer::from_loader(Layout::RowMajor, FieldOrder::Big, &loader).unwrap_err();
        assert_eq!(err, OlapError::RecordWidth { row: 1, expected: 8, actual: 7 });
    }

    #[test]
    fn loader_order_is_translated() {
        let loader = MemoryLoader::from_rows_with_order(2, FieldOrder::Little, &[vec![-7, 300]]);
        let buf = FieldBuffer::from_loader(Layout::ColumnMajor, FieldOrder::Big, &loader).unwrap();
        assert_eq!(buf.get(0, 0).unwrap(), -7);
        assert_eq!(buf.get(0, 1).unwrap(), 300);
    }
}
