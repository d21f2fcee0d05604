//! 四个固定查询的全表扫描实现
//!
//! 无索引引擎直接使用；带索引的引擎在索引无法覆盖谓词时回退到这里。
//!
//! | 查询                         | 语义                                             |
//! |------------------------------|--------------------------------------------------|
//! | `column_sum`                 | `SELECT SUM(col0)`                               |
//! | `predicated_column_sum`      | `SELECT SUM(col0) WHERE col1 > t1 AND col2 < t2` |
//! | `predicated_all_columns_sum` | `SELECT SUM(col0)+..+SUM(colN) WHERE col0 > t`   |
//! | `predicated_update`          | `UPDATE col3 = col3 + col2 WHERE col0 < t`       |

use crate::common::Result;
use crate::layout::FieldBuffer;

pub fn column_sum(buf: &FieldBuffer) -> Result<i64> {
    buf.check_col(0)?;
    Ok(buf.column(0).map(i64::from).sum())
}

pub fn predicated_column_sum(buf: &FieldBuffer, threshold1: i32, threshold2: i32) -> Result<i64> {
    buf.check_col(2)?;
    let mut sum = 0i64;
    for row in 0..buf.num_rows() {
        if buf.read(row, 1) > threshold1 && buf.read(row, 2) < threshold2 {
            sum += buf.read(row, 0) as i64;
        }
    }
    Ok(sum)
}

pub fn predicated_all_columns_sum(buf: &FieldBuffer, threshold: i32) -> Result<i64> {
    buf.check_col(0)?;
    Ok((0..buf.num_rows())
        .filter(|&row| buf.read(row, 0) > threshold)
        .map(|row| buf.row_sum(row))
        .sum())
}

/// 直接改写缓冲区；只适用于 col3 上没有索引的引擎
pub fn predicated_update(buf: &mut FieldBuffer, threshold: i32) -> Result<usize> {
    buf.check_col(3)?;
    let mut updated = 0;
    for row in 0..buf.num_rows() {
        if buf.read(row, 0) < threshold {
            let v = buf.read(row, 3).wrapping_add(buf.read(row, 2));
            buf.write(row, 3, v);
            updated += 1;
        }
    }
    Ok(updated)
}
