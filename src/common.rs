//! 全局基础类型与错误定义

use thiserror::Error;

// ── ID 类型别名 ───────────────────────────────────────────────────────────────

pub type RowId = usize;
pub type ColId = usize;

/// 单个字段的字节宽度（Int32）
pub const FIELD_LEN: usize = 4;

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OlapError {
    #[error("field out of range: row={row} col={col} (table is {num_rows}x{num_cols})")]
    OutOfRange {
        row:      RowId,
        col:      ColId,
        num_rows: usize,
        num_cols: usize,
    },
    #[error("table accessed before load")]
    Uninitialized,
    #[error("record {row} has {actual} bytes, expected {expected}")]
    RecordWidth {
        row:      RowId,
        expected: usize,
        actual:   usize,
    },
    #[error("invalid index column {col} for a table with {num_cols} columns")]
    InvalidIndexColumn { col: ColId, num_cols: usize },
    #[error("table needs at least {required} columns, got {actual}")]
    TooFewColumns { required: usize, actual: usize },
    #[error("index corrupted: {0}")]
    IndexCorrupted(String),
    #[error("table lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, OlapError>;
