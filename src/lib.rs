//! # olap-memstore
//!
//! 内存中的 Int32 表存储引擎，用于对比不同物理布局与索引方案在
//! 扫描 / 聚合 / 更新类 OLAP 负载下的表现。
//!
//! ## 整体架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Table trait（统一访问接口）                   │
//! │  load · get/put_int_field · 4 个固定查询 · verify_integrity  │
//! ├──────────────┬──────────────┬───────────────┬───────────────┤
//! │  RowTable    │ ColumnTable  │IndexedRowTable│  CustomTable  │
//! │  行存扫描    │  列存扫描    │ 行存+单列索引 │ 行存+col0索引 │
//! │              │              │               │ +(col1,col2)  │
//! │              │              │               │  组合索引+Σ   │
//! ├──────────────┴──────────────┴───────────────┴───────────────┤
//! │  scan   全表扫描实现     index   RangeIndex / CompositeIndex │
//! ├─────────────────────────────────────────────────────────────┤
//! │  layout  FieldBuffer（RowMajor / ColumnMajor 偏移）          │
//! │  codec   4 字节定长字段编解码（byteorder）                   │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲
//!     loader::DataLoader（外部数据源，一次性 load）
//! ```
//!
//! 固定查询：
//!
//! ```sql
//! SELECT SUM(col0) FROM t;
//! SELECT SUM(col0) FROM t WHERE col1 > ? AND col2 < ?;
//! SELECT SUM(col0) + ... + SUM(colN) FROM t WHERE col0 > ?;
//! UPDATE t SET col3 = col3 + col2 WHERE col0 < ?;
//! ```

// ── 基础层 ────────────────────────────────────────────────────────────────────
pub mod common;
pub mod codec;
pub mod loader;
pub mod layout;

// ── 查询与索引 ────────────────────────────────────────────────────────────────
pub mod scan;
pub mod index;

// ── 表引擎 ────────────────────────────────────────────────────────────────────
pub mod table;
pub mod row_table;
pub mod column_table;
pub mod indexed_table;
pub mod custom_table;
pub mod storage;

pub use common::{OlapError, Result};
pub use loader::{DataLoader, MemoryLoader};
pub use storage::{open_table, EngineKind, SharedTable, TableConfig};
pub use table::Table;
