//! 内存索引结构
//!
//! 三种索引：
//! - **RangeIndex**：列值 → 行号集合，有序，支持单侧有界遍历
//! - **CompositeIndex**：(col1, col2) 两级有序索引，叶子携带 col0 的累加和
//! - **RunningTotal**：col0 的全表累加和
//!
//! 所有"取桶 → 修改 → 写回"都通过 `get_mut` / `entry` 显式完成，
//! 桶变空时立即从树中删除，因此树里只存在非空的 key。

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use crate::common::RowId;

// ── Range Index ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct RangeIndex {
    /// key → 当前该列值等于 key 的行号（无序）
    buckets: BTreeMap<i32, Vec<RowId>>,
    rows:    usize,
}

impl RangeIndex {
    /// 以迭代位置作为行号建索引
    pub fn build(keys: impl IntoIterator<Item = i32>) -> Self {
        let mut index = Self::default();
        for (row, key) in keys.into_iter().enumerate() {
            index.insert(key, row);
        }
        index
    }

    pub fn insert(&mut self, key: i32, row: RowId) {
        self.buckets.entry(key).or_default().push(row);
        self.rows += 1;
    }

    /// 从 key 的桶中移除 row；返回 row 是否确实在桶中
    pub fn remove(&mut self, key: i32, row: RowId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key) else { return false };
        let Some(pos) = bucket.iter().position(|&r| r == row) else { return false };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        self.rows -= 1;
        true
    }

    /// 行的索引列从 `old` 变为 `new`
    pub fn relocate(&mut self, row: RowId, old: i32, new: i32) {
        if old == new {
            return;
        }
        let found = self.remove(old, row);
        debug_assert!(found, "row {row} missing from bucket {old}");
        self.insert(new, row);
        tracing::trace!(row, old, new, "range index relocate");
    }

    #[cfg(test)]
    pub fn num_rows(&self) -> usize { self.rows }

    pub fn num_keys(&self) -> usize { self.buckets.len() }

    /// 所有 key > `bound` 的行，按 key 升序
    pub fn rows_above(&self, bound: i32) -> impl Iterator<Item = RowId> + '_ {
        self.buckets
            .range((Excluded(bound), Unbounded))
            .flat_map(|(_, rows)| rows.iter().copied())
    }

    /// 所有 key < `bound` 的行，按 key 升序
    pub fn rows_below(&self, bound: i32) -> impl Iterator<Item = RowId> + '_ {
        self.buckets
            .range(..bound)
            .flat_map(|(_, rows)| rows.iter().copied())
    }

    /// 忽略桶内顺序比较两棵索引
    pub fn same_entries(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.buckets.len() == other.buckets.len()
            && self.buckets.iter().zip(&other.buckets).all(|((ka, a), (kb, b))| {
                let (mut a, mut b) = (a.clone(), b.clone());
                a.sort_unstable();
                b.sort_unstable();
                ka == kb && a == b
            })
    }
}

// ── Composite Index ───────────────────────────────────────────────────────────

/// 一个 (col1, col2) 组合上的聚合叶子
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub rows: usize,
    pub sum:  i64,
}

/// 两级索引：col1 → col2 → Σcol0
#[derive(Debug, Default, Clone)]
pub struct CompositeIndex {
    outer:  BTreeMap<i32, BTreeMap<i32, Leaf>>,
    leaves: usize,
}

impl CompositeIndex {
    /// `rows` 为每行的 (col0, col1, col2)
    pub fn build(rows: impl IntoIterator<Item = (i32, i32, i32)>) -> Self {
        let mut index = Self::default();
        for (v0, v1, v2) in rows {
            index.add(v1, v2, v0);
        }
        index
    }

    /// 一行 (outer, inner) 加入索引，叶子按需创建
    pub fn add(&mut self, outer: i32, inner: i32, value: i32) {
        let leaf = self.outer.entry(outer).or_default().entry(inner).or_insert_with(|| {
            self.leaves += 1;
            Leaf::default()
        });
        leaf.rows += 1;
        leaf.sum  += value as i64;
    }

    /// 一行离开 (outer, inner)；叶子行数归零即删除
    pub fn subtract(&mut self, outer: i32, inner: i32, value: i32) {
        let Some(inner_map) = self.outer.get_mut(&outer) else {
            debug_assert!(false, "composite key ({outer},{inner}) missing");
            return;
        };
        let Some(leaf) = inner_map.get_mut(&inner) else {
            debug_assert!(false, "composite key ({outer},{inner}) missing");
            return;
        };
        leaf.rows -= 1;
        leaf.sum  -= value as i64;
        if leaf.rows == 0 {
            inner_map.remove(&inner);
            self.leaves -= 1;
            if inner_map.is_empty() {
                self.outer.remove(&outer);
            }
        }
    }

    /// 行的 col0 改变，叶子归属不变
    pub fn adjust(&mut self, outer: i32, inner: i32, delta: i64) {
        match self.outer.get_mut(&outer).and_then(|m| m.get_mut(&inner)) {
            Some(leaf) => leaf.sum += delta,
            None => debug_assert!(false, "composite key ({outer},{inner}) missing"),
        }
    }

    /// 行从一个组合移动到另一个组合
    pub fn relocate(&mut self, old: (i32, i32), new: (i32, i32), value: i32) {
        if old == new {
            return;
        }
        self.subtract(old.0, old.1, value);
        self.add(new.0, new.1, value);
        tracing::trace!(?old, ?new, value, "composite index relocate");
    }

    /// Σ leaf.sum，其中 outer > `outer_bound` 且 inner < `inner_bound`
    ///
    /// 外层游标自 `outer_bound` 之后升序，内层游标从小于 `inner_bound`
    /// 的最大 key 开始降序，两个游标各自受自己的边界约束。
    pub fn sum_where(&self, outer_bound: i32, inner_bound: i32) -> i64 {
        self.outer
            .range((Excluded(outer_bound), Unbounded))
            .map(|(_, inner)| {
                inner
                    .range(..inner_bound)
                    .rev()
                    .filter(|(_, leaf)| leaf.rows > 0)
                    .map(|(_, leaf)| leaf.sum)
                    .sum::<i64>()
            })
            .sum()
    }

    pub fn num_leaves(&self) -> usize { self.leaves }

    #[cfg(test)]
    pub fn leaf(&self, outer: i32, inner: i32) -> Option<Leaf> {
        self.outer.get(&outer).and_then(|m| m.get(&inner)).copied()
    }

    pub fn same_entries(&self, other: &Self) -> bool {
        self.leaves == other.leaves && self.outer == other.outer
    }
}

// ── Running Total ─────────────────────────────────────────────────────────────

/// 预先维护的列累加和
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunningTotal(i64);

impl RunningTotal {
    pub fn build(values: impl IntoIterator<Item = i32>) -> Self {
        Self(values.into_iter().map(i64::from).sum())
    }

    /// 某个字段由 `old` 改为 `new`
    pub fn replace(&mut self, old: i32, new: i32) {
        self.0 += new as i64 - old as i64;
    }

    pub fn get(&self) -> i64 { self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(it: impl Iterator<Item = RowId>) -> Vec<RowId> {
        let mut v: Vec<_> = it.collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn range_walks_are_bounded() {
        let idx = RangeIndex::build([10, 5, 8, 3, 12]);
        assert_eq!(sorted(idx.rows_above(6)), vec![0, 2, 4]);
        assert_eq!(sorted(idx.rows_below(6)), vec![1, 3]);
        assert_eq!(sorted(idx.rows_above(5)), vec![0, 2, 4]);
        assert_eq!(sorted(idx.rows_below(5)), vec![3]);
        assert_eq!(idx.rows_above(i32::MAX).count(), 0);
        assert_eq!(idx.rows_below(i32::MIN).count(), 0);
    }

    #[test]
    fn relocate_drops_empty_buckets() {
        let mut idx = RangeIndex::build([1, 1, 2]);
        idx.relocate(2, 2, 7);
        assert_eq!(idx.num_keys(), 2);
        idx.relocate(0, 1, 7);
        idx.relocate(1, 1, 7);
        assert_eq!(idx.num_keys(), 1);
        assert_eq!(idx.num_rows(), 3);
        assert!(idx.same_entries(&RangeIndex::build([7, 7, 7])));
    }

    #[test]
    fn remove_reports_missing_row() {
        let mut idx = RangeIndex::build([4, 4]);
        assert!(!idx.remove(4, 9));
        assert!(!idx.remove(5, 0));
        assert!(idx.remove(4, 1));
        assert_eq!(idx.num_rows(), 1);
    }

    #[test]
    fn same_entries_ignores_bucket_order() {
        let a = RangeIndex::build([3, 3, 3]);
        let mut b = RangeIndex::default();
        b.insert(3, 2);
        b.insert(3, 0);
        b.insert(3, 1);
        assert!(a.same_entries(&b));
        b.relocate(1, 3, 4);
        assert!(!a.same_entries(&b));
    }

    #[test]
    fn composite_sum_uses_independent_bounds() {
        // (col0, col1, col2)
        let idx = CompositeIndex::build([(10, 1, 5), (5, 9, 1), (8, 2, 9), (3, 7, 2), (12, 4, 0)]);
        assert_eq!(idx.sum_where(4, 5), 8);
        // 外层边界落在 key 范围内部，内层边界大于全部 key
        assert_eq!(idx.sum_where(3, 100), 5 + 3 + 12);
        assert_eq!(idx.sum_where(100, 100), 0);
        assert_eq!(idx.sum_where(i32::MIN, i32::MIN), 0);
    }

    #[test]
    fn composite_leaves_are_pruned() {
        let mut idx = CompositeIndex::build([(4, 1, 1), (6, 1, 1)]);
        assert_eq!(idx.leaf(1, 1), Some(Leaf { rows: 2, sum: 10 }));
        idx.relocate((1, 1), (2, 3), 4);
        idx.relocate((1, 1), (2, 3), 6);
        assert_eq!(idx.leaf(1, 1), None);
        assert_eq!(idx.num_leaves(), 1);
        assert!(idx.same_entries(&CompositeIndex::build([(4, 2, 3), (6, 2, 3)])));
    }

    #[test]
    fn zero_sum_leaf_still_counts_rows() {
        let mut idx = CompositeIndex::build([(5, 1, 1), (-5, 1, 1)]);
        assert_eq!(idx.leaf(1, 1), Some(Leaf { rows: 2, sum: 0 }));
        idx.adjust(1, 1, 7);
        assert_eq!(idx.sum_where(0, 2), 7);
    }

    #[test]
    fn running_total_tracks_replacements() {
        let mut total = RunningTotal::build([i32::MAX, i32::MAX]);
        total.replace(i32::MAX, i32::MIN);
        assert_eq!(total.get(), i32::MAX as i64 + i32::MIN as i64);
    }
}
