pub mod math;

use std::fmt::Debug;

use num::Num;
use serde::{Deserialize, Serialize};

/// SparseVec は 0 要素を省略した疎ベクトルです
/// indices と values を SoA で持ちます
///
/// 要素は indices の昇順でソートされていることを保証します
/// 0 の値は保持しません
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N>
where
    N: Num + Copy,
{
    inds: Vec<u32>,
    vals: Vec<N>,
}

impl<N> Default for SparseVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn new() -> Self {
        SparseVec {
            inds: Vec::new(),
            vals: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        SparseVec {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
        }
    }

    /// 任意順の (index, value) から構築する
    /// 0 は捨て、index 重複は後勝ち
    pub fn from_unsorted(pairs: impl IntoIterator<Item = (u32, N)>) -> Self {
        let mut pairs: Vec<(u32, N)> = pairs.into_iter().filter(|(_, v)| *v != N::zero()).collect();
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut vec = Self::with_capacity(pairs.len());
        for (idx, val) in pairs {
            if vec.inds.last() == Some(&idx) {
                if let Some(last) = vec.vals.last_mut() {
                    *last = val;
                }
            } else {
                vec.inds.push(idx);
                vec.vals.push(val);
            }
        }
        vec
    }

    /// number of stored (non-zero) entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inds.is_empty()
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<N> {
        self.inds
            .binary_search(&index)
            .ok()
            .map(|pos| self.vals[pos])
    }

    /// (index, value) in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.inds
            .iter()
            .zip(self.vals.iter())
            .map(|(&i, &v)| (i as usize, v))
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.inds.shrink_to_fit();
        self.vals.shrink_to_fit();
    }
}
