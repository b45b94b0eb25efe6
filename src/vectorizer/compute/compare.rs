use num::Num;
use std::cmp::Ordering;

use crate::vectorizer::TermVector;

/// Sparse vector comparison
///
/// Inputs are `(index, value)` iterators sorted by ascending index, as
/// produced by [`crate::utils::math::vector::SparseVec::raw_iter`].
pub trait Compare<N>
where
    N: Num + Copy,
{
    /// dot積
    /// d(a, b) = Σ(a_i * b_i)
    fn dot(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64;
    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    /// ||a|| = sqrt(Σ(a_i^2))
    /// どちらかのノルムが 0 なら 0.0
    fn cosine_similarity(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompare;

impl DefaultCompare {
    /// Cosine similarity of two term vectors, clamped to [0, 1]
    #[inline]
    pub fn term_vectors<N>(a: &TermVector<N>, b: &TermVector<N>) -> f64
    where
        N: Num + Copy,
        DefaultCompare: Compare<N>,
    {
        <DefaultCompare as Compare<N>>::cosine_similarity(a.weights.raw_iter(), b.weights.raw_iter())
            .clamp(0.0, 1.0)
    }
}

impl Compare<f32> for DefaultCompare {
    #[inline(always)]
    fn dot(vec: impl Iterator<Item = (usize, f32)>, other: impl Iterator<Item = (usize, f32)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut acc: f64 = 0.0;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => { acc += (va as f64) * (vb as f64); a_next = a_it.next(); b_next = b_it.next(); }
                Ordering::Less => { a_next = a_it.next(); }
                Ordering::Greater => { b_next = b_it.next(); }
            }
        }
        acc
    }

    #[inline(always)]
    fn cosine_similarity(vec: impl Iterator<Item = (usize, f32)>, other: impl Iterator<Item = (usize, f32)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut sum_a2: f64 = 0.0;
        let mut sum_b2: f64 = 0.0;
        let mut sum_ab: f64 = 0.0;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            let (va, vb) = (va as f64, vb as f64);
            match ia.cmp(&ib) {
                Ordering::Equal => { sum_a2 += va * va; sum_b2 += vb * vb; sum_ab += va * vb; a_next = a_it.next(); b_next = b_it.next(); }
                Ordering::Less => { sum_a2 += va * va; a_next = a_it.next(); }
                Ordering::Greater => { sum_b2 += vb * vb; b_next = b_it.next(); }
            }
        }
        while let Some((_, va)) = a_next { sum_a2 += (va as f64) * (va as f64); a_next = a_it.next(); }
        while let Some((_, vb)) = b_next { sum_b2 += (vb as f64) * (vb as f64); b_next = b_it.next(); }
        if sum_a2 == 0.0 || sum_b2 == 0.0 { 0.0 } else { sum_ab / (sum_a2.sqrt() * sum_b2.sqrt()) }
    }
}

impl Compare<f64> for DefaultCompare {
    #[inline(always)]
    fn dot(vec: impl Iterator<Item = (usize, f64)>, other: impl Iterator<Item = (usize, f64)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut acc = 0_f64;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => { acc += va * vb; a_next = a_it.next(); b_next = b_it.next(); }
                Ordering::Less => { a_next = a_it.next(); }
                Ordering::Greater => { b_next = b_it.next(); }
            }
        }
        acc
    }

    #[inline(always)]
    fn cosine_similarity(vec: impl Iterator<Item = (usize, f64)>, other: impl Iterator<Item = (usize, f64)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut norm_a = 0_f64;
        let mut norm_b = 0_f64;
        let mut dot = 0_f64;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => { norm_a += va * va; norm_b += vb * vb; dot += va * vb; a_next = a_it.next(); b_next = b_it.next(); }
                Ordering::Less => { norm_a += va * va; a_next = a_it.next(); }
                Ordering::Greater => { norm_b += vb * vb; b_next = b_it.next(); }
            }
        }
        while let Some((_, va)) = a_next { norm_a += va * va; a_next = a_it.next(); }
        while let Some((_, vb)) = b_next { norm_b += vb * vb; b_next = b_it.next(); }
        if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a.sqrt() * norm_b.sqrt()) }
    }
}
