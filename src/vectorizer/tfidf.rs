use num::Num;
use serde::{Deserialize, Serialize};

use crate::{
    utils::math::vector::SparseVec,
    vectorizer::{corpus::CorpusStatistics, token::TokenFrequency},
};

/// IDF formula selection
///
/// Both are clamped at 0 so no weight can turn negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdfMode {
    /// `ln(N / df)`
    #[default]
    Standard,
    /// `ln(N / (df + 1))`, defined for tokens the corpus never saw
    Smoothed,
}

impl IdfMode {
    pub fn name(&self) -> &'static str {
        match self {
            IdfMode::Standard => "standard",
            IdfMode::Smoothed => "smoothed",
        }
    }

    pub fn from_smoothing(smoothing: bool) -> Self {
        if smoothing {
            IdfMode::Smoothed
        } else {
            IdfMode::Standard
        }
    }

    /// IDF for a token seen in `doc_freq` of `doc_num` documents
    #[inline]
    pub fn idf(&self, doc_num: u64, doc_freq: u64) -> f64 {
        if doc_num == 0 {
            return 0.0;
        }
        let n = doc_num as f64;
        let idf = match self {
            IdfMode::Standard => {
                // df = 0 は未知語、重み 0 扱い
                if doc_freq == 0 {
                    return 0.0;
                }
                (n / doc_freq as f64).ln()
            }
            IdfMode::Smoothed => (n / (doc_freq as f64 + 1.0)).ln(),
        };
        idf.max(0.0)
    }
}

/// TF-IDF calculation engine
///
/// Plugged into [`crate::Vectorizer`] as a type parameter so the arithmetic
/// can be swapped (or quantized) without touching the pipeline.
pub trait TFIDFEngine<N>
where
    N: Num + Copy,
{
    /// IDFベクトルを生成するメソッド
    /// # Arguments
    /// * `stats` - 確定済みのコーパス統計
    /// # Returns
    /// * `Vec<N>` - 語彙順の IDF
    fn idf_vec(stats: &CorpusStatistics) -> Vec<N>;

    /// TFベクトルを生成するメソッド
    /// 語彙に無い token は落とす
    /// # Arguments
    /// * `freq` - ドキュメントの token 頻度
    /// * `stats` - 確定済みのコーパス統計
    fn tf_vec(freq: &TokenFrequency, stats: &CorpusStatistics) -> SparseVec<N>;

    /// tf × idf
    #[inline]
    fn weight(tf: N, idf: N) -> N {
        tf * idf
    }
}

/// デフォルトのTF-IDFエンジン
/// `f32`、`f64` に対応
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    pub fn new() -> Self {
        DefaultTFIDFEngine
    }
}

impl TFIDFEngine<f64> for DefaultTFIDFEngine {
    fn idf_vec(stats: &CorpusStatistics) -> Vec<f64> {
        let doc_num = stats.doc_num();
        let mode = stats.idf_mode();
        stats
            .doc_freqs()
            .map(|df| mode.idf(doc_num, df))
            .collect()
    }

    fn tf_vec(freq: &TokenFrequency, stats: &CorpusStatistics) -> SparseVec<f64> {
        let max_count = freq.most_frequent_token_count();
        SparseVec::from_unsorted(freq.iter().filter_map(|(token, count)| {
            let idx = stats.token_index(token)?;
            Some((idx as u32, TokenFrequency::tf_calc(max_count, count)))
        }))
    }
}

impl TFIDFEngine<f32> for DefaultTFIDFEngine {
    fn idf_vec(stats: &CorpusStatistics) -> Vec<f32> {
        let doc_num = stats.doc_num();
        let mode = stats.idf_mode();
        stats
            .doc_freqs()
            .map(|df| mode.idf(doc_num, df) as f32)
            .collect()
    }

    fn tf_vec(freq: &TokenFrequency, stats: &CorpusStatistics) -> SparseVec<f32> {
        let max_count = freq.most_frequent_token_count();
        SparseVec::from_unsorted(freq.iter().filter_map(|(token, count)| {
            let idx = stats.token_index(token)?;
            Some((idx as u32, TokenFrequency::tf_calc(max_count, count) as f32))
        }))
    }
}
