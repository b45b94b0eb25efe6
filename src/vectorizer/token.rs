use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TokenFrequency 構造体
/// 1 ドキュメント内の token 出現回数を管理します
///
/// 挿入順を保持するので、同じ token 列からは常に同じ順序で列挙されます
///
/// # Examples
/// ```
/// use doc_consistency::TokenFrequency;
/// let mut freq = TokenFrequency::new();
/// freq.add_token("timeout").add_token("seconds").add_token("timeout");
/// assert_eq!(freq.token_count("timeout"), 2);
/// assert_eq!(freq.most_frequent_token_count(), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
}

/// Tokenの追加
impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
        }
    }

    /// tokenを追加する
    ///
    /// # Arguments
    /// * `token` - 追加するトークン
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        let count = self.token_count.entry(token.to_string()).or_insert(0);
        *count += 1;
        self
    }
}

/// TF-calculation
impl TokenFrequency {
    /// 最大頻度で正規化した TF
    ///
    /// # Arguments
    /// * `max_count` - ドキュメント内の最大出現回数
    /// * `count` - 対象 token の出現回数
    ///
    /// # Returns
    /// * `f64` - TF (0.0~1.0), `max_count` が 0 なら 0.0
    #[inline]
    pub fn tf_calc(max_count: u32, count: u32) -> f64 {
        if max_count == 0 {
            return 0.0;
        }
        count as f64 / max_count as f64
    }
}

/// 統計の取得
impl TokenFrequency {
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        self.token_count.get(token).copied().unwrap_or(0)
    }

    /// 最も多く出現した token の回数 (空なら 0)
    #[inline]
    pub fn most_frequent_token_count(&self) -> u32 {
        self.token_count.values().copied().max().unwrap_or(0)
    }

    /// (token, count) を挿入順に列挙
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    #[inline]
    pub fn token_num(&self) -> usize {
        self.token_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count.is_empty()
    }
}

impl<T: AsRef<str>> FromIterator<T> for TokenFrequency {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut freq = TokenFrequency::new();
        for token in iter {
            freq.add_token(token.as_ref());
        }
        freq
    }
}
