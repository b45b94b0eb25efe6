use crate::{error::Result, vectorizer::corpus::CorpusStatistics};

/// CBOR snapshot of finished corpus statistics
///
/// Lets a caller freeze the statistics of one corpus and vectorize new
/// documents against exactly the same vocabulary and IDF later. The decoded
/// value gets the same content fingerprint as the original, so vectors built
/// from it still compare against vectors built from the original. A stored
/// snapshot number, if any, is ignored.
impl CorpusStatistics {
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}
