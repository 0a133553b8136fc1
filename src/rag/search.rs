//! BM25 lexical index.
//!
//! The lexical half of hybrid retrieval: a sparse TF-IDF-variant index over
//! chunk text. The index is derived data - the collection rebuilds it from
//! its stored chunks when loading from disk - so it is cheap to keep fully
//! in memory.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// BM25 search index for lexical matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bm25Index {
    /// Document ID -> tokenized content
    documents: HashMap<String, Vec<String>>,
    /// Term -> document IDs containing term
    inverted_index: HashMap<String, HashSet<String>>,
    /// Document frequencies for each term
    document_frequencies: HashMap<String, usize>,
    /// Total number of documents
    doc_count: usize,
    /// Average document length
    avg_doc_length: f32,
    /// BM25 k1 parameter (term frequency saturation)
    k1: f32,
    /// BM25 b parameter (length normalization)
    b: f32,
}

impl Bm25Index {
    /// Create a new BM25 index with default parameters.
    pub fn new() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            ..Default::default()
        }
    }

    /// Tokenize text into lowercase terms.
    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty() && s.len() > 1)
            .map(String::from)
            .collect()
    }

    /// Add a document to the index.
    pub fn add_document(&mut self, id: &str, content: &str) {
        let tokens = Self::tokenize(content);

        // Update document frequency for each unique term
        let unique_terms: HashSet<_> = tokens.iter().cloned().collect();
        for term in &unique_terms {
            *self.document_frequencies.entry(term.clone()).or_insert(0) += 1;
            self.inverted_index
                .entry(term.clone())
                .or_default()
                .insert(id.to_string());
        }

        self.documents.insert(id.to_string(), tokens);
        self.doc_count += 1;

        let total_tokens: usize = self.documents.values().map(|v| v.len()).sum();
        self.avg_doc_length = total_tokens as f32 / self.doc_count as f32;
    }

    /// Remove a document from the index.
    pub fn remove_document(&mut self, id: &str) {
        if let Some(tokens) = self.documents.remove(id) {
            let unique_terms: HashSet<_> = tokens.into_iter().collect();
            for term in unique_terms {
                if let Some(df) = self.document_frequencies.get_mut(&term) {
                    *df = df.saturating_sub(1);
                    if *df == 0 {
                        self.document_frequencies.remove(&term);
                    }
                }
                if let Some(docs) = self.inverted_index.get_mut(&term) {
                    docs.remove(id);
                    if docs.is_empty() {
                        self.inverted_index.remove(&term);
                    }
                }
            }

            self.doc_count = self.doc_count.saturating_sub(1);
            if self.doc_count > 0 {
                let total_tokens: usize = self.documents.values().map(|v| v.len()).sum();
                self.avg_doc_length = total_tokens as f32 / self.doc_count as f32;
            } else {
                self.avg_doc_length = 0.0;
            }
        }
    }

    /// Inverse document frequency for a term (BM25 variant, never negative).
    fn idf(&self, term: &str) -> f32 {
        let df = self.document_frequencies.get(term).copied().unwrap_or(0) as f32;
        let n = self.doc_count as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score_document(&self, id: &str, query_terms: &[String]) -> f32 {
        let Some(tokens) = self.documents.get(id) else {
            return 0.0;
        };

        let doc_len = tokens.len() as f32;
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            *term_freq.entry(token.as_str()).or_insert(0) += 1;
        }

        let mut score = 0.0;
        for term in query_terms {
            let tf = term_freq.get(term.as_str()).copied().unwrap_or(0) as f32;
            let idf = self.idf(term);

            // BM25 formula
            let numerator = tf * (self.k1 + 1.0);
            let denominator =
                tf + self.k1 * (1.0 - self.b + self.b * doc_len / self.avg_doc_length);
            score += idf * numerator / denominator;
        }

        score
    }

    /// Search the index and return top-k `(id, score)` pairs.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(String, f32)> {
        let query_terms = Self::tokenize(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        // Candidates are documents containing at least one query term
        let mut candidates: HashSet<String> = HashSet::new();
        for term in &query_terms {
            if let Some(docs) = self.inverted_index.get(term) {
                candidates.extend(docs.iter().cloned());
            }
        }

        let mut results: Vec<(String, f32)> = candidates
            .iter()
            .map(|id| {
                let score = self.score_document(id, &query_terms);
                (id.clone(), score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        results
    }

    /// Get the number of documents in the index.
    pub fn len(&self) -> usize {
        self.doc_count
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }
}

/// Min-max normalize `(id, score)` pairs into `[0, 1]`.
///
/// A degenerate list (all scores equal) normalizes to 1.0 so that a single
/// strong match is not zeroed out.
pub fn min_max_normalize(results: &[(String, f32)]) -> Vec<(String, f32)> {
    if results.is_empty() {
        return Vec::new();
    }

    let max = results
        .iter()
        .map(|(_, s)| *s)
        .fold(f32::NEG_INFINITY, f32::max);
    let min = results.iter().map(|(_, s)| *s).fold(f32::INFINITY, f32::min);
    let range = max - min;

    results
        .iter()
        .map(|(id, score)| {
            let normalized = if range > 0.0 { (score - min) / range } else { 1.0 };
            (id.clone(), normalized)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> Bm25Index {
        let mut index = Bm25Index::new();
        index.add_document("ec2", "EC2 provides resizable compute capacity in the cloud");
        index.add_document("s3", "S3 is object storage built to retrieve any amount of data");
        index.add_document("lambda", "Lambda runs code without provisioning servers");
        index
    }

    #[test]
    fn test_bm25_relevance_ordering() {
        let index = sample_index();

        let results = index.search("compute capacity", 10);
        assert!(!results.is_empty());
        assert_eq!(results[0].0, "ec2");
    }

    #[test]
    fn test_bm25_empty_query() {
        let index = sample_index();
        assert!(index.search("", 10).is_empty());
        // Single-character tokens are dropped by the tokenizer
        assert!(index.search("a", 10).is_empty());
    }

    #[test]
    fn test_bm25_no_match() {
        let index = sample_index();
        assert!(index.search("kubernetes", 10).is_empty());
    }

    #[test]
    fn test_bm25_top_k_truncation() {
        let index = sample_index();
        let results = index.search("data storage compute code", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_bm25_remove_document() {
        let mut index = sample_index();
        assert_eq!(index.len(), 3);

        index.remove_document("ec2");
        assert_eq!(index.len(), 2);
        assert!(index.search("compute capacity", 10).is_empty());
    }

    #[test]
    fn test_bm25_serde_round_trip() {
        let index = sample_index();
        let json = serde_json::to_string(&index).unwrap();
        let restored: Bm25Index = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.search("compute capacity", 10)[0].0, "ec2");
    }

    #[test]
    fn test_min_max_normalize() {
        let results = vec![
            ("a".to_string(), 2.0),
            ("b".to_string(), 1.0),
            ("c".to_string(), 0.0),
        ];
        let normalized = min_max_normalize(&results);
        assert!((normalized[0].1 - 1.0).abs() < f32::EPSILON);
        assert!((normalized[1].1 - 0.5).abs() < f32::EPSILON);
        assert!(normalized[2].1.abs() < f32::EPSILON);
    }

    #[test]
    fn test_min_max_normalize_degenerate() {
        let results = vec![("a".to_string(), 3.0)];
        let normalized = min_max_normalize(&results);
        assert!((normalized[0].1 - 1.0).abs() < f32::EPSILON);

        assert!(min_max_normalize(&[]).is_empty());
    }
}
