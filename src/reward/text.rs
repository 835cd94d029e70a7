//! Lexical similarity between two query strings.
//!
//! Uses a TF-IDF vector space fit on the reference text and compares the
//! candidate to it by cosine similarity. A vectorizer is fit fresh for every
//! comparison; nothing carries over between calls.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Tokens are runs of two or more word characters.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Lowercases `text` and splits it into tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Term-frequency / inverse-document-frequency vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    /// Term to column index, columns ordered alphabetically.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Creates an unfitted vectorizer keeping at most `max_features` terms.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Learns the vocabulary and IDF weights from `documents`.
    ///
    /// When more terms exist than the cap allows, the most frequent across
    /// the corpus are kept. Terms tied at the cut are kept in alphabetical
    /// order, so the vocabulary is deterministic; other TF-IDF
    /// implementations may pick a different subset of the tied terms.
    pub fn fit(mut self, documents: &[&str]) -> Self {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_counts: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for token in tokenize(doc) {
                *seen.entry(token).or_default() += 1;
            }
            for (term, count) in seen {
                *term_counts.entry(term.clone()).or_default() += count;
                *doc_counts.entry(term).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let kept: BTreeMap<String, usize> = ranked.into_iter().collect();
        let n_docs = documents.len() as f64;

        self.idf = kept
            .keys()
            .map(|term| {
                let df = doc_counts.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept
            .into_keys()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        self
    }

    /// Projects `document` into the fitted space as an L2-normalized vector.
    ///
    /// Terms outside the vocabulary are dropped. A document sharing no terms
    /// with the vocabulary maps to the zero vector.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                vector[index] += 1.0;
            }
        }
        for (weight, idf) in vector.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }

        let norm = l2_norm(&vector);
        if norm > 0.0 {
            vector.iter_mut().for_each(|w| *w /= norm);
        }
        vector
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of `term`, if it made it into the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

fn l2_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine of the angle between `a` and `b`; zero if either is the zero vector.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let norm = l2_norm(a) * l2_norm(b);
    if norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / norm
}

/// Scores how lexically close `candidate` is to `reference`, in `[0, 1]`.
pub fn text_similarity(candidate: &str, reference: &str, max_features: usize) -> f64 {
    let vectorizer = TfidfVectorizer::new(max_features).fit(&[reference]);
    let reference_vec = vectorizer.transform(reference);
    let candidate_vec = vectorizer.transform(candidate);
    cosine_similarity(&reference_vec, &candidate_vec).clamp(0.0, 1.0)
}
