#![forbid(unsafe_code)]

use super::normalize::normalize_tag;
use super::types::Tag;
use serde::{Deserialize, Serialize};

/// Fuzzy-match tolerance: `max(min_threshold, floor(len * length_ratio))`
/// where `len` counts chars of the normalized target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchPolicy {
    pub min_threshold: usize,
    pub length_ratio: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            min_threshold: 3,
            length_ratio: 0.2,
        }
    }
}

impl MatchPolicy {
    pub fn threshold(&self, normalized_len: usize) -> usize {
        let scaled = (normalized_len as f64 * self.length_ratio).floor();
        let scaled = if scaled.is_finite() && scaled > 0.0 {
            scaled as usize
        } else {
            0
        };
        self.min_threshold.max(scaled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimilarMatch<'a> {
    pub tag: &'a Tag,
    pub distance: usize,
}

/// Levenshtein edit distance over chars, unit cost for every operation.
pub use strsim::levenshtein;

/// Tags paired with their normalized names, so a batch normalizes each
/// stored name once.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    entries: Vec<(Tag, String)>,
}

impl Corpus {
    pub fn new(tags: Vec<Tag>) -> Self {
        let entries = tags
            .into_iter()
            .map(|tag| {
                let normalized = normalize_tag(&tag.name);
                (tag, normalized)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, tag: Tag) {
        let normalized = normalize_tag(&tag.name);
        self.entries.push((tag, normalized));
    }

    pub fn contains_id(&self, tag: &Tag) -> bool {
        self.entries.iter().any(|(entry, _)| entry.id == tag.id)
    }

    pub fn find_similar(&self, target: &str, policy: &MatchPolicy) -> Option<SimilarMatch<'_>> {
        best_match(
            &normalize_tag(target),
            self.entries
                .iter()
                .map(|(tag, normalized)| (tag, normalized.as_str())),
            policy,
        )
    }
}

/// Closest tag to `target` within the policy threshold.
///
/// An exact normalized match short-circuits with distance 0. Among fuzzy
/// candidates the smallest distance wins and ties keep the earliest entry.
pub fn find_similar<'a>(
    target: &str,
    corpus: &'a [Tag],
    policy: &MatchPolicy,
) -> Option<SimilarMatch<'a>> {
    let normalized: Vec<(&'a Tag, String)> = corpus
        .iter()
        .map(|tag| (tag, normalize_tag(&tag.name)))
        .collect();
    best_match(
        &normalize_tag(target),
        normalized.iter().map(|(tag, name)| (*tag, name.as_str())),
        policy,
    )
}

fn best_match<'a, 'n, I>(
    target: &str,
    entries: I,
    policy: &MatchPolicy,
) -> Option<SimilarMatch<'a>>
where
    I: Iterator<Item = (&'a Tag, &'n str)> + Clone,
{
    if let Some((tag, _)) = entries.clone().find(|(_, name)| *name == target) {
        return Some(SimilarMatch { tag, distance: 0 });
    }

    let target_len = target.chars().count();
    let threshold = policy.threshold(target_len);
    let mut best: Option<SimilarMatch<'a>> = None;

    for (tag, name) in entries {
        // Length difference is a lower bound on the edit distance.
        if target_len.abs_diff(name.chars().count()) > threshold {
            continue;
        }
        let distance = levenshtein(target, name);
        if distance > threshold {
            continue;
        }
        if best.is_none_or(|current| distance < current.distance) {
            best = Some(SimilarMatch { tag, distance });
        }
    }

    best
}
