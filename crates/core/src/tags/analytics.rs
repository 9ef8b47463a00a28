#![forbid(unsafe_code)]

use super::normalize::normalize_tag;
use super::repository::TagRepository;
use super::types::Tag;
use crate::ids::TagId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
        }
    }

    /// Substring match of any keyword against an already normalized name.
    pub fn matches(&self, normalized_name: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| normalized_name.contains(normalize_tag(kw).as_str()))
    }
}

/// Ordered keyword rules; the first matching rule wins and unmatched tags
/// land in `fallback`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
    pub fallback: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    "emotional",
                    &["cry", "feel", "heart", "soul", "comfort", "emotional"],
                ),
                CategoryRule::new(
                    "pacing",
                    &["slow", "fast", "page turner", "binge", "dnf", "burn"],
                ),
                CategoryRule::new(
                    "vibes",
                    &["character", "hero", "villain", "morally", "sunshine", "grumpy"],
                ),
                CategoryRule::new(
                    "aesthetic",
                    &["dark", "academia", "gothic", "cozy", "vibes", "aesthetic"],
                ),
                CategoryRule::new(
                    "tropes",
                    &["enemies", "lovers", "fake", "dating", "chosen", "found family"],
                ),
            ],
            fallback: "general".to_string(),
        }
    }
}

impl CategoryRules {
    /// Rule categories in order, then the fallback.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|rule| rule.category.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
    }

    pub fn category_count(&self) -> usize {
        self.rules.len() + 1
    }

    /// Index into [`categories`](Self::categories) for a tag name.
    pub fn classify_index(&self, name: &str) -> usize {
        let normalized = normalize_tag(name);
        self.rules
            .iter()
            .position(|rule| rule.matches(&normalized))
            .unwrap_or(self.rules.len())
    }

    pub fn classify(&self, name: &str) -> &str {
        let index = self.classify_index(name);
        self.rules
            .get(index)
            .map(|rule| rule.category.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub tags: Vec<String>,
}

/// Popular tag names per category, in rule order with the fallback last.
/// Every category is present, possibly empty. Serializes as a map from
/// category to tag names, keys in bucket order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorizedTags {
    pub buckets: Vec<CategoryBucket>,
}

impl Serialize for CategorizedTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.category, &bucket.tags)?;
        }
        map.end()
    }
}

impl CategorizedTags {
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|bucket| bucket.category == category)
            .map(|bucket| bucket.tags.as_slice())
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.tags.len()).sum()
    }
}

/// Ranks tags by `usage_count` (descending, ties in input order), keeps the
/// top `limit * category_count` and buckets them, each bucket capped at
/// `limit`.
pub fn popular_by_category(tags: &[Tag], rules: &CategoryRules, limit: usize) -> CategorizedTags {
    let mut ranked: Vec<&Tag> = tags.iter().collect();
    ranked.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));

    let mut buckets: Vec<CategoryBucket> = rules
        .categories()
        .map(|category| CategoryBucket {
            category: category.to_string(),
            tags: Vec::new(),
        })
        .collect();

    let window = limit.saturating_mul(rules.category_count());
    for tag in ranked.into_iter().take(window) {
        let bucket = &mut buckets[rules.classify_index(&tag.name)];
        if bucket.tags.len() < limit {
            bucket.tags.push(tag.name.clone());
        }
    }

    CategorizedTags { buckets }
}

/// Usage tracking and the popularity view over an injected repository.
#[derive(Debug)]
pub struct TagAnalytics<'r, R> {
    repo: R,
    rules: &'r CategoryRules,
}

impl<'r, R: TagRepository> TagAnalytics<'r, R> {
    pub fn new(repo: R, rules: &'r CategoryRules) -> Self {
        Self { repo, rules }
    }

    pub fn rules(&self) -> &CategoryRules {
        self.rules
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    pub fn record_usage(&mut self, tag_ids: &[TagId], at_ms: i64) -> Result<(), R::Error> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        self.repo.record_usage(tag_ids, at_ms)?;
        tracing::debug!(tags = tag_ids.len(), at_ms, "tag usage recorded");
        Ok(())
    }

    pub fn popular_by_category(&self, limit: usize) -> Result<CategorizedTags, R::Error> {
        let tags = self.repo.list_tags()?;
        Ok(popular_by_category(&tags, self.rules, limit))
    }
}
