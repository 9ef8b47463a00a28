#![forbid(unsafe_code)]

use super::normalize::normalize_tag;
use super::repository::{InsertOutcome, TagRepository};
use super::similarity::{Corpus, MatchPolicy};
use super::types::ResolvedTag;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError<E> {
    #[error("tag candidate #{index} is blank after normalization")]
    BlankCandidate { index: usize },
    #[error("tag repository: {0}")]
    Repository(E),
}

/// Maps raw candidate strings onto canonical tags, creating a tag only when
/// nothing in the corpus is close enough.
///
/// Atomicity is the repository's concern: hand in a transaction-scoped
/// repository when the batch must be all-or-nothing.
#[derive(Debug)]
pub struct TagResolver<R> {
    repo: R,
    policy: MatchPolicy,
}

impl<R: TagRepository> TagResolver<R> {
    pub fn new(repo: R, policy: MatchPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Resolves candidates in input order. Tags created earlier in the batch
    /// join the corpus, so repeated spellings within one call share a tag.
    pub fn resolve<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        at_ms: i64,
    ) -> Result<Vec<ResolvedTag>, ResolveError<R::Error>> {
        for (index, candidate) in candidates.iter().enumerate() {
            if normalize_tag(candidate.as_ref()).is_empty() {
                return Err(ResolveError::BlankCandidate { index });
            }
        }

        let mut corpus = Corpus::new(self.repo.list_tags().map_err(ResolveError::Repository)?);
        let mut out = Vec::with_capacity(candidates.len());
        let mut created = 0usize;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            if let Some(found) = corpus.find_similar(candidate, &self.policy) {
                tracing::debug!(
                    candidate,
                    tag_id = %found.tag.id,
                    tag = %found.tag.name,
                    distance = found.distance,
                    "tag candidate matched"
                );
                out.push(ResolvedTag::matched(found.tag));
                continue;
            }

            let normalized = normalize_tag(candidate);
            match self
                .repo
                .insert_tag(candidate, &normalized, at_ms)
                .map_err(ResolveError::Repository)?
            {
                InsertOutcome::Created(tag) => {
                    tracing::debug!(tag_id = %tag.id, tag = %tag.name, "tag created");
                    created += 1;
                    out.push(ResolvedTag::created(&tag));
                    corpus.push(tag);
                }
                InsertOutcome::Existing(tag) => {
                    tracing::warn!(
                        candidate,
                        tag_id = %tag.id,
                        "tag appeared after the corpus snapshot; reusing it"
                    );
                    out.push(ResolvedTag::matched(&tag));
                    if !corpus.contains_id(&tag) {
                        corpus.push(tag);
                    }
                }
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            created,
            corpus = corpus.len(),
            "tag batch resolved"
        );
        Ok(out)
    }
}
