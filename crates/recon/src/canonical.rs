//! Canonical UUID selection.
//!
//! The legacy set behind an alternate UUID has no defined order, so the
//! canonical id must not depend on iteration order: the lexicographically
//! smallest lowercase hyphenated form wins.

use std::collections::BTreeSet;

use uuid::Uuid;

/// Pick the canonical UUID among equivalent ids. `None` only for empty input.
pub fn canonical<I>(ids: I) -> Option<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    ids.into_iter().min_by_key(|id| id.hyphenated().to_string())
}

/// Canonical id for an alternate UUID and its concorded legacy UUIDs.
pub fn canonical_for(alternate: Uuid, legacy: &BTreeSet<Uuid>) -> Uuid {
    canonical(legacy.iter().copied().chain(std::iter::once(alternate))).unwrap_or(alternate)
}
