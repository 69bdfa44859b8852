//! Owner-name resolution against the organization's user roster.
//!
//! Spreadsheets carry owners as free text ("Mike", "mike@acme.com",
//! "Michael Scott"). Resolution walks two tiers: exact case-insensitive
//! equality against full name, first name, last name, or email, then
//! substring containment over the same fields. A name resolves only when
//! exactly one distinct user matches; anything else falls back to the
//! importing user so a batch never stalls on one unknown name.

use std::collections::{BTreeSet, HashMap};

use crate::types::DbId;

/// Roster entry, as loaded from the user store.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// How an owner column value turned into a user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerResolution {
    /// Matched against the roster.
    Resolved(DbId),
    /// Taken from an operator-supplied name mapping.
    Override(DbId),
    /// The importing user, because the name was absent or unresolvable.
    Fallback(DbId),
}

impl OwnerResolution {
    pub fn user_id(&self) -> DbId {
        match self {
            OwnerResolution::Resolved(id)
            | OwnerResolution::Override(id)
            | OwnerResolution::Fallback(id) => *id,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            OwnerResolution::Resolved(_) => "resolved",
            OwnerResolution::Override(_) => "override",
            OwnerResolution::Fallback(_) => "fallback",
        }
    }
}

/// Raw match result for one name, before fallback policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(DbId),
    /// More than one distinct user matched; the count is kept for logs.
    Ambiguous(usize),
    Unmatched,
}

/// Roster entry with its searchable fields pre-lowercased.
#[derive(Debug)]
struct IndexedUser {
    id: DbId,
    first: String,
    last: String,
    full: String,
    email: String,
}

impl IndexedUser {
    fn matches_exact(&self, needle: &str) -> bool {
        self.full == needle || self.first == needle || self.last == needle || self.email == needle
    }

    fn matches_partial(&self, needle: &str) -> bool {
        self.full.contains(needle)
            || self.first.contains(needle)
            || self.last.contains(needle)
            || self.email.contains(needle)
    }
}

/// Memoizing matcher over one roster. Built once per import batch; every
/// repeated owner name costs a single map lookup.
pub struct IdentityIndex {
    users: Vec<IndexedUser>,
    overrides: HashMap<String, DbId>,
    cache: HashMap<String, MatchOutcome>,
    unmapped: BTreeSet<String>,
}

impl IdentityIndex {
    /// Build an index from the roster and operator-supplied overrides.
    /// Override keys are matched case-insensitively on the trimmed name.
    pub fn new(roster: Vec<UserRef>, overrides: HashMap<String, DbId>) -> IdentityIndex {
        let users = roster
            .into_iter()
            .map(|u| {
                let first = u.first_name.trim().to_lowercase();
                let last = u.last_name.trim().to_lowercase();
                IndexedUser {
                    full: format!("{first} {last}"),
                    first,
                    last,
                    email: u.email.trim().to_lowercase(),
                    id: u.id,
                }
            })
            .collect();
        let overrides = overrides
            .into_iter()
            .map(|(name, id)| (name.trim().to_lowercase(), id))
            .collect();
        IdentityIndex {
            users,
            overrides,
            cache: HashMap::new(),
            unmapped: BTreeSet::new(),
        }
    }

    /// Resolve an owner column value to a user id.
    ///
    /// Overrides win outright. An empty or missing name falls back silently;
    /// a non-empty name that fails both tiers falls back and is recorded in
    /// [`unmapped_names`](Self::unmapped_names).
    pub fn resolve_owner(&mut self, name: Option<&str>, fallback: DbId) -> OwnerResolution {
        let trimmed = match name.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return OwnerResolution::Fallback(fallback),
        };
        let needle = trimmed.to_lowercase();

        if let Some(&id) = self.overrides.get(&needle) {
            return OwnerResolution::Override(id);
        }

        match self.match_name(&needle) {
            MatchOutcome::Matched(id) => OwnerResolution::Resolved(id),
            MatchOutcome::Ambiguous(_) | MatchOutcome::Unmatched => {
                self.unmapped.insert(trimmed.to_string());
                OwnerResolution::Fallback(fallback)
            }
        }
    }

    /// Match a pre-normalised name, memoized.
    fn match_name(&mut self, needle: &str) -> MatchOutcome {
        if let Some(&hit) = self.cache.get(needle) {
            return hit;
        }

        let exact: Vec<DbId> = self
            .users
            .iter()
            .filter(|u| u.matches_exact(needle))
            .map(|u| u.id)
            .collect();
        let outcome = match exact.len() {
            1 => MatchOutcome::Matched(exact[0]),
            n if n > 1 => MatchOutcome::Ambiguous(n),
            _ => {
                let partial: Vec<DbId> = self
                    .users
                    .iter()
                    .filter(|u| u.matches_partial(needle))
                    .map(|u| u.id)
                    .collect();
                match partial.len() {
                    1 => MatchOutcome::Matched(partial[0]),
                    0 => MatchOutcome::Unmatched,
                    n => MatchOutcome::Ambiguous(n),
                }
            }
        };

        self.cache.insert(needle.to_string(), outcome);
        outcome
    }

    /// Distinct names that fell back, in stable order.
    pub fn unmapped_names(&self) -> Vec<String> {
        self.unmapped.iter().cloned().collect()
    }
}
