//! Conflict strategy vocabulary and the per-row action decision.

use serde::{Deserialize, Serialize};

/// What to do when an incoming candidate matches an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Leave the existing record untouched.
    Skip,
    /// Update the record, adding incoming detail without discarding what
    /// the existing record already has.
    Merge,
    /// Update the record, replacing overlapping detail with the file's.
    Update,
}

impl ConflictStrategy {
    pub const ALL: [ConflictStrategy; 3] = [
        ConflictStrategy::Skip,
        ConflictStrategy::Merge,
        ConflictStrategy::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Skip => "skip",
            ConflictStrategy::Merge => "merge",
            ConflictStrategy::Update => "update",
        }
    }

    pub fn from_str(s: &str) -> Option<ConflictStrategy> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl Default for ConflictStrategy {
    fn default() -> Self {
        ConflictStrategy::Merge
    }
}

impl std::fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal action for one candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Create,
    Skip,
    Update,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Create => "create",
            RowAction::Skip => "skip",
            RowAction::Update => "update",
        }
    }
}

/// Decide what happens to a candidate given whether a record with the same
/// natural key already exists. New candidates are always created; the
/// strategy only governs collisions. Merge and update both touch the
/// existing record; how much of it they replace is up to the store.
pub fn decide(existing: bool, strategy: ConflictStrategy) -> RowAction {
    match (existing, strategy) {
        (false, _) => RowAction::Create,
        (true, ConflictStrategy::Skip) => RowAction::Skip,
        (true, ConflictStrategy::Merge) | (true, ConflictStrategy::Update) => RowAction::Update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_are_always_created() {
        for strategy in ConflictStrategy::ALL {
            assert_eq!(decide(false, strategy), RowAction::Create);
        }
    }

    #[test]
    fn collisions_follow_the_strategy() {
        assert_eq!(decide(true, ConflictStrategy::Skip), RowAction::Skip);
        assert_eq!(decide(true, ConflictStrategy::Merge), RowAction::Update);
        assert_eq!(decide(true, ConflictStrategy::Update), RowAction::Update);
    }

    #[test]
    fn merge_is_the_default_strategy() {
        assert_eq!(ConflictStrategy::default(), ConflictStrategy::Merge);
    }

    #[test]
    fn strategy_round_trips() {
        for strategy in ConflictStrategy::ALL {
            assert_eq!(
                ConflictStrategy::from_str(strategy.as_str()),
                Some(strategy)
            );
        }
        assert_eq!(ConflictStrategy::from_str("overwrite"), None);
    }
}
