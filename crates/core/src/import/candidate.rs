//! Candidate records produced by row transformation.
//!
//! A candidate is a fully typed, validated record that is ready to be
//! checked against existing data and persisted. Owner names are still
//! names at this stage; identity resolution happens later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parse::Goal;
use crate::types::DbId;

// ── Vocabulary enums ─────────────────────────────────────────────────

/// Reporting cadence of a scorecard metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Monthly,
}

impl Cadence {
    pub const ALL: [Cadence; 2] = [Cadence::Weekly, Cadence::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Cadence> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Weekly
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planning horizon of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    ShortTerm,
    LongTerm,
}

impl Timeline {
    pub const ALL: [Timeline; 2] = [Timeline::ShortTerm, Timeline::LongTerm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::ShortTerm => "short_term",
            Timeline::LongTerm => "long_term",
        }
    }

    pub fn from_str(s: &str) -> Option<Timeline> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Solved,
    Archived,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Open,
        IssueStatus::Solved,
        IssueStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Solved => "solved",
            IssueStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<IssueStatus> {
        Self::ALL.iter().copied().find(|s2| s2.as_str() == s)
    }

    /// Derive status from the lifecycle date columns. An archived date wins
    /// over a completed date; with neither the issue is open.
    pub fn from_dates(completed: Option<NaiveDate>, archived: Option<NaiveDate>) -> IssueStatus {
        if archived.is_some() {
            IssueStatus::Archived
        } else if completed.is_some() {
            IssueStatus::Solved
        } else {
            IssueStatus::Open
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl IssuePriority {
    pub const ALL: [IssuePriority; 4] = [
        IssuePriority::Low,
        IssuePriority::Medium,
        IssuePriority::High,
        IssuePriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssuePriority::Low => "low",
            IssuePriority::Medium => "medium",
            IssuePriority::High => "high",
            IssuePriority::Critical => "critical",
        }
    }

    /// Read a priority out of free spreadsheet text. "urgent" is accepted
    /// as an alias for critical; anything unrecognised falls back to medium.
    pub fn from_text(raw: &str) -> IssuePriority {
        match raw.trim().to_lowercase().as_str() {
            "low" => IssuePriority::Low,
            "medium" => IssuePriority::Medium,
            "high" => IssuePriority::High,
            "critical" | "urgent" => IssuePriority::Critical,
            _ => IssuePriority::Medium,
        }
    }
}

impl std::fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Candidate records ────────────────────────────────────────────────

/// One measured value of a metric, keyed by the end date of its period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePoint {
    pub period_end: NaiveDate,
    pub value: f64,
}

/// A scorecard metric extracted from one sheet row, with all score cells
/// that held a readable number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCandidate {
    pub group_name: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub goal_raw: Option<String>,
    pub goal: Goal,
    pub cadence: Cadence,
    pub scores: Vec<ScorePoint>,
}

/// An issue extracted from one sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueCandidate {
    pub title: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub assignee_name: Option<String>,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub timeline: Timeline,
    pub created_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub archived_date: Option<NaiveDate>,
    pub link: Option<String>,
}

// ── Natural keys ─────────────────────────────────────────────────────

/// Normalised form of a record title, matching how the database compares
/// titles: surrounding whitespace removed, lowercased.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Anything the batch importer can carry through its generic pipeline.
pub trait ImportEntity {
    /// Entity name used in log lines and error messages.
    const ENTITY: &'static str;

    fn title(&self) -> &str;

    fn owner_name(&self) -> Option<&str>;

    /// Second key component after the title: the cadence for metrics, the
    /// timeline for issues. Records in different categories never collide.
    fn category(&self) -> &'static str;
}

impl ImportEntity for MetricCandidate {
    const ENTITY: &'static str = "metric";

    fn title(&self) -> &str {
        &self.title
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    fn category(&self) -> &'static str {
        self.cadence.as_str()
    }
}

impl ImportEntity for IssueCandidate {
    const ENTITY: &'static str = "issue";

    fn title(&self) -> &str {
        &self.title
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    fn category(&self) -> &'static str {
        self.timeline.as_str()
    }
}

/// Natural key deciding whether a candidate matches an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub title_norm: String,
    pub category: &'static str,
}

impl RecordKey {
    pub fn for_entity<C: ImportEntity>(
        organization_id: DbId,
        team_id: Option<DbId>,
        candidate: &C,
    ) -> RecordKey {
        RecordKey {
            organization_id,
            team_id,
            title_norm: normalize_title(candidate.title()),
            category: candidate.category(),
        }
    }
}
