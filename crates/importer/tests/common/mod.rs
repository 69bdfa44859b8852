//! In-memory [`CandidateStore`] used by the engine tests.
//!
//! Mirrors the Postgres store's contract: `begin_row` snapshots state,
//! `abort_row` restores it, and the score write rules follow the conflict
//! strategy. Titles listed in `fail_titles` fail after their writes, so a
//! test can prove aborts actually undo state.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use opsboard_core::import::candidate::{normalize_title, MetricCandidate, RecordKey, ScorePoint};
use opsboard_core::import::conflict::ConflictStrategy;
use opsboard_core::import::identity::OwnerResolution;
use opsboard_core::types::DbId;
use opsboard_importer::engine::ImportContext;
use opsboard_importer::store::{CandidateStore, StoreError};

/// A stored metric with everything the tests assert on.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: DbId,
    pub candidate: MetricCandidate,
    pub owner_id: DbId,
    pub owner_source: &'static str,
    pub updates: usize,
}

#[derive(Clone)]
struct Snapshot {
    records: HashMap<RecordKey, StoredRecord>,
    scores: HashMap<DbId, Vec<ScorePoint>>,
}

pub struct MemoryStore {
    ctx: ImportContext,
    next_id: DbId,
    snapshot: Option<Snapshot>,
    pub records: HashMap<RecordKey, StoredRecord>,
    pub scores: HashMap<DbId, Vec<ScorePoint>>,
    pub fail_titles: HashSet<String>,
    pub begun_rows: usize,
    pub aborted_rows: usize,
}

impl MemoryStore {
    pub fn new(ctx: ImportContext) -> MemoryStore {
        MemoryStore {
            ctx,
            next_id: 1,
            snapshot: None,
            records: HashMap::new(),
            scores: HashMap::new(),
            fail_titles: HashSet::new(),
            begun_rows: 0,
            aborted_rows: 0,
        }
    }

    fn key(&self, candidate: &MetricCandidate) -> RecordKey {
        RecordKey::for_entity(self.ctx.organization_id, self.ctx.team_id, candidate)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn stored(&self, title: &str) -> Option<&StoredRecord> {
        let wanted = normalize_title(title);
        self.records
            .values()
            .find(|record| normalize_title(&record.candidate.title) == wanted)
    }

    /// Score values of a metric, in period order.
    pub fn scores_of(&self, title: &str) -> Vec<ScorePoint> {
        let mut points = self
            .stored(title)
            .and_then(|record| self.scores.get(&record.id).cloned())
            .unwrap_or_default();
        points.sort_by_key(|point| point.period_end);
        points
    }
}

#[async_trait]
impl CandidateStore<MetricCandidate> for MemoryStore {
    async fn find_existing(
        &mut self,
        candidate: &MetricCandidate,
    ) -> Result<Option<DbId>, StoreError> {
        Ok(self.records.get(&self.key(candidate)).map(|r| r.id))
    }

    async fn insert(
        &mut self,
        candidate: &MetricCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        let id = self.next_id;
        self.next_id += 1;

        let entry = self.scores.entry(id).or_default();
        for point in &candidate.scores {
            if !entry.iter().any(|p| p.period_end == point.period_end) {
                entry.push(*point);
            }
        }
        self.records.insert(
            self.key(candidate),
            StoredRecord {
                id,
                candidate: candidate.clone(),
                owner_id: owner.user_id(),
                owner_source: owner.source(),
                updates: 0,
            },
        );

        // Raised after the writes: an abort has real state to undo.
        if self.fail_titles.contains(candidate.title.as_str()) {
            return Err(StoreError::Row(format!(
                "simulated failure for '{}'",
                candidate.title
            )));
        }
        Ok(())
    }

    async fn update(
        &mut self,
        existing_id: DbId,
        candidate: &MetricCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        if self.ctx.strategy == ConflictStrategy::Update {
            self.scores.insert(existing_id, Vec::new());
        }
        let entry = self.scores.entry(existing_id).or_default();
        for point in &candidate.scores {
            if !entry.iter().any(|p| p.period_end == point.period_end) {
                entry.push(*point);
            }
        }

        if self.fail_titles.contains(candidate.title.as_str()) {
            return Err(StoreError::Row(format!(
                "simulated failure for '{}'",
                candidate.title
            )));
        }

        let key = self.key(candidate);
        match self.records.get_mut(&key) {
            Some(record) => {
                record.candidate = candidate.clone();
                record.owner_id = owner.user_id();
                record.owner_source = owner.source();
                record.updates += 1;
                Ok(())
            }
            None => Err(StoreError::Row(format!(
                "no stored record for '{}'",
                candidate.title
            ))),
        }
    }

    async fn begin_row(&mut self) -> Result<(), StoreError> {
        self.begun_rows += 1;
        self.snapshot = Some(Snapshot {
            records: self.records.clone(),
            scores: self.scores.clone(),
        });
        Ok(())
    }

    async fn commit_row(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }

    async fn abort_row(&mut self) -> Result<(), StoreError> {
        self.aborted_rows += 1;
        if let Some(snapshot) = self.snapshot.take() {
            self.records = snapshot.records;
            self.scores = snapshot.scores;
        }
        Ok(())
    }
}
