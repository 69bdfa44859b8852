//! Result envelopes shared by the import pipeline's two modes.
//!
//! Preview and execute run the same stages; these types are what each
//! mode hands back. Field names are stable API surface.

use serde::Serialize;

/// How many candidates a preview sample carries at most.
pub const SAMPLE_SIZE: usize = 10;

/// A row the transformer dropped before it became a candidate, with the
/// reason it was unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSkip {
    pub row: u32,
    pub reason: String,
}

/// A candidate together with the sheet row it came from, so later errors
/// can point back at the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbered<C> {
    pub row: u32,
    pub value: C,
}

/// Everything a row transformer produced from one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput<C> {
    pub candidates: Vec<Numbered<C>>,
    pub dropped: Vec<RowSkip>,
}

impl<C> Default for TransformOutput<C> {
    fn default() -> Self {
        TransformOutput {
            candidates: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

/// A row-scoped failure recorded during execution. The identifier is the
/// candidate's title when one exists, otherwise its sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row_identifier: String,
    pub message: String,
}

/// Aggregate result of an executed import batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

impl ImportOutcome {
    /// Rows that reached a terminal state, one way or another.
    pub fn total_processed(&self) -> usize {
        self.created + self.updated + self.skipped + self.errors.len()
    }
}

/// Dry-run report: what an execute call over the same file would do.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport<C> {
    pub total_candidates: usize,
    pub new_count: usize,
    pub conflicting_count: usize,
    pub unmapped_names: Vec<String>,
    pub sample: Vec<C>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_serializes_with_stable_field_names() {
        let outcome = ImportOutcome {
            created: 3,
            updated: 1,
            skipped: 2,
            errors: vec![RowError {
                row_identifier: "Weekly Revenue".into(),
                message: "owner column unreadable".into(),
            }],
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "created": 3,
                "updated": 1,
                "skipped": 2,
                "errors": [
                    {"row_identifier": "Weekly Revenue", "message": "owner column unreadable"}
                ]
            })
        );
        assert_eq!(outcome.total_processed(), 7);
    }

    #[test]
    fn preview_serializes_with_stable_field_names() {
        let report = PreviewReport::<String> {
            total_candidates: 2,
            new_count: 1,
            conflicting_count: 1,
            unmapped_names: vec!["Jordan".into()],
            sample: vec!["first".into()],
            warnings: vec![],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["total_candidates"], json!(2));
        assert_eq!(value["new_count"], json!(1));
        assert_eq!(value["conflicting_count"], json!(1));
        assert_eq!(value["unmapped_names"], json!(["Jordan"]));
        assert_eq!(value["sample"], json!(["first"]));
    }
}
