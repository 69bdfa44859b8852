//! Scorecard row transformer.
//!
//! Turns a scorecard sheet into [`MetricCandidate`] records. Label columns
//! are found by header name (with the spellings different export tools
//! use); every remaining header that parses as a period label becomes a
//! score column. The period labels are parsed once, up front, so a
//! thousand-row sheet does not re-parse "Oct 13 - Oct 19" per row.

use chrono::NaiveDate;

use super::candidate::{Cadence, MetricCandidate, ScorePoint};
use super::outcome::{Numbered, RowSkip, TransformOutput};
use super::parse;
use crate::sheet::{SheetRole, SheetTable};

/// The sheet holding metrics. CSV exports have a single unnamed sheet, so
/// single-sheet workbooks bind positionally whatever the name.
pub const SCORECARD_SHEET: SheetRole = SheetRole {
    name: "scorecard",
    accepted: &["Scorecard", "Score Card", "Weekly Scorecard", "Data"],
};

pub const GROUP_COLUMNS: &[&str] = &["Group", "Category"];
pub const TITLE_COLUMNS: &[&str] = &["Title", "Measurable", "Name"];
pub const DESCRIPTION_COLUMNS: &[&str] = &["Description", "Notes"];
pub const OWNER_COLUMNS: &[&str] = &["Owner", "Who", "Accountable"];
pub const GOAL_COLUMNS: &[&str] = &["Goal", "Target"];

/// Group assigned to rows whose group cell is blank.
pub const DEFAULT_GROUP: &str = "Uncategorized";

/// A header column that parsed as a calendar period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodColumn {
    pub index: usize,
    pub label: String,
    pub period_end: NaiveDate,
}

/// Headers that read as period labels under the given cadence, in column
/// order. Summary headers ("Average", "Total") and the label columns fail
/// the date parse and drop out naturally.
pub fn period_columns(table: &SheetTable, cadence: Cadence, today: NaiveDate) -> Vec<PeriodColumn> {
    table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            let range = match cadence {
                Cadence::Weekly => parse::parse_week_range(label, today),
                Cadence::Monthly => parse::parse_month_column(label, today),
            }
            .ok()?;
            Some(PeriodColumn {
                index,
                label: label.clone(),
                period_end: range.end,
            })
        })
        .collect()
}

/// Transform every data row of a scorecard sheet.
///
/// A row without a title cannot become a metric and is dropped with a
/// reason. Score cells that are empty or unreadable contribute no score
/// but never invalidate the row.
pub fn transform_scorecard(
    table: &SheetTable,
    cadence: Cadence,
    today: NaiveDate,
) -> TransformOutput<MetricCandidate> {
    let periods = period_columns(table, cadence, today);
    let mut out = TransformOutput::default();

    for row in &table.rows {
        let Some(title) = row.text(TITLE_COLUMNS) else {
            out.dropped.push(RowSkip {
                row: row.line(),
                reason: "no title in any of the accepted title columns".into(),
            });
            continue;
        };

        let goal_raw = row.text(GOAL_COLUMNS);
        let goal = parse::parse_goal(goal_raw.as_deref().unwrap_or(""));

        let mut scores = Vec::new();
        for period in &periods {
            let Some(cell) = row.cell_at(period.index) else {
                continue;
            };
            if cell.is_empty() {
                continue;
            }
            if let Ok(value) = parse::cell_numeric(cell) {
                scores.push(ScorePoint {
                    period_end: period.period_end,
                    value,
                });
            }
        }

        out.candidates.push(Numbered {
            row: row.line(),
            value: MetricCandidate {
                group_name: row
                    .text(GROUP_COLUMNS)
                    .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
                title,
                description: row.text(DESCRIPTION_COLUMNS),
                owner_name: row.text(OWNER_COLUMNS),
                goal_raw,
                goal,
                cadence,
                scores,
            },
        });
    }

    out
}
