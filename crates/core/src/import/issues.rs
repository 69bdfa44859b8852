//! Issues row transformer.
//!
//! An issues workbook carries two sheets, one per planning horizon. Each
//! data row becomes an [`IssueCandidate`] tagged with its sheet's
//! timeline; lifecycle dates drive the status, never a status column.

use super::candidate::{IssueCandidate, IssuePriority, IssueStatus, Timeline};
use super::outcome::{Numbered, RowSkip, TransformOutput};
use super::parse;
use crate::sheet::{SheetRole, SheetTable};

/// Sheet roles for the two horizons. Matching is case-, space-, and
/// hyphen-insensitive, so "Short-Term" and "short term" bind too; a
/// workbook with unrecognised names binds its first two sheets in order.
pub const SHORT_TERM_SHEET: SheetRole = SheetRole {
    name: "short_term",
    accepted: &["Short Term"],
};

pub const LONG_TERM_SHEET: SheetRole = SheetRole {
    name: "long_term",
    accepted: &["Long Term"],
};

pub const TITLE_COLUMNS: &[&str] = &["Title"];
pub const OWNER_COLUMNS: &[&str] = &["Owner"];
pub const ASSIGNEE_COLUMNS: &[&str] = &["Who"];
pub const DESCRIPTION_COLUMNS: &[&str] = &["Description"];
pub const PRIORITY_COLUMNS: &[&str] = &["Priority"];
pub const CREATED_COLUMNS: &[&str] = &["Created Date", "Created"];
pub const COMPLETED_COLUMNS: &[&str] = &["Completed On", "Completed"];
pub const ARCHIVED_COLUMNS: &[&str] = &["Archived Date", "Archived"];
pub const LINK_COLUMNS: &[&str] = &["Link", "URL"];

/// Transform both sheets of an issues workbook into one candidate list,
/// short-term rows first.
pub fn transform_issues(
    short_term: &SheetTable,
    long_term: &SheetTable,
) -> TransformOutput<IssueCandidate> {
    let mut out = TransformOutput::default();
    transform_sheet(short_term, Timeline::ShortTerm, &mut out);
    transform_sheet(long_term, Timeline::LongTerm, &mut out);
    out
}

fn transform_sheet(
    table: &SheetTable,
    timeline: Timeline,
    out: &mut TransformOutput<IssueCandidate>,
) {
    for row in &table.rows {
        let Some(title) = row.text(TITLE_COLUMNS) else {
            out.dropped.push(RowSkip {
                row: row.line(),
                reason: format!("sheet '{}': row has no title", table.name),
            });
            continue;
        };

        // Unreadable date cells read as "no date", never as a row failure.
        let created_date = row.first(CREATED_COLUMNS).and_then(|c| parse::cell_date(c).ok());
        let completed_date = row
            .first(COMPLETED_COLUMNS)
            .and_then(|c| parse::cell_date(c).ok());
        let archived_date = row
            .first(ARCHIVED_COLUMNS)
            .and_then(|c| parse::cell_date(c).ok());

        out.candidates.push(Numbered {
            row: row.line(),
            value: IssueCandidate {
                title,
                description: row.text(DESCRIPTION_COLUMNS),
                owner_name: row.text(OWNER_COLUMNS),
                assignee_name: row.text(ASSIGNEE_COLUMNS),
                priority: row
                    .text(PRIORITY_COLUMNS)
                    .map(|t| IssuePriority::from_text(&t))
                    .unwrap_or(IssuePriority::Medium),
                status: IssueStatus::from_dates(completed_date, archived_date),
                timeline,
                created_date,
                completed_date,
                archived_date,
                link: row.text(LINK_COLUMNS),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::sheet::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    const HEADERS: [&str; 8] = [
        "Title",
        "Owner",
        "Who",
        "Description",
        "Priority",
        "Created Date",
        "Completed On",
        "Archived Date",
    ];

    fn sheet(name: &str, rows: Vec<Vec<CellValue>>) -> SheetTable {
        let mut grid = vec![HEADERS.iter().map(|h| text(h)).collect::<Vec<_>>()];
        grid.extend(rows);
        SheetTable::from_grid(name.into(), grid)
    }

    fn empty_sheet(name: &str) -> SheetTable {
        sheet(name, vec![])
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_row_mapping() {
        let short = sheet(
            "Short Term",
            vec![vec![
                text("Printer on fire"),
                text("Michael Scott"),
                text("Dwight Schrute"),
                text("It is still on fire"),
                text("Urgent"),
                text("2024-10-01"),
                CellValue::Empty,
                CellValue::Empty,
            ]],
        );
        let out = transform_issues(&short, &empty_sheet("Long Term"));
        assert_eq!(out.candidates.len(), 1);

        let issue = &out.candidates[0].value;
        assert_eq!(issue.title, "Printer on fire");
        assert_eq!(issue.owner_name.as_deref(), Some("Michael Scott"));
        assert_eq!(issue.assignee_name.as_deref(), Some("Dwight Schrute"));
        assert_eq!(issue.description.as_deref(), Some("It is still on fire"));
        assert_eq!(issue.priority, IssuePriority::Critical);
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.timeline, Timeline::ShortTerm);
        assert_eq!(issue.created_date, Some(date(2024, 10, 1)));
        assert_eq!(issue.completed_date, None);
        assert_eq!(issue.link, None);
    }

    #[test]
    fn test_status_follows_lifecycle_dates() {
        let short = sheet(
            "Short Term",
            vec![
                vec![text("Open issue")],
                vec![
                    text("Solved issue"),
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    text("10/05/2024"),
                ],
                vec![
                    text("Archived issue"),
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    text("10/05/2024"),
                    text("10/09/2024"),
                ],
            ],
        );
        let out = transform_issues(&short, &empty_sheet("Long Term"));
        let statuses: Vec<IssueStatus> =
            out.candidates.iter().map(|c| c.value.status).collect();
        assert_eq!(
            statuses,
            vec![IssueStatus::Open, IssueStatus::Solved, IssueStatus::Archived]
        );
    }

    #[test]
    fn test_both_sheets_carry_their_timeline() {
        let short = sheet("Short Term", vec![vec![text("This week's fire")]]);
        let long = sheet("Long Term", vec![vec![text("Next quarter's fire")]]);
        let out = transform_issues(&short, &long);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].value.timeline, Timeline::ShortTerm);
        assert_eq!(out.candidates[1].value.timeline, Timeline::LongTerm);
    }

    #[test]
    fn test_untitled_rows_dropped_per_sheet() {
        let short = sheet(
            "Short Term",
            vec![vec![CellValue::Empty, text("Michael Scott")]],
        );
        let out = transform_issues(&short, &empty_sheet("Long Term"));
        assert!(out.candidates.is_empty());
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].row, 2);
        assert!(out.dropped[0].reason.contains("Short Term"));
    }

    #[test]
    fn test_unreadable_dates_and_priority_default() {
        let short = sheet(
            "Short Term",
            vec![vec![
                text("Vague issue"),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                text("someday"),
                text("last Tuesday"),
            ]],
        );
        let out = transform_issues(&short, &empty_sheet("Long Term"));
        let issue = &out.candidates[0].value;
        assert_eq!(issue.priority, IssuePriority::Medium);
        assert_eq!(issue.created_date, None);
        assert_eq!(issue.status, IssueStatus::Open);
    }
}
