//! Spreadsheet decoding: workbook reading, fuzzy sheet resolution, raw rows.
//!
//! Accepts an in-memory CSV or XLSX buffer and produces [`SheetTable`]s of
//! [`RawRow`]s: ordered label-to-value mappings with typed cells. Logical
//! sheets are located by [`SheetRole`]: a list of accepted spellings matched
//! case/hyphen/space-insensitively, with positional fallback when the
//! format's full sheet count is present. The first row of every sheet is the
//! header; blank rows are skipped but keep their spreadsheet line numbers.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx, XlsxError};
use chrono::NaiveDate;

use crate::import::parse;

// ── Errors ───────────────────────────────────────────────────────────

/// Fatal, pre-batch failures: the file cannot be decoded or a required
/// sheet cannot be located. Nothing has been written when these surface.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unsupported file type '.{0}' (expected .csv or .xlsx)")]
    UnsupportedFileType(String),

    #[error("file could not be read as a spreadsheet: {0}")]
    InvalidWorkbook(String),

    #[error("required sheet '{role}' not found; accepted names: {accepted:?}")]
    MissingSheet {
        role: &'static str,
        accepted: &'static [&'static str],
    },
}

// ── Cell values ──────────────────────────────────────────────────────

/// A single decoded cell.
///
/// String cells are trimmed on the way in; whitespace-only strings become
/// [`CellValue::Empty`]. Date-typed cells arrive as calendar dates with any
/// time-of-day discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The cell rendered as display text, or `None` for empty cells.
    ///
    /// Numbers and dates are stringified the way they would appear in the
    /// source file ("42", not "42.0"); used for free-text fields that a
    /// spreadsheet may have typed differently than expected.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Display rendering for error messages; empty cells show as "".
    pub fn display(&self) -> String {
        self.as_text().unwrap_or_default()
    }

    fn from_data(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            // Date-typed cells pass through as calendar dates.
            Data::DateTime(dt) => match parse::excel_serial_date(dt.as_f64()) {
                Ok(date) => CellValue::Date(date),
                Err(_) => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match parse::parse_date_text(s) {
                Ok(date) => CellValue::Date(date),
                Err(_) => CellValue::Text(s.clone()),
            },
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ── Raw rows ─────────────────────────────────────────────────────────

/// One data row: an ordered mapping of header label to cell value.
///
/// Ordering follows the sheet's columns; duplicate labels are preserved
/// (`get` returns the first). `line` is the 1-based spreadsheet line, with
/// the header on line 1, so skipped blank rows do not shift the numbers
/// reported back to the caller.
#[derive(Debug, Clone)]
pub struct RawRow {
    line: u32,
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Cell by column position (used for trailing date columns, whose
    /// labels may repeat).
    pub fn cell_at(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index).map(|(_, v)| v)
    }

    /// Cell by header label, case-insensitive.
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        let wanted = label.trim();
        self.cells
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(wanted))
            .map(|(_, v)| v)
    }

    /// First non-empty cell among a list of accepted header spellings.
    pub fn first(&self, labels: &[&str]) -> Option<&CellValue> {
        labels
            .iter()
            .filter_map(|label| self.get(label))
            .find(|cell| !cell.is_empty())
    }

    /// First non-empty cell among `labels`, rendered as trimmed text.
    pub fn text(&self, labels: &[&str]) -> Option<String> {
        self.first(labels).and_then(CellValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v))
    }
}

// ── Sheet tables ─────────────────────────────────────────────────────

/// One resolved sheet: header labels plus the ordered data rows.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetTable {
    pub(crate) fn from_grid(name: String, grid: Vec<Vec<CellValue>>) -> SheetTable {
        let mut iter = grid.into_iter();
        let headers: Vec<String> = iter
            .next()
            .map(|row| row.iter().map(|c| c.display().trim().to_string()).collect())
            .unwrap_or_default();

        let mut rows = Vec::new();
        for (i, cells) in iter.enumerate() {
            // Header is spreadsheet line 1; the first data row is line 2.
            let line = i as u32 + 2;
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            let mut padded = cells;
            if padded.len() < headers.len() {
                padded.resize(headers.len(), CellValue::Empty);
            }
            let labelled = headers
                .iter()
                .cloned()
                .chain(std::iter::repeat(String::new()))
                .zip(padded)
                .collect();
            rows.push(RawRow {
                line,
                cells: labelled,
            });
        }

        SheetTable {
            name,
            headers,
            rows,
        }
    }
}

// ── Sheet roles ──────────────────────────────────────────────────────

/// A logical sheet the format expects, with its accepted spellings.
#[derive(Debug, Clone, Copy)]
pub struct SheetRole {
    pub name: &'static str,
    pub accepted: &'static [&'static str],
}

/// Case/hyphen/space/underscore-insensitive form used for sheet matching,
/// so "Short Term", "Short-Term" and "ShortTerm" all resolve alike.
fn normalize_sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

// ── Workbook reading ─────────────────────────────────────────────────

/// Supported upload formats, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Option<FileKind> {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            Some(FileKind::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(FileKind::Xlsx)
        } else {
            None
        }
    }
}

/// An in-memory workbook: every sheet decoded into a [`SheetTable`].
///
/// A CSV file behaves as a workbook with a single sheet named after the
/// file stem.
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<SheetTable>,
}

impl Workbook {
    /// Decode `bytes` according to the extension of `file_name`.
    pub fn read(file_name: &str, bytes: &[u8]) -> Result<Workbook, FormatError> {
        match FileKind::from_file_name(file_name) {
            Some(FileKind::Xlsx) => read_xlsx(bytes),
            Some(FileKind::Csv) => read_csv(file_name, bytes),
            None => Err(FormatError::UnsupportedFileType(extension_of(file_name))),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Locate one table per role.
    ///
    /// Resolution order per role: accepted-spelling match first; when that
    /// misses and the workbook carries at least as many sheets as the
    /// format requires, the sheet at the role's position is used instead.
    /// A role that resolves neither way fails the whole call.
    pub fn resolve(&self, roles: &[SheetRole]) -> Result<Vec<&SheetTable>, FormatError> {
        let mut resolved: Vec<Option<&SheetTable>> = roles
            .iter()
            .map(|role| {
                self.sheets.iter().find(|sheet| {
                    let have = normalize_sheet_name(&sheet.name);
                    role.accepted
                        .iter()
                        .any(|accepted| normalize_sheet_name(accepted) == have)
                })
            })
            .collect();

        if self.sheets.len() >= roles.len() {
            for (i, slot) in resolved.iter_mut().enumerate() {
                if slot.is_none() {
                    *slot = self.sheets.get(i);
                }
            }
        }

        roles
            .iter()
            .zip(resolved)
            .map(|(role, slot)| {
                slot.ok_or(FormatError::MissingSheet {
                    role: role.name,
                    accepted: role.accepted,
                })
            })
            .collect()
    }
}

fn read_xlsx(bytes: &[u8]) -> Result<Workbook, FormatError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(cursor)
            .map_err(|e: XlsxError| FormatError::InvalidWorkbook(e.to_string()))?;

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| FormatError::InvalidWorkbook(format!("sheet '{name}': {e}")))?;
        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(CellValue::from_data).collect())
            .collect();
        sheets.push(SheetTable::from_grid(name, grid));
    }
    Ok(Workbook { sheets })
}

fn read_csv(file_name: &str, bytes: &[u8]) -> Result<Workbook, FormatError> {
    // Headers handled manually: date-range labels are data to us, and the
    // first line must stay aligned with the cell grid.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FormatError::InvalidWorkbook(format!("CSV: {e}")))?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    let trimmed = field.trim();
                    if trimmed.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(trimmed.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Workbook {
        sheets: vec![SheetTable::from_grid(file_stem(file_name), grid)],
    })
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
