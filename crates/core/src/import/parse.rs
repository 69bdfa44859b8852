//! Field parsers for spreadsheet cell content.
//!
//! Pure functions from cells (or their text) to typed values: goal
//! expressions (">= 50%"), week-range labels ("Oct 13 - Oct 19"), month
//! labels, Excel serial dates, and symbol-tolerant numeric coercion.
//! Every parser returns `Result` so each decision is independently
//! testable; callers decide whether an error means "skip the value",
//! "not a date column", or "use the default".

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::sheet::CellValue;

// ── Errors ───────────────────────────────────────────────────────────

/// A cell or label could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("'{0}' is not a date range")]
    DateRange(String),

    #[error("'{0}' is not a month label")]
    MonthLabel(String),

    #[error("'{0}' could not be read as a date")]
    Date(String),

    #[error("{0} is out of range for a spreadsheet date serial")]
    Serial(f64),

    #[error("'{0}' has no numeric content")]
    Numeric(String),
}

// ── Goal expressions ─────────────────────────────────────────────────

/// Comparison operator of a goal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalOperator {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
}

impl GoalOperator {
    pub const ALL: [GoalOperator; 5] = [
        GoalOperator::Gte,
        GoalOperator::Lte,
        GoalOperator::Gt,
        GoalOperator::Lt,
        GoalOperator::Eq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalOperator::Gte => ">=",
            GoalOperator::Lte => "<=",
            GoalOperator::Gt => ">",
            GoalOperator::Lt => "<",
            GoalOperator::Eq => "=",
        }
    }

    pub fn from_str(s: &str) -> Option<GoalOperator> {
        Self::ALL.iter().copied().find(|op| op.as_str() == s)
    }
}

impl std::fmt::Display for GoalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a higher or a lower measured value counts as better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalDirection {
    Higher,
    Lower,
}

impl GoalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalDirection::Higher => "higher",
            GoalDirection::Lower => "lower",
        }
    }
}

/// Display format of a goal's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalFormat {
    Number,
    Percentage,
    Currency,
}

impl GoalFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalFormat::Number => "number",
            GoalFormat::Percentage => "percentage",
            GoalFormat::Currency => "currency",
        }
    }
}

/// A parsed goal expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Goal {
    pub operator: GoalOperator,
    pub value: f64,
    pub direction: GoalDirection,
    pub format: GoalFormat,
}

impl Default for Goal {
    fn default() -> Self {
        Goal {
            operator: GoalOperator::Gte,
            value: 0.0,
            direction: GoalDirection::Higher,
            format: GoalFormat::Number,
        }
    }
}

/// Operator tokens in match-priority order: two-character tokens first so
/// ">=" is never read as ">" followed by "=".
const OPERATOR_TOKENS: [(&str, GoalOperator); 5] = [
    (">=", GoalOperator::Gte),
    ("<=", GoalOperator::Lte),
    (">", GoalOperator::Gt),
    ("<", GoalOperator::Lt),
    ("=", GoalOperator::Eq),
];

/// Parse a goal expression such as `">= 50%"`, `"<= 10"`, or `"$1,500"`.
///
/// Total: an empty or unreadable expression yields the default
/// `{>=, 0, higher, number}`. A trailing `%` divides the value by 100 and
/// marks the format as percentage; a `$` marks it as currency. Direction is
/// `lower` exactly for `<` and `<=`.
pub fn parse_goal(raw: &str) -> Goal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Goal::default();
    }

    let (operator, rest) = match OPERATOR_TOKENS
        .iter()
        .find(|(token, _)| trimmed.starts_with(token))
    {
        Some((token, op)) => (*op, &trimmed[token.len()..]),
        None => (GoalOperator::Gte, trimmed),
    };

    let rest = rest.trim();
    let is_percentage = rest.ends_with('%');
    let body = if is_percentage {
        rest[..rest.len() - 1].trim_end()
    } else {
        rest
    };
    let has_currency = body.contains('$');
    let cleaned: String = body.replace(['$', ','], "");

    let mut value = leading_number(cleaned.trim()).unwrap_or(0.0);
    if is_percentage {
        value /= 100.0;
    }

    let direction = match operator {
        GoalOperator::Lt | GoalOperator::Lte => GoalDirection::Lower,
        _ => GoalDirection::Higher,
    };
    let format = if has_currency {
        GoalFormat::Currency
    } else if is_percentage {
        GoalFormat::Percentage
    } else {
        GoalFormat::Number
    };

    Goal {
        operator,
        value,
        direction,
        format,
    }
}

/// Longest leading decimal number of `s`, so "50 units" reads as 50.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

// ── Date ranges ──────────────────────────────────────────────────────

/// An inclusive calendar period, as parsed from a column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// 1-based month number from a month token ("Oct", "October"), matched on
/// the 3-letter prefix, case-insensitive.
fn month_number(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    MONTH_PREFIXES
        .iter()
        .position(|prefix| lower.starts_with(prefix))
        .map(|i| i as u32 + 1)
}

/// One side of a range: `"Oct 13"` → (month, day).
fn parse_month_day(token: &str) -> Option<(u32, u32)> {
    let mut parts = token.split_whitespace();
    let month = month_number(parts.next()?)?;
    let day: u32 = parts.next()?.parse().ok()?;
    Some((month, day))
}

/// Parse a week-range label like `"Oct 13 - Oct 19"` or `"Dec 29 - Jan 4"`.
///
/// Labels carry no year, so both sides default to the year of `today`.
/// When the end month number is below the start month number the range
/// crosses a year boundary; the side inconsistent with "now" moves to the
/// adjacent year: in the first half of the year the start slips back to
/// the previous year, in the second half the end moves to the next year.
pub fn parse_week_range(raw: &str, today: NaiveDate) -> Result<DateRange, ParseError> {
    let err = || ParseError::DateRange(raw.to_string());

    let (lhs, rhs) = raw.trim().split_once(" - ").ok_or_else(err)?;
    let (start_month, start_day) = parse_month_day(lhs).ok_or_else(err)?;
    let (end_month, end_day) = parse_month_day(rhs).ok_or_else(err)?;

    let mut start_year = today.year();
    let mut end_year = today.year();
    if end_month < start_month {
        if today.month() <= 6 {
            start_year -= 1;
        } else {
            end_year += 1;
        }
    }

    let start = NaiveDate::from_ymd_opt(start_year, start_month, start_day).ok_or_else(err)?;
    let end = NaiveDate::from_ymd_opt(end_year, end_month, end_day).ok_or_else(err)?;
    Ok(DateRange { start, end })
}

/// Parse a month-cadence label like `"November"` into the full month.
///
/// Month labels also carry no year; a month later than the current one is
/// taken to be from the previous year (a monthly scorecard reports months
/// already finished or in progress, never future ones).
pub fn parse_month_column(raw: &str, today: NaiveDate) -> Result<DateRange, ParseError> {
    let err = || ParseError::MonthLabel(raw.to_string());

    let lower = raw.trim().to_lowercase();
    let month = MONTH_NAMES
        .iter()
        .position(|name| *name == lower)
        .map(|i| i as u32 + 1)
        .ok_or_else(err)?;

    let year = if month > today.month() {
        today.year() - 1
    } else {
        today.year()
    };

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(err)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let end = next_month.and_then(|d| d.pred_opt()).ok_or_else(err)?;
    Ok(DateRange { start, end })
}

// ── Dates ────────────────────────────────────────────────────────────

/// Highest serial accepted before a value is clearly not a date
/// (2958465 is 9999-12-31 in spreadsheet terms).
const MAX_DATE_SERIAL: i64 = 2_958_465;

/// Decode a spreadsheet date serial: days since 1899-12-30 (the epoch
/// shifted two days for the 1900 leap-year bug). Fractional time-of-day
/// is discarded.
pub fn excel_serial_date(serial: f64) -> Result<NaiveDate, ParseError> {
    let days = serial.trunc() as i64;
    if !(1..=MAX_DATE_SERIAL).contains(&days) {
        return Err(ParseError::Serial(serial));
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days)))
        .ok_or(ParseError::Serial(serial))
}

/// `%y` must come before `%Y`: chrono's `%Y` accepts fewer than four
/// digits, so "10/13/24" would otherwise parse as the literal year 24.
const DATE_TEXT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Parse a date out of free text, trying the formats spreadsheets emit.
/// Any time-of-day suffix ("2024-10-13T08:30:00", "10/13/2024 8:30") is cut
/// before parsing.
pub fn parse_date_text(raw: &str) -> Result<NaiveDate, ParseError> {
    let err = || ParseError::Date(raw.to_string());

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(err());
    }
    let head = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    DATE_TEXT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
        .ok_or_else(err)
}

/// Read a cell as a calendar date.
///
/// Date-typed cells pass through; numbers decode as serials; text goes
/// through [`parse_date_text`]. Everything else is an error the caller
/// treats as "no date".
pub fn cell_date(cell: &CellValue) -> Result<NaiveDate, ParseError> {
    match cell {
        CellValue::Date(date) => Ok(*date),
        CellValue::Number(serial) => excel_serial_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        other => Err(ParseError::Date(other.display())),
    }
}

// ── Numeric coercion ─────────────────────────────────────────────────

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("static pattern"));

/// Coerce free text to a number, tolerating currency and percent symbols:
/// everything except digits, `.` and `-` is stripped before parsing.
/// Never panics; empty or still-unreadable input is an error.
pub fn parse_numeric(raw: &str) -> Result<f64, ParseError> {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    if cleaned.is_empty() {
        return Err(ParseError::Numeric(raw.to_string()));
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| ParseError::Numeric(raw.to_string()))
}

/// Read a cell as a number, coercing text cells through [`parse_numeric`].
pub fn cell_numeric(cell: &CellValue) -> Result<f64, ParseError> {
    match cell {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(text) => parse_numeric(text),
        other => Err(ParseError::Numeric(other.display())),
    }
}
