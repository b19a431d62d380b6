use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::{StudySession, TimeOfDay};

pub const EXPECTED_COLUMNS: [&str; 4] = ["Full_Date", "Study", "Hours", "Tod"];

/// Date layouts accepted in `Full_Date`. Month-first before day-first, matching
/// what the published sheet emits.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

/// What happened to each raw row during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub rows: u64,
    pub kept: u64,
    pub blank_rows: u64,
    pub bad_dates: u64,
    pub bad_hours: u64,
    pub missing_tod: u64,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetManifest {
    pub source: String,
    pub hash_sha256: String,
    pub schema: SchemaReport,
    pub report: IngestReport,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct Ingested {
    pub sessions: Vec<StudySession>,
    pub report: IngestReport,
}

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct Layout {
    date: usize,
    study: usize,
    hours: usize,
    tod: usize,
}

impl Layout {
    fn resolve(header: &[String]) -> Result<Self, String> {
        let index: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let find = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| format!("missing column {}", name))
        };
        Ok(Self {
            date: find("Full_Date")?,
            study: find("Study")?,
            hours: find("Hours")?,
            tod: find("Tod")?,
        })
    }
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

pub fn read_header(text: &str) -> Result<Vec<String>, String> {
    let mut rdr = reader(text);
    let header = rdr.headers().map_err(|e| format!("bad header: {}", e))?;
    Ok(header.iter().map(|s| s.trim_start_matches('\u{feff}').to_string()).collect())
}

/// Checks that every expected column is present. Extra columns and ordering are ignored.
pub fn validate_schema(text: &str) -> Result<SchemaReport, String> {
    let columns = read_header(text)?;
    let expected: Vec<String> = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|c| !columns.contains(c))
        .cloned()
        .collect();
    let ok = missing.is_empty();
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: missing {:?}, got {:?}", missing, columns)
    };
    Ok(SchemaReport {
        columns,
        expected,
        missing,
        ok,
        message,
    })
}

/// Parses the raw CSV into normalized sessions.
///
/// Rows with an unparseable date or hours value are dropped and counted in the
/// report. A missing required column or a CSV syntax error fails the whole
/// document.
pub fn parse_sessions(text: &str) -> Result<Ingested, String> {
    let header = read_header(text)?;
    let layout = Layout::resolve(&header)?;

    let mut rdr = reader(text);
    let mut report = IngestReport::default();
    let mut sessions = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| format!("csv error near row {}: {}", idx + 1, e))?;
        report.rows += 1;
        if record.iter().all(|f| f.is_empty()) {
            report.blank_rows += 1;
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or("");

        let full_date = match parse_date(field(layout.date)) {
            Ok(d) => d,
            Err(err) => {
                report.bad_dates += 1;
                report.warnings.push(format!("row {}: {}", idx + 1, err));
                continue;
            }
        };
        let hours = match parse_hours(field(layout.hours)) {
            Ok(h) => h,
            Err(err) => {
                report.bad_hours += 1;
                report.warnings.push(format!("row {}: {}", idx + 1, err));
                continue;
            }
        };
        let time_of_day = TimeOfDay::parse(field(layout.tod));
        if time_of_day.is_none() {
            report.missing_tod += 1;
        }

        report.kept += 1;
        report.date_min = Some(report.date_min.map_or(full_date, |d| d.min(full_date)));
        report.date_max = Some(report.date_max.map_or(full_date, |d| d.max(full_date)));
        sessions.push(StudySession {
            full_date,
            study: field(layout.study).to_string(),
            hours,
            time_of_day,
        });
    }

    Ok(Ingested { sessions, report })
}

/// Parses `Full_Date`, ignoring any time-of-day suffix after a space or `T`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let day = raw
        .trim()
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    if day.is_empty() {
        return Err("empty date".to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .ok_or_else(|| format!("bad date: {:?}", raw))
}

/// Coerces `Hours` to a finite, non-negative number.
pub fn parse_hours(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty hours".to_string());
    }
    let hours: f64 = trimmed
        .parse()
        .map_err(|e| format!("bad hours {:?}: {}", raw, e))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(format!("hours out of range: {}", hours));
    }
    Ok(hours)
}

pub fn content_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn build_manifest(source: &str, text: &str, generated_at: String) -> Result<SheetManifest, String> {
    let schema = validate_schema(text)?;
    let report = if schema.ok {
        parse_sessions(text)?.report
    } else {
        IngestReport::default()
    };
    Ok(SheetManifest {
        source: source.to_string(),
        hash_sha256: content_sha256(text),
        schema,
        report,
        generated_at,
    })
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("sessions.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
