use chrono::{Datelike, NaiveDate};
use std::{
    fs::{self, File},
    io::{BufWriter, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::{HolidayError, Result};
use crate::process::{
    date_parser::{parse_date, to_iso, EXTRACT_LAYOUTS},
    decode::normalize_fields,
};

/// One source row, fields in source order. Only the first two are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord(pub Vec<String>);

impl From<csv::StringRecord> for RawRecord {
    fn from(rec: csv::StringRecord) -> Self {
        RawRecord(rec.iter().map(str::to_string).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for RawRecord {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        RawRecord(iter.into_iter().map(Into::into).collect())
    }
}

/// A holiday as written to the durable artifact. The label is kept exactly
/// as the source supplied it, empty included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayEntry {
    pub date: NaiveDate,
    pub label: String,
}

impl HolidayEntry {
    pub fn iso_date(&self) -> String {
        to_iso(self.date)
    }
}

/// Counters for one extraction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub rows: usize,
    pub kept: usize,
    pub empty: usize,
    pub unparseable: usize,
    pub other_year: usize,
    pub undecodable: usize,
    pub malformed: usize,
}

/// Filter raw rows to `target_year` and normalize them into entries,
/// preserving source order and any duplicate dates.
pub fn extract<I>(rows: I, target_year: i32) -> (Vec<HolidayEntry>, ExtractStats)
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut stats = ExtractStats::default();
    let mut entries = Vec::new();

    for RawRecord(fields) in rows {
        stats.rows += 1;
        let fields = normalize_fields(fields.iter().map(String::as_str));
        let Some(date_str) = fields.first() else {
            stats.empty += 1;
            continue;
        };
        let date = match parse_date(date_str, EXTRACT_LAYOUTS) {
            Ok(d) => d,
            Err(e) => {
                debug!(row = stats.rows, error = %e, "skipping row");
                stats.unparseable += 1;
                continue;
            }
        };
        if date.year() != target_year {
            stats.other_year += 1;
            continue;
        }
        let label = fields.get(1).cloned().unwrap_or_default();
        entries.push(HolidayEntry { date, label });
    }

    stats.kept = entries.len();
    (entries, stats)
}

/// Read comma-separated rows of any arity from decoded text.
///
/// Records the csv reader rejects are counted and skipped.
pub fn read_raw_records<R: Read>(reader: R, stats: &mut ExtractStats) -> Vec<RawRecord> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for rec in rdr.records() {
        match rec {
            Ok(rec) => rows.push(RawRecord::from(rec)),
            Err(e) => {
                debug!(error = %e, "csv read warning");
                stats.malformed += 1;
            }
        }
    }
    rows
}

/// Write entries as a headerless two-column UTF-8 CSV.
///
/// Writes to `<path>.tmp` and renames over `path`, so a reader never sees
/// a half-written artifact.
pub fn write_artifact(path: &Path, entries: &[HolidayEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HolidayError::artifact(parent, e))?;
    }

    let tmp_path = tmp_path_for(path);
    let file = File::create(&tmp_path).map_err(|e| HolidayError::artifact(&tmp_path, e))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    for entry in entries {
        wtr.write_record([entry.iso_date().as_str(), entry.label.as_str()])?;
    }

    wtr.flush().map_err(|e| HolidayError::artifact(&tmp_path, e))?;
    drop(wtr);

    fs::rename(&tmp_path, path).map_err(|e| HolidayError::artifact(path, e))?;
    info!(path = %path.display(), entries = entries.len(), "wrote holiday artifact");
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
