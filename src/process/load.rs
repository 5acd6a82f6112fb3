use chrono::NaiveDate;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info, instrument};

use crate::error::{HolidayError, Result};
use crate::process::{
    date_parser::{parse_date, to_iso, LOAD_LAYOUTS},
    decode::normalize_fields,
};

/// Label used when the artifact row has no name.
pub const PLACEHOLDER_LABEL: &str = "Holiday";

/// Immutable lookup from canonical ISO date to holiday label.
///
/// Built in one go by [`load`]; there is no way to mutate it afterwards, so
/// it can be shared behind an `Arc` by every request handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayTable {
    by_date: BTreeMap<String, String>,
}

impl HolidayTable {
    pub fn lookup(&self, iso_date: &str) -> Option<&str> {
        self.by_date.get(iso_date).map(String::as_str)
    }

    pub fn lookup_date(&self, date: NaiveDate) -> Option<&str> {
        self.lookup(&to_iso(date))
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Whether any entry falls in `year`.
    pub fn has_year(&self, year: i32) -> bool {
        let prefix = format!("{:04}-", year);
        self.by_date.keys().any(|k| k.starts_with(&prefix))
    }

    /// Entries in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_date.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HolidayTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        HolidayTable {
            by_date: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub unparseable: usize,
    pub defaulted: usize,
    pub overwritten: usize,
}

/// Build a table from headerless `date,label` rows. Unparseable dates are
/// skipped, empty labels become [`PLACEHOLDER_LABEL`], later duplicates win.
pub fn load<R: Read>(reader: R) -> Result<(HolidayTable, LoadStats)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut stats = LoadStats::default();
    let mut by_date = BTreeMap::new();

    for rec in rdr.records() {
        let rec = rec?;
        stats.rows += 1;
        let fields = normalize_fields(rec.iter());
        let Some(date_str) = fields.first() else {
            continue;
        };
        let date = match parse_date(date_str, LOAD_LAYOUTS) {
            Ok(d) => d,
            Err(e) => {
                debug!(row = stats.rows, error = %e, "skipping artifact row");
                stats.unparseable += 1;
                continue;
            }
        };
        let label = match fields.get(1).filter(|l| !l.is_empty()) {
            Some(l) => l.clone(),
            None => {
                stats.defaulted += 1;
                PLACEHOLDER_LABEL.to_string()
            }
        };
        if by_date.insert(to_iso(date), label).is_some() {
            stats.overwritten += 1;
        }
    }

    Ok((HolidayTable { by_date }, stats))
}

/// Open and load the artifact at `path`. A missing or unreadable file is fatal.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_path(path: &Path) -> Result<HolidayTable> {
    let file = File::open(path).map_err(|e| HolidayError::artifact(path, e))?;
    let (table, stats) = load(BufReader::new(file)).map_err(|e| match e {
        HolidayError::Csv(err) if err.is_io_error() => HolidayError::artifact(path, err.into()),
        other => other,
    })?;
    info!(
        holidays = table.len(),
        rows = stats.rows,
        skipped = stats.unparseable,
        defaulted = stats.defaulted,
        overwritten = stats.overwritten,
        "loaded holiday table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn last_write_wins_for_duplicate_dates() {
        let csv = "2026-05-04,みどりの日\n2026-05-04,振替休日\n";
        let (table, stats) = load(csv.as_bytes()).unwrap();
        assert_eq!(table.lookup("2026-05-04"), Some("振替休日"));
        assert_eq!(table.len(), 1);
        assert_eq!(stats.overwritten, 1);
    }

    #[test]
    fn empty_label_gets_placeholder() {
        let (table, stats) = load("2026-03-20,\n2026-04-29\n".as_bytes()).unwrap();
        assert_eq!(table.lookup("2026-03-20"), Some(PLACEHOLDER_LABEL));
        assert_eq!(table.lookup("2026-04-29"), Some(PLACEHOLDER_LABEL));
        assert_eq!(stats.defaulted, 2);
    }

    #[test]
    fn legacy_slash_dates_are_canonicalized() {
        let (table, _) = load("2026/1/1,元日\n\u{FEFF}2026/02/11 , 建国記念の日 \n".as_bytes()).unwrap();
        assert_eq!(table.lookup("2026-01-01"), Some("元日"));
        assert_eq!(table.lookup("2026-02-11"), Some("建国記念の日"));
    }

    #[test]
    fn unparseable_rows_are_skipped() {
        let (table, stats) = load("garbage,x\n2026-11-03,文化の日\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(stats.unparseable, 1);
        assert_eq!(table.lookup("2026-11-03"), Some("文化の日"));
    }

    #[test]
    fn loading_twice_is_identical() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2026-01-01,元日").unwrap();
        writeln!(file, "2026-05-05,こどもの日").unwrap();
        let a = load_path(file.path()).unwrap();
        let b = load_path(file.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().count(), 2);
    }

    #[test]
    fn missing_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_path(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, HolidayError::ArtifactIo { .. }));
    }

    #[test]
    fn lookup_by_date() {
        let table: HolidayTable = [("2026-01-01", "元日")].into_iter().collect();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(table.lookup_date(date), Some("元日"));
        assert_eq!(table.lookup("2026-01-02"), None);
        assert!(table.has_year(2026));
        assert!(!table.has_year(2027));
    }
}
