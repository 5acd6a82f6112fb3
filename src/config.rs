use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use url::Url;

use crate::fetch::DEFAULT_SOURCE_URL;

/// Serve a month calendar annotated with Japanese national holidays.
#[derive(Debug, Clone, Parser)]
#[command(name = "holidaycal", version, about)]
pub struct Args {
    /// Listen address
    #[arg(long, env = "HOLIDAYCAL_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Output CSV path (UTF-8, target year only) [default: holidays_<year>.csv]
    #[arg(long = "csv", env = "HOLIDAYCAL_CSV")]
    pub csv_path: Option<PathBuf>,

    /// Re-download even if the CSV already exists
    #[arg(long)]
    pub force: bool,

    /// Year to extract and display
    #[arg(
        long,
        env = "HOLIDAYCAL_YEAR",
        default_value_t = 2026,
        value_parser = clap::value_parser!(i32).range(1..=9999)
    )]
    pub year: i32,

    /// Upstream holiday list
    #[arg(long, env = "HOLIDAYCAL_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: Url,

    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    #[arg(long, default_value_t = 2)]
    pub fetch_retries: u32,
}

impl Args {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Artifact path; defaults to one file per year so switching `--year`
    /// never reuses another year's extraction.
    pub fn artifact_path(&self) -> PathBuf {
        self.csv_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("holidays_{}.csv", self.year)))
    }

    /// Refresh when forced or when there is no artifact yet.
    pub fn needs_refresh(&self) -> bool {
        self.force || !self.artifact_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["holidaycal"]).unwrap();
        assert_eq!(args.year, 2026);
        assert_eq!(args.artifact_path(), PathBuf::from("holidays_2026.csv"));
        assert_eq!(args.source_url.as_str(), DEFAULT_SOURCE_URL);
        assert_eq!(args.fetch_timeout(), Duration::from_secs(30));
        assert!(!args.force);
    }

    #[test]
    fn artifact_path_follows_year_unless_given() {
        let args = Args::try_parse_from(["holidaycal", "--year", "2027"]).unwrap();
        assert_eq!(args.artifact_path(), PathBuf::from("holidays_2027.csv"));
        let args =
            Args::try_parse_from(["holidaycal", "--year", "2027", "--csv", "mine.csv"]).unwrap();
        assert_eq!(args.artifact_path(), PathBuf::from("mine.csv"));
    }

    #[test]
    fn year_outside_calendar_range_is_rejected() {
        assert!(Args::try_parse_from(["holidaycal", "--year", "300000"]).is_err());
        assert!(Args::try_parse_from(["holidaycal", "--year", "0"]).is_err());
        assert!(Args::try_parse_from(["holidaycal", "--year", "9999"]).is_ok());
    }

    #[test]
    fn force_always_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("h.csv");
        std::fs::write(&existing, "2026-01-01,元日\n").unwrap();
        let path = existing.to_str().unwrap();

        let args = Args::try_parse_from(["holidaycal", "--csv", path]).unwrap();
        assert!(!args.needs_refresh());
        let args = Args::try_parse_from(["holidaycal", "--csv", path, "--force"]).unwrap();
        assert!(args.needs_refresh());
        let args = Args::try_parse_from(["holidaycal", "--csv", "/nonexistent/h.csv"]).unwrap();
        assert!(args.needs_refresh());
    }
}
