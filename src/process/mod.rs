// src/process/mod.rs

use encoding_rs::Encoding;
use reqwest::Client;
use std::path::Path;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::Result;
use crate::fetch::download_source;

pub mod date_parser;
pub mod decode;
pub mod extract;
pub mod load;

pub use extract::{ExtractStats, HolidayEntry, RawRecord};
pub use load::{HolidayTable, PLACEHOLDER_LABEL};

/// Decode a legacy-encoded source body and extract the rows for
/// `target_year`. Undecodable and malformed lines are counted, not fatal.
pub fn extract_from_bytes(
    bytes: &[u8],
    encoding: &'static Encoding,
    target_year: i32,
) -> (Vec<HolidayEntry>, ExtractStats) {
    let decoded = decode::decode_lines(bytes, encoding);
    let mut read_stats = ExtractStats::default();
    let rows = extract::read_raw_records(decoded.text.as_bytes(), &mut read_stats);

    let (entries, mut stats) = extract::extract(rows, target_year);
    stats.undecodable = decoded.skipped_lines;
    stats.malformed = read_stats.malformed;
    (entries, stats)
}

/// Options for one extraction pass against the upstream feed.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub source_url: Url,
    pub encoding: &'static Encoding,
    pub target_year: i32,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

/// One-shot: download, decode, filter to the target year and write the
/// artifact. Runs before the table is loaded and before serving starts.
#[instrument(level = "info", skip(client, opts), fields(url = %opts.source_url, year = opts.target_year))]
pub async fn refresh_artifact(
    client: &Client,
    opts: &RefreshOptions,
    artifact: &Path,
) -> Result<ExtractStats> {
    let bytes = download_source(
        client,
        &opts.source_url,
        opts.max_retries,
        opts.initial_backoff_ms,
    )
    .await?;
    info!(bytes = bytes.len(), "downloaded holiday source");

    let (entries, stats) = extract_from_bytes(&bytes, opts.encoding, opts.target_year);
    let skipped = stats.unparseable + stats.undecodable + stats.malformed + stats.empty;
    if skipped > 0 {
        warn!(
            skipped,
            unparseable = stats.unparseable,
            undecodable = stats.undecodable,
            malformed = stats.malformed,
            "dropped source rows"
        );
    }
    info!(
        rows = stats.rows,
        kept = stats.kept,
        other_year = stats.other_year,
        "extracted holidays"
    );

    extract::write_artifact(artifact, &entries)?;
    Ok(stats)
}
