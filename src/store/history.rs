//! Append-only price history kept as a flat CSV file.

use crate::core::price::{
    PriceRecord, Snapshot, TIMESTAMP_FORMAT, parse_price, parse_timestamp,
};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const HEADER: [&str; 4] = ["subject", "buy_price", "sell_price", "timestamp"];

pub struct PriceHistoryStore {
    path: PathBuf,
}

impl PriceHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `records` in order. The header is written only when the file is
    /// created; an empty slice leaves the file untouched.
    pub fn append(&self, records: &[PriceRecord]) -> Result<usize> {
        if records.is_empty() {
            debug!("Nothing to append to price history");
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let is_new = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open price history: {}", self.path.display()))?;
        // a hand-edited file may lack the final newline
        if !is_new && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(HEADER)?;
        }
        for record in records {
            let buy = record.buy_price.to_string();
            let sell = record.sell_price.to_string();
            let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
            writer.write_record([
                record.subject.as_str(),
                buy.as_str(),
                sell.as_str(),
                timestamp.as_str(),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write price history: {}", self.path.display()))?;

        debug!(count = records.len(), path = %self.path.display(), "Appended price records");
        Ok(records.len())
    }

    /// Every parseable record, in file order. Malformed rows are skipped.
    pub fn records(&self) -> Result<Vec<PriceRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open price history: {}", self.path.display()))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.records() {
            match row.ok().as_ref().and_then(parse_row) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, path = %self.path.display(), "Skipped unparseable price history rows");
        }
        Ok(records)
    }

    /// Records sharing the most recent timestamp, in file order.
    pub fn latest_records(&self) -> Result<Vec<PriceRecord>> {
        let records = self.records()?;
        let Some(latest) = records.iter().map(|r| r.timestamp).max() else {
            return Ok(Vec::new());
        };
        Ok(records.into_iter().filter(|r| r.timestamp == latest).collect())
    }

    /// Sell price per subject at the most recent timestamp. When a subject
    /// appears more than once at that timestamp the last row wins.
    pub fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        let latest = self.latest_records()?;
        let Some(timestamp) = latest.first().map(|r| r.timestamp) else {
            return Ok(None);
        };
        let prices: HashMap<_, _> = latest
            .into_iter()
            .map(|r| (r.subject, r.sell_price))
            .collect();
        Ok(Some(Snapshot { timestamp, prices }))
    }
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn parse_row(row: &StringRecord) -> Option<PriceRecord> {
    Some(PriceRecord {
        subject: row.get(0)?.trim().to_string(),
        buy_price: parse_price(row.get(1)?)?,
        sell_price: parse_price(row.get(2)?)?,
        timestamp: parse_timestamp(row.get(3)?)?,
    })
}
