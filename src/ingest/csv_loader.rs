use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::Transfer;

pub const REQUIRED_COLUMNS: [&str; 5] =
    ["transaction_id", "sender_id", "receiver_id", "amount", "timestamp"];

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column(s) missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Parsed transfers plus what had to be left out or degraded
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub transfers: Vec<Transfer>,
    /// Rows dropped for a bad amount or a blank account
    pub skipped_rows: usize,
    /// Rows kept without a usable timestamp
    pub unparsed_timestamps: usize,
}

struct ColumnIndex {
    id: usize,
    sender: usize,
    receiver: usize,
    amount: usize,
    timestamp: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |column: &str| names.iter().position(|name| name == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| position(column).is_none())
            .map(|column| column.to_string())
            .collect();

        match (
            position("transaction_id"),
            position("sender_id"),
            position("receiver_id"),
            position("amount"),
            position("timestamp"),
        ) {
            (Some(id), Some(sender), Some(receiver), Some(amount), Some(timestamp)) => Ok(Self {
                id,
                sender,
                receiver,
                amount,
                timestamp,
            }),
            _ => Err(IngestError::MissingColumns(missing)),
        }
    }
}

pub fn read_transfers(path: impl AsRef<Path>) -> Result<IngestReport, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("📥 Reading transfers from {}", path.display());
    parse_transfers(file)
}

pub fn parse_transfers<R: Read>(reader: R) -> Result<IngestReport, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;
    let mut report = IngestReport::default();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let sender = field(columns.sender);
        let receiver = field(columns.receiver);
        if sender.is_empty() || receiver.is_empty() {
            debug!("Row {}: blank sender or receiver, skipped", row + 1);
            report.skipped_rows += 1;
            continue;
        }

        let amount = match field(columns.amount).parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
            _ => {
                debug!("Row {}: unusable amount {:?}, skipped", row + 1, field(columns.amount));
                report.skipped_rows += 1;
                continue;
            }
        };

        let timestamp = parse_timestamp(field(columns.timestamp));
        if timestamp.is_none() {
            report.unparsed_timestamps += 1;
        }

        report.transfers.push(Transfer {
            id: field(columns.id).to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            timestamp,
        });
    }

    if report.skipped_rows > 0 {
        warn!("⚠️ Skipped {} malformed rows", report.skipped_rows);
    }
    if report.unparsed_timestamps > 0 {
        warn!(
            "⚠️ {} rows have unparseable timestamps and are excluded from velocity analysis",
            report.unparsed_timestamps
        );
    }
    info!("✅ Loaded {} transfers", report.transfers.len());

    Ok(report)
}

/// Parse a ledger timestamp; zone-less values are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
