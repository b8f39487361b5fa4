/// Transfer ingestion from ledger exports

pub mod csv_loader;

pub use csv_loader::{parse_timestamp, parse_transfers, read_transfers, IngestError, IngestReport};
