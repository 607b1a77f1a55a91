use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::ConcertRecord;
use crate::ticketmaster::{FetchError, TicketmasterClient};

const BUNDLED_MOCK_DATA: &str = include_str!("../data/mock-concerts.json");

/// Where the store gets its concerts from.
pub enum ConcertSource {
    Ticketmaster(TicketmasterClient),
    /// Records already in the internal shape.
    Mock(Vec<ConcertRecord>),
}

/// A single source response, before normalization.
pub enum SourceBatch {
    Raw(Vec<Value>),
    Records(Vec<ConcertRecord>),
}

impl ConcertSource {
    pub fn name(&self) -> &'static str {
        match self {
            ConcertSource::Ticketmaster(_) => "ticketmaster",
            ConcertSource::Mock(_) => "mock",
        }
    }

    pub async fn load(&self) -> Result<SourceBatch, FetchError> {
        match self {
            ConcertSource::Ticketmaster(client) => {
                client.fetch_events().await.map(SourceBatch::Raw)
            }
            ConcertSource::Mock(records) => Ok(SourceBatch::Records(records.clone())),
        }
    }

    pub fn bundled_mock() -> Result<Self> {
        let records = parse_mock_dataset(BUNDLED_MOCK_DATA).context("bundled mock dataset")?;
        Ok(ConcertSource::Mock(records))
    }

    pub fn mock_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read mock dataset {}", path.display()))?;
        let records = parse_mock_dataset(&contents)
            .with_context(|| format!("invalid mock dataset {}", path.display()))?;
        Ok(ConcertSource::Mock(records))
    }
}

fn parse_mock_dataset(contents: &str) -> Result<Vec<ConcertRecord>> {
    let records: Vec<ConcertRecord> = serde_json::from_str(contents)?;
    Ok(records)
}
