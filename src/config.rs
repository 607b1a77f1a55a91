use std::{fs, path::Path, path::PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::source::ConcertSource;
use crate::ticketmaster::{
    TicketmasterClient, DEFAULT_CLASSIFICATION, DEFAULT_COUNTRY_CODE, DEFAULT_ENDPOINT,
};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Ticketmaster,
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `None` picks Ticketmaster when an API key is available, the mock dataset otherwise.
    pub source: Option<SourceKind>,
    pub events_endpoint: String,
    pub country_code: String,
    pub classification: String,
    pub mock_data_path: Option<PathBuf>,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            events_endpoint: DEFAULT_ENDPOINT.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            classification: DEFAULT_CLASSIFICATION.to_string(),
            mock_data_path: None,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from the data directory, then applies environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from(&utils::config_path());
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    pub fn load_from(path: &Path) -> Self {
        match read_config(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(source) = var("SOUNDSPOT_SOURCE") {
            match source.trim().to_lowercase().as_str() {
                "ticketmaster" => self.source = Some(SourceKind::Ticketmaster),
                "mock" => self.source = Some(SourceKind::Mock),
                other => tracing::warn!(value = other, "unknown SOUNDSPOT_SOURCE, ignoring"),
            }
        }
        if let Some(endpoint) = var("TICKETMASTER_ENDPOINT") {
            self.events_endpoint = endpoint;
        }
        if let Some(country) = var("TICKETMASTER_COUNTRY_CODE") {
            self.country_code = country;
        }
        if let Some(classification) = var("TICKETMASTER_CLASSIFICATION") {
            self.classification = classification;
        }
        if let Some(path) = var("SOUNDSPOT_MOCK_DATA") {
            self.mock_data_path = Some(PathBuf::from(path));
        }
        if let Some(key) = var("TICKETMASTER_API_KEY") {
            self.api_key = Some(key.trim().to_string());
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.unwrap_or(if self.api_key.is_some() {
            SourceKind::Ticketmaster
        } else {
            SourceKind::Mock
        })
    }

    pub fn build_source(&self) -> Result<ConcertSource> {
        match self.source_kind() {
            SourceKind::Ticketmaster => {
                let api_key = self
                    .api_key
                    .clone()
                    .ok_or_else(|| anyhow!("TICKETMASTER_API_KEY is not set"))?;
                Ok(ConcertSource::Ticketmaster(TicketmasterClient::new(
                    self.events_endpoint.clone(),
                    api_key,
                    self.country_code.clone(),
                    self.classification.clone(),
                )))
            }
            SourceKind::Mock => match &self.mock_data_path {
                Some(path) => ConcertSource::mock_from_file(path),
                None => ConcertSource::bundled_mock(),
            },
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
