use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://app.ticketmaster.com/discovery/v2/events.json";
pub const DEFAULT_COUNTRY_CODE: &str = "US";
pub const DEFAULT_CLASSIFICATION: &str = "music";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid events endpoint {endpoint}: {reason}")]
    Endpoint { endpoint: String, reason: String },
    #[error("could not reach the API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error {0}: could not connect to the API.")]
    Status(u16),
    #[error("could not read the API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One event as the Discovery API returns it. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<RawImage>,
    pub dates: Option<RawDates>,
    #[serde(deserialize_with = "null_as_default")]
    pub price_ranges: Vec<RawPriceRange>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<RawEventEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawImage {
    pub ratio: Option<String>,
    pub width: Option<u32>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDates {
    pub start: Option<RawStart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStart {
    pub local_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEventEmbedded {
    #[serde(deserialize_with = "null_as_default")]
    pub venues: Vec<RawVenue>,
    #[serde(deserialize_with = "null_as_default")]
    pub attractions: Vec<RawAttraction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVenue {
    pub name: Option<String>,
    pub city: Option<RawCity>,
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCity {
    pub name: Option<String>,
}

// Coordinates are strings upstream; kept as raw JSON so numbers parse too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAttraction {
    pub name: Option<String>,
}

// Upstream sends `null` for empty lists as often as it omits them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<SearchEmbedded>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchEmbedded {
    events: Option<Vec<Value>>,
}

pub struct TicketmasterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    country_code: String,
    classification: String,
}

impl TicketmasterClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        country_code: impl Into<String>,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            country_code: country_code.into(),
            classification: classification.into(),
        }
    }

    fn search_url(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.endpoint).map_err(|err| FetchError::Endpoint {
            endpoint: self.endpoint.clone(),
            reason: err.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("countryCode", &self.country_code)
            .append_pair("classificationName", &self.classification)
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }

    /// Issues a single search request and returns the raw events it lists.
    ///
    /// A body without `_embedded.events` means zero results, not an error.
    pub async fn fetch_events(&self) -> Result<Vec<Value>, FetchError> {
        let url = self.search_url()?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_search_body(&body)
    }
}

/// Extracts the event list from a search body.
///
/// Events are returned as untyped JSON so one malformed record cannot fail the whole batch.
pub fn parse_search_body(body: &str) -> Result<Vec<Value>, FetchError> {
    let payload: SearchResponse = serde_json::from_str(body)?;
    Ok(payload
        .embedded
        .and_then(|embedded| embedded.events)
        .unwrap_or_default())
}
