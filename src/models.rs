use serde::{Deserialize, Serialize};

pub const DEFAULT_VENUE_NAME: &str = "venue to be confirmed";
pub const DEFAULT_CITY: &str = "city unavailable";
pub const DEFAULT_DATE: &str = "date to be confirmed";
pub const DEFAULT_CURRENCY: &str = "ARS";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcertRecord {
    pub id: String,
    pub artist: String,
    pub venue_name: String,
    pub city: String,
    pub date: String, // ISO local date or DEFAULT_DATE
    pub price: Price,
    pub image_url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ConcertRecord {
    /// True when both coordinates are known, i.e. the concert can be pinned on a map.
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Price {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
    pub available: bool,
}

impl Price {
    pub fn unavailable() -> Self {
        Self {
            min: None,
            max: None,
            currency: DEFAULT_CURRENCY.to_string(),
            available: false,
        }
    }
}
