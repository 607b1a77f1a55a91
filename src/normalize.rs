//! Conversion from Discovery API events to [`ConcertRecord`]s.
//!
//! Upstream payloads are partial and inconsistent; every venue, price and date
//! field falls back independently. Only a missing id or a missing image makes
//! an event unusable.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    ConcertRecord, Price, DEFAULT_CITY, DEFAULT_CURRENCY, DEFAULT_DATE, DEFAULT_VENUE_NAME,
};
use crate::ticketmaster::{RawEvent, RawImage, RawVenue};

const PREFERRED_RATIOS: [&str; 2] = ["16_9", "16:9"];
const MIN_PREFERRED_WIDTH: u32 = 400;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event has no id")]
    MissingId,
    #[error("event {id} has no usable image")]
    NoImages { id: String },
}

/// Deserializes one untyped event and normalizes it.
pub fn normalize_value(value: Value) -> Result<ConcertRecord, NormalizeError> {
    let raw: RawEvent = serde_json::from_value(value)?;
    normalize(raw)
}

/// Maps one raw event to the internal record shape.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingId`] when the event carries no id and
/// [`NormalizeError::NoImages`] when no image url can be selected.
pub fn normalize(raw: RawEvent) -> Result<ConcertRecord, NormalizeError> {
    let id = non_empty(raw.id).ok_or(NormalizeError::MissingId)?;
    let image_url = match select_image(&raw.images) {
        Some(url) => url.to_string(),
        None => return Err(NormalizeError::NoImages { id }),
    };

    let embedded = raw.embedded.unwrap_or_default();
    let headliner = embedded
        .attractions
        .into_iter()
        .next()
        .and_then(|attraction| non_empty(attraction.name));
    let artist = headliner
        .or_else(|| non_empty(raw.name))
        .unwrap_or_default();

    let venue = embedded.venues.into_iter().next();
    let (venue_name, city, latitude, longitude) = resolve_venue(venue);

    let date = raw
        .dates
        .and_then(|dates| dates.start)
        .and_then(|start| start.local_date)
        .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DEFAULT_DATE.to_string());

    let price = match raw.price_ranges.into_iter().next() {
        Some(range) => Price {
            min: range.min,
            max: range.max,
            currency: non_empty(range.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            available: true,
        },
        None => Price::unavailable(),
    };

    Ok(ConcertRecord {
        id,
        artist,
        venue_name,
        city,
        date,
        price,
        image_url,
        latitude,
        longitude,
    })
}

/// Picks a 16:9 image wider than 400px, else the first image.
fn select_image(images: &[RawImage]) -> Option<&str> {
    let first = images.first()?;
    images
        .iter()
        .find(|image| is_preferred(image))
        .and_then(|image| image.url.as_deref())
        .filter(|url| !url.is_empty())
        .or_else(|| first.url.as_deref().filter(|url| !url.is_empty()))
}

fn is_preferred(image: &RawImage) -> bool {
    let wide = image
        .ratio
        .as_deref()
        .map(|ratio| PREFERRED_RATIOS.contains(&ratio))
        .unwrap_or(false);
    wide && image.width.map_or(false, |w| w > MIN_PREFERRED_WIDTH)
}

fn resolve_venue(venue: Option<RawVenue>) -> (String, String, Option<f64>, Option<f64>) {
    let Some(venue) = venue else {
        return (DEFAULT_VENUE_NAME.to_string(), DEFAULT_CITY.to_string(), None, None);
    };
    let name = non_empty(venue.name).unwrap_or_else(|| DEFAULT_VENUE_NAME.to_string());
    let city = venue
        .city
        .and_then(|city| non_empty(city.name))
        .unwrap_or_else(|| DEFAULT_CITY.to_string());
    let (latitude, longitude) = match venue.location {
        Some(location) => (
            parse_coordinate(location.latitude.as_ref()),
            parse_coordinate(location.longitude.as_ref()),
        ),
        None => (None, None),
    };
    (name, city, latitude, longitude)
}

fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_event() -> Value {
        json!({
            "id": "G5vYZ9",
            "name": "Summer Tour 2025",
            "images": [
                { "ratio": "3_2", "width": 640, "url": "https://img/3_2.jpg" },
                { "ratio": "16_9", "width": 205, "url": "https://img/small.jpg" },
                { "ratio": "16_9", "width": 1024, "url": "https://img/wide.jpg" }
            ],
            "dates": { "start": { "localDate": "2025-11-08" } },
            "priceRanges": [{ "min": 45.5, "max": 120.0, "currency": "USD" }],
            "_embedded": {
                "venues": [{
                    "name": "Madison Square Garden",
                    "city": { "name": "New York" },
                    "location": { "latitude": "40.7505", "longitude": "-73.9934" }
                }],
                "attractions": [{ "name": "The Headliners" }]
            }
        })
    }

    #[test]
    fn normalizes_a_complete_event() {
        let record = normalize_value(full_event()).expect("normalize event");
        assert_eq!(record.id, "G5vYZ9");
        assert_eq!(record.artist, "The Headliners");
        assert_eq!(record.venue_name, "Madison Square Garden");
        assert_eq!(record.city, "New York");
        assert_eq!(record.date, "2025-11-08");
        assert_eq!(
            record.price,
            Price {
                min: Some(45.5),
                max: Some(120.0),
                currency: "USD".to_string(),
                available: true,
            }
        );
        assert_eq!(record.image_url, "https://img/wide.jpg");
        assert_eq!(record.latitude, Some(40.7505));
        assert_eq!(record.longitude, Some(-73.9934));
    }

    #[test]
    fn normalization_is_deterministic() {
        let first = normalize_value(full_event()).expect("first pass");
        let second = normalize_value(full_event()).expect("second pass");
        assert_eq!(first, second);
    }

    #[test]
    fn prefers_wide_image_over_earlier_candidates() {
        let raw = json!({
            "id": "a",
            "images": [
                { "ratio": "16_9", "width": 500, "url": "A" },
                { "ratio": "4_3", "width": 800, "url": "B" }
            ]
        });
        assert_eq!(normalize_value(raw).expect("normalize").image_url, "A");

        let reordered = json!({
            "id": "a",
            "images": [
                { "ratio": "4_3", "width": 800, "url": "B" },
                { "ratio": "16:9", "width": 500, "url": "A" }
            ]
        });
        assert_eq!(normalize_value(reordered).expect("normalize").image_url, "A");
    }

    #[test]
    fn falls_back_to_first_image() {
        let raw = json!({
            "id": "a",
            "images": [
                { "ratio": "4_3", "width": 800, "url": "B" },
                { "ratio": "16_9", "width": 400, "url": "C" }
            ]
        });
        assert_eq!(normalize_value(raw).expect("normalize").image_url, "B");
    }

    #[test]
    fn zero_images_is_a_data_defect() {
        let raw = json!({ "id": "a", "name": "No pictures", "images": [] });
        let err = normalize_value(raw).expect_err("no images");
        assert!(matches!(err, NormalizeError::NoImages { ref id } if id == "a"));
    }

    #[test]
    fn missing_id_is_a_data_defect() {
        let raw = json!({ "images": [{ "url": "A" }] });
        assert!(matches!(
            normalize_value(raw),
            Err(NormalizeError::MissingId)
        ));
    }

    #[test]
    fn missing_venue_uses_defaults_and_no_coordinates() {
        let raw = json!({ "id": "a", "name": "Solo Show", "images": [{ "url": "A" }] });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(record.venue_name, DEFAULT_VENUE_NAME);
        assert_eq!(record.city, DEFAULT_CITY);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert!(!record.has_location());
    }

    #[test]
    fn venue_fields_fall_back_independently() {
        let raw = json!({
            "id": "a",
            "images": [{ "url": "A" }],
            "_embedded": {
                "venues": [{
                    "city": { "name": "Rosario" },
                    "location": { "latitude": "not-a-number", "longitude": "-60.64" }
                }]
            }
        });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(record.venue_name, DEFAULT_VENUE_NAME);
        assert_eq!(record.city, "Rosario");
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(-60.64));
    }

    #[test]
    fn numeric_coordinates_are_accepted() {
        let raw = json!({
            "id": "a",
            "images": [{ "url": "A" }],
            "_embedded": { "venues": [{ "location": { "latitude": -34.6, "longitude": -58.38 } }] }
        });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(record.latitude, Some(-34.6));
        assert_eq!(record.longitude, Some(-58.38));
    }

    #[test]
    fn missing_price_ranges_mark_price_unavailable() {
        let raw = json!({ "id": "a", "images": [{ "url": "A" }] });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(
            record.price,
            Price {
                min: None,
                max: None,
                currency: "ARS".to_string(),
                available: false,
            }
        );
    }

    #[test]
    fn empty_price_range_is_still_available() {
        let raw = json!({ "id": "a", "images": [{ "url": "A" }], "priceRanges": [{}] });
        let record = normalize_value(raw).expect("normalize");
        assert!(record.price.available);
        assert_eq!(record.price.min, None);
        assert_eq!(record.price.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn null_price_ranges_mark_price_unavailable() {
        let raw = json!({
            "id": "a",
            "images": [{ "url": "A" }],
            "priceRanges": null,
            "_embedded": {
                "venues": [{ "location": { "latitude": "-34.6", "longitude": "-58.38" } }]
            }
        });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(record.price, Price::unavailable());
        assert!(record.has_location());
    }

    #[test]
    fn null_attractions_fall_back_to_event_name() {
        let raw = json!({
            "id": "a",
            "name": "Festival Night",
            "images": [{ "url": "A" }],
            "_embedded": { "attractions": null }
        });
        assert_eq!(normalize_value(raw).expect("normalize").artist, "Festival Night");
    }

    #[test]
    fn null_venues_use_defaults() {
        let raw = json!({
            "id": "a",
            "images": [{ "url": "A" }],
            "_embedded": { "venues": null, "attractions": [{ "name": "Headliner" }] }
        });
        let record = normalize_value(raw).expect("normalize");
        assert_eq!(record.venue_name, DEFAULT_VENUE_NAME);
        assert_eq!(record.city, DEFAULT_CITY);
        assert_eq!(record.latitude, None);
        assert_eq!(record.artist, "Headliner");
    }

    #[test]
    fn null_images_is_a_data_defect() {
        let raw = json!({ "id": "a", "images": null });
        assert!(matches!(
            normalize_value(raw),
            Err(NormalizeError::NoImages { .. })
        ));
    }

    #[test]
    fn artist_falls_back_to_event_name() {
        let raw = json!({
            "id": "a",
            "name": "Festival Night",
            "images": [{ "url": "A" }],
            "_embedded": { "attractions": [] }
        });
        assert_eq!(normalize_value(raw).expect("normalize").artist, "Festival Night");
    }

    #[test]
    fn unparsable_date_uses_sentinel() {
        let raw = json!({
            "id": "a",
            "images": [{ "url": "A" }],
            "dates": { "start": { "localDate": "TBA" } }
        });
        assert_eq!(normalize_value(raw).expect("normalize").date, DEFAULT_DATE);
    }
}
