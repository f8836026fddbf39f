//! # Location Intent Detection
//!
//! Classifies messages as navigation questions and pulls coordinate pairs
//! out of answer text. Keyword configuration comes from the caller (the
//! index owns loading and caching); nothing here hard-codes a keyword
//! list, because an empty configuration is a legitimate deployment state.

use crate::types::GeoPoint;
use crate::ResolveError;
use regex::Regex;
use tracing::warn;

/// Serviceable bounding box. Coordinates outside it are treated as noise,
/// not as answers.
pub const LAT_BOUNDS: (f64, f64) = (5.0, 21.0);
pub const LNG_BOUNDS: (f64, f64) = (97.0, 106.0);

/// Classifies messages and extracts embedded coordinates.
#[derive(Clone, Debug)]
pub struct LocationDetector {
    coord: Regex,
    coord_shape: Regex,
    map_url: Regex,
}

impl LocationDetector {
    pub fn new() -> Result<Self, ResolveError> {
        Ok(Self {
            coord: Regex::new(r"(-?\d{1,3}\.\d{4,})\s*,\s*(-?\d{1,3}\.\d{4,})")?,
            coord_shape: Regex::new(r"\d{1,3}\.\d{4,},\s*\d{1,3}\.\d{4,}")?,
            map_url: Regex::new(r"(?i)maps\.app\.goo\.gl|maps\.google|google\.com/maps|goo\.gl/maps")?,
        })
    }

    /// Whether the message is asking where something is.
    ///
    /// A non-empty keyword set is matched word-boundary-anchored and
    /// case-insensitively. With no configured keywords the check falls back
    /// to an embedded coordinate pair or a known map-service link.
    pub fn is_location_query(&self, message: &str, keywords: &[String]) -> bool {
        if message.trim().is_empty() {
            return false;
        }

        let keywords: Vec<&String> = keywords.iter().filter(|k| !k.trim().is_empty()).collect();
        if !keywords.is_empty() {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k.trim()))
                .collect::<Vec<_>>()
                .join("|");
            return match Regex::new(&format!(r"(?i)\b(?:{alternation})\b")) {
                Ok(re) => re.is_match(message),
                Err(error) => {
                    warn!(%error, "location keyword pattern failed to compile");
                    false
                }
            };
        }

        self.coord_shape.is_match(message) || self.map_url.is_match(message)
    }

    /// Extracts the first coordinate pair with at least four fractional
    /// digits that lies inside the serviceable bounding box.
    pub fn extract_coords(&self, text: &str) -> Option<GeoPoint> {
        for caps in self.coord.captures_iter(text) {
            let (Ok(lat), Ok(lng)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
                continue;
            };
            if (LAT_BOUNDS.0..=LAT_BOUNDS.1).contains(&lat)
                && (LNG_BOUNDS.0..=LNG_BOUNDS.1).contains(&lng)
            {
                return Some(GeoPoint { lat, lng });
            }
        }
        None
    }

    /// Whether the text already carries a coordinate-shaped substring.
    /// Used to avoid appending a second coordinate line to an answer.
    pub fn has_coordinate_shape(&self, text: &str) -> bool {
        self.coord_shape.is_match(text)
    }

    /// Whether the text links to a known map service.
    pub fn has_map_link(&self, text: &str) -> bool {
        self.map_url.is_match(text)
    }
}
