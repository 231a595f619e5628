use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// An air-quality monitoring station as returned by the locations endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    pub country: Country,
    pub coordinates: Coordinates,
    /// When the station last reported, per the upstream API.
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Pollutant descriptors reported by the station. Shape varies by
    /// upstream API version, so elements stay untyped.
    #[serde(default)]
    pub parameters: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub measurement_count: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Location {
    /// City or locality for display, preferring city if both exist.
    pub fn display_city(&self) -> &str {
        self.city
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.locality.as_deref().filter(|l| !l.is_empty()))
            .unwrap_or("Unknown Location")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location(city: Option<&str>, locality: Option<&str>) -> Location {
        Location {
            id: 2178,
            name: "Paris Centre".to_string(),
            city: city.map(String::from),
            locality: locality.map(String::from),
            country: Country {
                id: 1,
                code: "FR".to_string(),
                name: "France".to_string(),
            },
            coordinates: Coordinates {
                latitude: 48.85,
                longitude: 2.35,
            },
            last_updated: None,
            parameters: None,
            measurement_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_display_city_prefers_city() {
        let location = sample_location(Some("Paris"), Some("Ile-de-France"));
        assert_eq!(location.display_city(), "Paris");
    }

    #[test]
    fn test_display_city_falls_back_to_locality() {
        let location = sample_location(None, Some("Ile-de-France"));
        assert_eq!(location.display_city(), "Ile-de-France");

        let location = sample_location(Some(""), Some("Ile-de-France"));
        assert_eq!(location.display_city(), "Ile-de-France");
    }

    #[test]
    fn test_display_city_unknown() {
        let location = sample_location(None, None);
        assert_eq!(location.display_city(), "Unknown Location");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "id": 2178,
            "name": "Paris Centre",
            "country": {"id": 1, "code": "FR", "name": "France"},
            "coordinates": {"latitude": 48.85, "longitude": 2.35}
        }"#;

        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.id, 2178);
        assert_eq!(location.city, None);
        assert!(location.is_active);
        assert_eq!(location.measurement_count, 0);
    }
}
