use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinates, Country, Location};

/// Station identifier as it appears on the wire: numeric for upstream ids,
/// string for agency codes like "UKA00472".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocationId {
    Numeric(i64),
    Code(String),
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Numeric(id) => write!(f, "{}", id),
            LocationId::Code(code) => write!(f, "{}", code),
        }
    }
}

/// A single pollutant reading for a station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub location: String,
    pub location_id: LocationId,
    pub parameter: String,
    pub value: f64,
    pub unit: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Aggregated statistics for one pollutant at one station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementSummary {
    pub parameter: String,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub count: usize,
    pub unit: String,
    pub last_updated: DateTime<Utc>,
}

impl MeasurementSummary {
    /// Derive per-pollutant summaries from raw readings, grouped by
    /// parameter in first-seen order.
    pub fn from_measurements(measurements: &[Measurement]) -> Vec<MeasurementSummary> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&Measurement>> = HashMap::new();

        for measurement in measurements {
            let parameter = measurement.parameter.as_str();
            if !groups.contains_key(parameter) {
                order.push(parameter);
            }
            groups.entry(parameter).or_default().push(measurement);
        }

        order
            .into_iter()
            .map(|parameter| {
                let group = &groups[parameter];
                let values: Vec<f64> = group.iter().map(|m| m.value).collect();
                let sum: f64 = values.iter().sum();

                MeasurementSummary {
                    parameter: parameter.to_string(),
                    min_value: values.iter().cloned().fold(f64::INFINITY, f64::min),
                    max_value: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    avg_value: sum / values.len() as f64,
                    count: values.len(),
                    unit: group[0].unit.clone(),
                    last_updated: group.iter().map(|m| m.date).max().unwrap_or_default(),
                }
            })
            .collect()
    }
}

/// One station's record with its readings and derived summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationResponse {
    pub location: Location,
    #[serde(default)]
    pub measurements: Option<Vec<Measurement>>,
    #[serde(default)]
    pub measurements_summary: Option<Vec<MeasurementSummary>>,
}

impl LocationResponse {
    /// Summaries from the payload, or derived from the raw readings when
    /// the backend omitted them.
    pub fn summaries(&self) -> Vec<MeasurementSummary> {
        if let Some(summaries) = &self.measurements_summary {
            if !summaries.is_empty() {
                return summaries.clone();
            }
        }
        self.measurements
            .as_deref()
            .map(MeasurementSummary::from_measurements)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(parameter: &str, value: f64, hour: u32) -> Measurement {
        Measurement {
            location: "Paris Centre".to_string(),
            location_id: LocationId::Numeric(2178),
            parameter: parameter.to_string(),
            value,
            unit: "µg/m³".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap(),
            coordinates: None,
            country: None,
            city: Some("Paris".to_string()),
        }
    }

    #[test]
    fn test_summaries_group_by_parameter() {
        let measurements = vec![
            reading("pm25", 12.0, 8),
            reading("no2", 40.0, 9),
            reading("pm25", 18.0, 10),
            reading("pm25", 15.0, 9),
        ];

        let summaries = MeasurementSummary::from_measurements(&measurements);
        assert_eq!(summaries.len(), 2);

        let pm25 = &summaries[0];
        assert_eq!(pm25.parameter, "pm25");
        assert_eq!(pm25.min_value, 12.0);
        assert_eq!(pm25.max_value, 18.0);
        assert_eq!(pm25.avg_value, 15.0);
        assert_eq!(pm25.count, 3);
        assert_eq!(pm25.last_updated, Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap());

        let no2 = &summaries[1];
        assert_eq!(no2.parameter, "no2");
        assert_eq!(no2.count, 1);
    }

    #[test]
    fn test_summaries_empty_input() {
        assert!(MeasurementSummary::from_measurements(&[]).is_empty());
    }

    #[test]
    fn test_location_id_accepts_both_shapes() {
        let numeric: Measurement =
            serde_json::from_str(r#"{"location": "A", "location_id": 2178, "parameter": "pm25", "value": 1.0, "unit": "µg/m³", "date": "2024-03-10T08:00:00Z"}"#)
                .unwrap();
        assert_eq!(numeric.location_id, LocationId::Numeric(2178));

        let code: Measurement =
            serde_json::from_str(r#"{"location": "A", "location_id": "UKA00472", "parameter": "pm25", "value": 1.0, "unit": "µg/m³", "date": "2024-03-10T08:00:00Z"}"#)
                .unwrap();
        assert_eq!(code.location_id, LocationId::Code("UKA00472".to_string()));
        assert_eq!(code.location_id.to_string(), "UKA00472");
    }
}
