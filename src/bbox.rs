use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rectangular geographic filter in degrees, serialized as
/// `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, ExtractError> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    fn validate(&self) -> Result<(), ExtractError> {
        let values = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ExtractError::InvalidBoundingBox(format!(
                "non-finite bound in {}",
                self
            )));
        }
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return Err(ExtractError::InvalidBoundingBox(format!(
                "minimum exceeds maximum in {}",
                self
            )));
        }
        if self.min_lon < -180.0 || self.max_lon > 180.0 || self.min_lat < -90.0 || self.max_lat > 90.0 {
            return Err(ExtractError::InvalidBoundingBox(format!(
                "{} lies outside [-180, 180] x [-90, 90]",
                self
            )));
        }
        Ok(())
    }

    /// Inclusive on every edge.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = ExtractError;

    fn try_from(value: [f64; 4]) -> Result<Self, Self::Error> {
        let [min_lon, min_lat, max_lon, max_lat] = value;
        Self::new(min_lon, min_lat, max_lon, max_lat)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

impl FromStr for BoundingBox {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExtractError::InvalidBoundingBox(format!("{s}: {e}")))?;

        let values: [f64; 4] = values.try_into().map_err(|_| {
            ExtractError::InvalidBoundingBox(format!("{s}: expected four comma-separated numbers"))
        })?;
        Self::try_from(values)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::new(-85.0, 35.0, -75.0, 42.0).unwrap();
        assert!(bbox.contains(-85.0, 35.0));
        assert!(bbox.contains(-75.0, 42.0));
        assert!(bbox.contains(-80.0, 38.5));
        assert!(!bbox.contains(-85.0001, 38.0));
        assert!(!bbox.contains(-80.0, 42.0001));
    }

    #[test]
    fn test_parse_from_str() {
        let bbox: BoundingBox = "-82.644739, 37.201483,-77.719519,40.638801".parse().unwrap();
        assert_eq!(bbox.min_lon, -82.644739);
        assert_eq!(bbox.max_lat, 40.638801);
    }

    #[test]
    fn test_rejects_inverted_and_malformed() {
        assert!("-75,35,-85,42".parse::<BoundingBox>().is_err());
        assert!("-85,35,-75".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!(BoundingBox::new(-190.0, 0.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_serde_as_array() {
        let bbox = BoundingBox::new(-125.0, 47.0, -123.0, 49.0).unwrap();
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[-125.0,47.0,-123.0,49.0]");
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
        assert!(serde_json::from_str::<BoundingBox>("[1.0,1.0,0.0,0.0]").is_err());
    }
}
