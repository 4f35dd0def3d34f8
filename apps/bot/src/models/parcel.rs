use std::fmt;

use serde::{Deserialize, Deserializer};

/// A CSV cell that may hold a number or free text.
///
/// Street numbers arrive as `72`, `72.0`, `12-14` or `1R` depending on how the
/// export was produced. Whole floats collapse to integers so `72.0` renders as
/// `72`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return CellValue::Integer(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                CellValue::Integer(f as i64)
            }
            Ok(f) if f.is_finite() => CellValue::Float(f),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, CellValue::Text(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{n}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CellValue::parse(&raw))
    }
}

/// One row of the parcels file. Column names follow the assessor export.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelRecord {
    #[serde(rename = "ST_NUM", default)]
    pub street_number: Option<CellValue>,
    #[serde(rename = "ST_NAME")]
    pub street_name: String,
    #[serde(rename = "ST_NAME_SUF", default)]
    pub street_suffix: Option<String>,
    #[serde(rename = "LU", default)]
    pub land_use: Option<String>,
    #[serde(rename = "R_BLDG_STYL", default)]
    pub building_style: Option<String>,
    #[serde(rename = "YR_BUILT", default, deserialize_with = "de::opt_whole")]
    pub year_built: Option<i64>,
    #[serde(rename = "AV_TOTAL", deserialize_with = "de::whole")]
    pub assessed_value: i64,
    #[serde(rename = "permittypedescr", default)]
    pub permit_type: Option<String>,
    #[serde(rename = "ISSUED_DATE", default, deserialize_with = "de::opt_whole")]
    pub permit_year: Option<i64>,
    pub neighborhood: String,
    #[serde(default)]
    pub section: Option<String>,
    /// Longitude.
    #[serde(default)]
    pub x: Option<f64>,
    /// Latitude.
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(rename = "CT_ID_10", default, deserialize_with = "de::opt_whole")]
    pub tract_id: Option<i64>,
    #[serde(rename = "BG_ID_10", default, deserialize_with = "de::opt_whole")]
    pub block_group_id: Option<i64>,
    #[serde(rename = "Land_Parcel_ID", default, deserialize_with = "de::opt_whole")]
    pub land_parcel_id: Option<i64>,
    #[serde(rename = "STOP_TYPE", default)]
    pub stop_type: Option<String>,
    #[serde(rename = "STOP_NAME", default)]
    pub stop_name: Option<String>,
    #[serde(rename = "NEAREST_TRANSIT_SECONDS", default)]
    pub nearest_transit_seconds: Option<f64>,
}

impl ParcelRecord {
    /// Why this row cannot be composed at all, if anything.
    pub fn skip_reason(&self) -> Option<&'static str> {
        if self.street_number.is_none() {
            return Some("no ST_NUM");
        }
        None
    }
}

/// Serde helpers for numeric columns that pandas-style exports write either
/// as `1900` or `1900.0`.
pub(crate) mod de {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    fn parse_whole<E: Error>(raw: &str) -> Result<i64, E> {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(n);
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .ok_or_else(|| E::custom(format!("expected a whole number, got '{raw}'")))
    }

    pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_whole(&raw)
    }

    pub fn opt_whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_whole(&raw).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A fully-populated record on Day St. in Jamaica Plain.
    pub fn day_street() -> ParcelRecord {
        ParcelRecord {
            street_number: Some(CellValue::Integer(72)),
            street_name: "DAY".to_string(),
            street_suffix: Some("ST".to_string()),
            land_use: Some("R3".to_string()),
            building_style: Some("DK".to_string()),
            year_built: Some(1905),
            assessed_value: 1_234_500,
            permit_type: Some("Electrical Permit".to_string()),
            permit_year: Some(2017),
            neighborhood: "Jamaica Plain".to_string(),
            section: Some("Jamaica Plain/Hyde Square".to_string()),
            x: Some(-71.1044),
            y: Some(42.3221),
            tract_id: Some(25025081200),
            block_group_id: Some(250250812001),
            land_parcel_id: Some(1_100_234_000),
            stop_type: Some("Subway".to_string()),
            stop_name: Some("Jackson Square".to_string()),
            nearest_transit_seconds: Some(330.0),
        }
    }
}
