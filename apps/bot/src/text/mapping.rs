//! Code-to-phrase mapping tables.
//!
//! The tables are data: the built-in set is `data/mappings.json`, compiled into
//! the binary, and an operator can swap in a replacement document with the
//! same shape. Each table declares what happens on a miss:
//!
//! - `default`: return the table's `default_value`
//! - `fail`: `lookup` returns `ComposeError::UnmappedCode`
//!
//! Composers that treat presence as a signal (land use, street suffix) use
//! `get` and decide the fallback themselves.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::errors::ComposeError;

pub const BUILTIN_MAPPINGS: &str = include_str!("../../data/mappings.json");

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Failed to read mapping document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid mapping document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Mapping table '{0}' has policy 'default' but no default_value")]
    MissingDefault(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    Default,
    Fail,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    policy: MissPolicy,
    #[serde(default)]
    default_value: Option<String>,
    entries: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    building_style: RawTable,
    land_use: RawTable,
    permit_type: RawTable,
    street_suffix: RawTable,
    neighbourhood_hashtag: RawTable,
    #[serde(default)]
    prepend_the: HashSet<String>,
    #[serde(default)]
    section_exceptions: HashMap<String, Vec<String>>,
}

/// A single code → phrase table with its miss policy.
#[derive(Debug, Clone)]
pub struct MappingTable {
    name: String,
    policy: MissPolicy,
    default_value: Option<String>,
    entries: HashMap<String, String>,
}

impl MappingTable {
    fn from_raw(name: &str, raw: RawTable) -> Result<Self, MappingError> {
        if raw.policy == MissPolicy::Default && raw.default_value.is_none() {
            return Err(MappingError::MissingDefault(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            policy: raw.policy,
            default_value: raw.default_value,
            entries: raw.entries,
        })
    }

    /// Presence test. Ignores the policy.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Looks up a code, applying the table's miss policy.
    pub fn lookup(&self, code: &str) -> Result<&str, ComposeError> {
        if let Some(phrase) = self.get(code) {
            return Ok(phrase);
        }
        match (self.policy, self.default_value.as_deref()) {
            (MissPolicy::Default, Some(default)) => Ok(default),
            _ => Err(ComposeError::UnmappedCode {
                table: self.name.clone(),
                code: code.to_string(),
            }),
        }
    }
}

/// Every table the composers consult. Read-only after load.
#[derive(Debug, Clone)]
pub struct MappingTables {
    pub building_style: MappingTable,
    pub land_use: MappingTable,
    pub permit_type: MappingTable,
    pub street_suffix: MappingTable,
    pub neighbourhood_hashtag: MappingTable,
    /// Neighbourhoods written with a definite article ("the South End").
    pub prepend_the: HashSet<String>,
    /// Raw section values that cannot be split on "/" as-is.
    pub section_exceptions: HashMap<String, Vec<String>>,
}

impl MappingTables {
    pub fn builtin() -> Result<Self, MappingError> {
        Self::from_json(BUILTIN_MAPPINGS)
    }

    /// Loads the document at `path`, or the built-in set when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, MappingError> {
        match path {
            Some(path) => Self::from_json(&std::fs::read_to_string(path)?),
            None => Self::builtin(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let raw: RawDocument = serde_json::from_str(json)?;
        Ok(Self {
            building_style: MappingTable::from_raw("building_style", raw.building_style)?,
            land_use: MappingTable::from_raw("land_use", raw.land_use)?,
            permit_type: MappingTable::from_raw("permit_type", raw.permit_type)?,
            street_suffix: MappingTable::from_raw("street_suffix", raw.street_suffix)?,
            neighbourhood_hashtag: MappingTable::from_raw(
                "neighbourhood_hashtag",
                raw.neighbourhood_hashtag,
            )?,
            prepend_the: raw.prepend_the,
            section_exceptions: raw.section_exceptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> MappingTables {
        MappingTables::builtin().expect("built-in mappings must parse")
    }

    #[test]
    fn test_builtin_document_parses() {
        let t = tables();
        assert_eq!(t.building_style.policy, MissPolicy::Default);
        assert_eq!(t.permit_type.policy, MissPolicy::Fail);
        assert!(t.prepend_the.contains("South End"));
    }

    #[test]
    fn test_present_codes_return_configured_phrase() {
        let t = tables();
        assert_eq!(t.building_style.lookup("CL").unwrap(), "Colonial");
        assert_eq!(t.building_style.lookup("DK").unwrap(), "Triple Decker");
        assert_eq!(t.street_suffix.get("AV"), Some("Ave."));
        assert_eq!(t.land_use.get("CP"), Some("parking lot"));
        assert_eq!(
            t.permit_type.lookup("Gas Permit").unwrap(),
            "gas permit"
        );
    }

    #[test]
    fn test_default_policy_returns_default_for_unknown_codes() {
        let t = tables();
        for code in ["CN", "OT", "CV", "", "zz"] {
            assert_eq!(
                t.building_style.lookup(code).unwrap(),
                "residential parcel",
                "code {code:?} should fall back"
            );
        }
    }

    #[test]
    fn test_fail_policy_reports_table_and_code() {
        let t = tables();
        match t.permit_type.lookup("Sign Permit") {
            Err(ComposeError::UnmappedCode { table, code }) => {
                assert_eq!(table, "permit_type");
                assert_eq!(code, "Sign Permit");
            }
            other => panic!("expected UnmappedCode, got {other:?}"),
        }
    }

    #[test]
    fn test_get_ignores_policy() {
        let t = tables();
        assert_eq!(t.building_style.get("CN"), None);
        assert_eq!(t.street_suffix.get("ST"), None);
    }

    #[test]
    fn test_default_policy_without_default_value_is_rejected() {
        let doc = r#"{
            "building_style": {"policy": "default", "entries": {}},
            "land_use": {"policy": "fail", "entries": {}},
            "permit_type": {"policy": "fail", "entries": {}},
            "street_suffix": {"policy": "fail", "entries": {}},
            "neighbourhood_hashtag": {"policy": "fail", "entries": {}}
        }"#;
        match MappingTables::from_json(doc) {
            Err(MappingError::MissingDefault(name)) => assert_eq!(name, "building_style"),
            other => panic!("expected MissingDefault, got {other:?}"),
        }
    }

    #[test]
    fn test_replacement_document_extends_tables() {
        let doc = r#"{
            "building_style": {"policy": "default", "default_value": "home", "entries": {"MH": "Mansion"}},
            "land_use": {"policy": "fail", "entries": {}},
            "permit_type": {"policy": "fail", "entries": {}},
            "street_suffix": {"policy": "fail", "entries": {"ST": "St."}},
            "neighbourhood_hashtag": {"policy": "fail", "entries": {}}
        }"#;
        let t = MappingTables::from_json(doc).unwrap();
        assert_eq!(t.building_style.lookup("MH").unwrap(), "Mansion");
        assert_eq!(t.building_style.lookup("CL").unwrap(), "home");
        assert_eq!(t.street_suffix.get("ST"), Some("St."));
        assert!(t.prepend_the.is_empty());
        assert!(t.section_exceptions.is_empty());
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.json");
        std::fs::write(&path, BUILTIN_MAPPINGS).unwrap();
        let t = MappingTables::load(Some(&path)).unwrap();
        assert_eq!(t.street_suffix.get("WH"), Some("Wharf"));
    }
}
