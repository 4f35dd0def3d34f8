use serde::Deserialize;

use crate::dataset::side_table::Keyed;

/// Per-neighbourhood transit summary, keyed by neighbourhood name.
#[derive(Debug, Clone, Deserialize)]
pub struct NeighborhoodRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(deserialize_with = "crate::models::parcel::de::whole")]
    pub n_bus_lines: i64,
    #[serde(deserialize_with = "crate::models::parcel::de::whole")]
    pub n_subway_lines: i64,
}

impl Keyed for NeighborhoodRow {
    type Key = String;
    const TABLE: &'static str = "neighborhoods";

    fn key(&self) -> &String {
        &self.name
    }
}

/// Census block group statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockGroupRow {
    #[serde(rename = "BG_ID_10", deserialize_with = "crate::models::parcel::de::whole")]
    pub block_group_id: i64,
    #[serde(rename = "MEDIAN_TRANSIT_METERS", default)]
    pub median_transit_meters: Option<f64>,
}

impl Keyed for BlockGroupRow {
    type Key = i64;
    const TABLE: &'static str = "blockgroups";

    fn key(&self) -> &i64 {
        &self.block_group_id
    }
}

/// Census tract statistics. Percentiles are fractions in 0..=1; education
/// columns are already percentages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TractRow {
    #[serde(rename = "CT_ID_10", deserialize_with = "crate::models::parcel::de::whole")]
    pub tract_id: i64,
    #[serde(rename = "PopDen", default)]
    pub population_density: Option<f64>,
    #[serde(rename = "PopDenPctile", default)]
    pub population_density_pctile: Option<f64>,
    #[serde(rename = "RentersPer", default)]
    pub renters_share: Option<f64>,
    #[serde(rename = "MedGrossRent", default)]
    pub median_rent: Option<f64>,
    #[serde(rename = "MedGrossRentPctile", default)]
    pub median_rent_pctile: Option<f64>,
    #[serde(rename = "EthHetPctile", default)]
    pub ethnic_heterogeneity_pctile: Option<f64>,
    #[serde(rename = "highSchoolDegreeOrless", default)]
    pub high_school_or_less: Option<f64>,
    #[serde(rename = "completedCollegeOrBachelorDegree", default)]
    pub college_or_bachelor: Option<f64>,
    #[serde(rename = "graduateDegree", default)]
    pub graduate_degree: Option<f64>,
}

impl Keyed for TractRow {
    type Key = i64;
    const TABLE: &'static str = "tracts";

    fn key(&self) -> &i64 {
        &self.tract_id
    }
}
