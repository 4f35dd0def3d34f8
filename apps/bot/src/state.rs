use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::clients::alerts::Alerter;
use crate::clients::checkpoint::CheckpointStore;
use crate::clients::poster::Poster;
use crate::clients::streetview::ImageFetcher;
use crate::compose::selector::ReplySelector;
use crate::config::{Config, ImageDirs};
use crate::dataset::side_table::SideTable;
use crate::models::census::{BlockGroupRow, NeighborhoodRow, TractRow};
use crate::text::mapping::MappingTables;

/// Read-only reference data every composer draws on. Built once at startup
/// and passed by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub mappings: MappingTables,
    pub neighborhoods: SideTable<NeighborhoodRow>,
    pub tracts: SideTable<TractRow>,
    pub block_groups: SideTable<BlockGroupRow>,
    pub image_dirs: ImageDirs,
    pub city: String,
}

impl Catalog {
    pub fn load(config: &Config) -> Result<Self> {
        let mappings = MappingTables::load(config.mappings_path())
            .context("Failed to load mapping tables")?;
        info!(
            "Mapping tables loaded from {}",
            config
                .mappings_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in document".to_string())
        );

        Ok(Catalog {
            mappings,
            neighborhoods: SideTable::from_path(&config.neighborhoods_csv)?,
            tracts: SideTable::from_path(&config.tracts_csv)?,
            block_groups: SideTable::from_path(&config.blockgroups_csv)?,
            image_dirs: config.image_dirs.clone(),
            city: config.city.clone(),
        })
    }
}

/// Everything the runner needs: reference data plus the external
/// collaborators, each behind a trait so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub poster: Arc<dyn Poster>,
    pub images: Arc<dyn ImageFetcher>,
    pub alerter: Arc<dyn Alerter>,
    pub checkpoint: CheckpointStore,
    pub selector: ReplySelector,
    pub config: Config,
}

#[cfg(test)]
impl Catalog {
    /// Small in-memory catalog matching `models::parcel::fixtures::day_street`.
    pub fn fixture() -> Self {
        use std::path::PathBuf;

        let neighborhoods = SideTable::from_reader(
            "Name,n_bus_lines,n_subway_lines\n\
             Jamaica Plain,12,2\n\
             Fenway,9,3\n"
                .as_bytes(),
        )
        .unwrap();
        let tracts = SideTable::from_reader(
            "CT_ID_10,PopDen,PopDenPctile,RentersPer,MedGrossRent,MedGrossRentPctile,EthHetPctile,highSchoolDegreeOrless,completedCollegeOrBachelorDegree,graduateDegree\n\
             25025081200,13234.9,0.75,0.5,1850.0,0.25,0.75,20.0,42.0,37.9\n\
             25025000100,,,,,,0.25,,,\n\
             25025999999,1,0.1,0.1,1,0.1,0.1,1,1,1\n\
             25025999999,2,0.2,0.2,2,0.2,0.2,2,2,2\n"
                .as_bytes(),
        )
        .unwrap();
        let block_groups = SideTable::from_reader(
            "BG_ID_10,MEDIAN_TRANSIT_METERS\n\
             250250812001,402.336\n\
             250250812002,16.09344\n"
                .as_bytes(),
        )
        .unwrap();

        Catalog {
            mappings: MappingTables::builtin().unwrap(),
            neighborhoods,
            tracts,
            block_groups,
            image_dirs: ImageDirs {
                neighborhood_maps: PathBuf::from("maps/neighborhoods"),
                composite: PathBuf::from("maps/composite"),
                tract_age_graphs: PathBuf::from("maps/age"),
                tract_eth_het_maps: PathBuf::from("maps/eth_het"),
                tract_rent_maps: PathBuf::from("maps/rent"),
            },
            city: "Boston".to_string(),
        }
    }
}
