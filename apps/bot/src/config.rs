use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::compose::ComposerKind;

/// Directories holding pregenerated maps and graphs for reply posts.
#[derive(Debug, Clone)]
pub struct ImageDirs {
    pub neighborhood_maps: PathBuf,
    pub composite: PathBuf,
    pub tract_age_graphs: PathBuf,
    pub tract_eth_het_maps: PathBuf,
    pub tract_rent_maps: PathBuf,
}

impl ImageDirs {
    /// "Jamaica Plain" → `{neighborhood_maps}/jamaica_plain.png`
    pub fn neighborhood_map(&self, neighborhood: &str) -> PathBuf {
        self.neighborhood_maps
            .join(format!("{}.png", neighborhood.to_lowercase().replace(' ', "_")))
    }

    pub fn parcel_composite(&self, land_parcel_id: i64) -> PathBuf {
        self.composite.join(format!("{land_parcel_id}.jpg"))
    }

    pub fn tract_age_graph(&self, tract_id: i64) -> PathBuf {
        self.tract_age_graphs.join(format!("{tract_id}.png"))
    }

    pub fn tract_eth_het_map(&self, tract_id: i64) -> PathBuf {
        self.tract_eth_het_maps.join(format!("{tract_id}.png"))
    }

    pub fn tract_rent_map(&self, tract_id: i64) -> PathBuf {
        self.tract_rent_maps.join(format!("{tract_id}.png"))
    }
}

/// Mastodon-compatible posting account.
#[derive(Debug, Clone)]
pub struct PostingAccount {
    pub base_url: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub token: String,
    pub channel: String,
}

/// Bot configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub parcels_csv: PathBuf,
    pub neighborhoods_csv: PathBuf,
    pub tracts_csv: PathBuf,
    pub blockgroups_csv: PathBuf,
    /// Replacement mapping document; the built-in tables are used when unset.
    pub mappings_path: Option<PathBuf>,
    /// Where the street-level image is downloaded to.
    pub images_dir: PathBuf,
    pub image_dirs: ImageDirs,
    pub status_file: PathBuf,
    pub city: String,
    pub post_interval: Duration,
    pub recovery_delay: Duration,
    pub reply_composers: Vec<ComposerKind>,
    /// Prefixed to reply posts, e.g. "@parcelbot".
    pub reply_mention: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub posting: Option<PostingAccount>,
    pub slack: Option<SlackSettings>,
    /// `DRY_RUN`, so `.env` can turn dry-run on as well as `--dry-run`.
    pub dry_run: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let path_or = |key: &str, default: &str| PathBuf::from(var(key).unwrap_or_else(|| default.to_string()));
        let secs_or = |key: &str, default: u64| -> Result<Duration> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{key} must be a whole number of seconds")),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let dry_run = match var("DRY_RUN").map(|v| v.trim().to_ascii_lowercase()) {
            None => false,
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => anyhow::bail!("DRY_RUN must be true or false, got '{v}'"),
            },
        };

        let reply_composers = var("REPLY_COMPOSERS")
            .unwrap_or_else(|| ComposerKind::TractHousing.name().to_string())
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse::<ComposerKind>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()
            .context("REPLY_COMPOSERS is invalid")?;

        let posting = match (var("MASTODON_BASE_URL"), var("MASTODON_ACCESS_TOKEN")) {
            (Some(base_url), Some(access_token)) => Some(PostingAccount {
                base_url: base_url.trim_end_matches('/').to_string(),
                access_token,
            }),
            (None, None) => None,
            _ => anyhow::bail!("MASTODON_BASE_URL and MASTODON_ACCESS_TOKEN must be set together"),
        };

        let slack = match (var("SLACK_TOKEN"), var("SLACK_CHANNEL")) {
            (Some(token), Some(channel)) => Some(SlackSettings { token, channel }),
            (None, None) => None,
            _ => anyhow::bail!("SLACK_TOKEN and SLACK_CHANNEL must be set together"),
        };

        Ok(Config {
            parcels_csv: path_or("PARCELS_CSV", "./parcels.csv"),
            neighborhoods_csv: path_or("NEIGHBORHOODS_CSV", "./neighborhoods.csv"),
            tracts_csv: path_or("TRACTS_CSV", "./tracts.csv"),
            blockgroups_csv: path_or("BLOCKGROUPS_CSV", "./blockgroups.csv"),
            mappings_path: var("MAPPINGS_PATH").map(PathBuf::from),
            images_dir: path_or("IMAGES_DIR", "."),
            image_dirs: ImageDirs {
                neighborhood_maps: path_or("NEIGHBORHOOD_MAPS_DIR", "./neighborhood_maps"),
                composite: path_or("COMPOSITE_DIR", "./composite"),
                tract_age_graphs: path_or("TRACT_AGE_GRAPHS_DIR", "./tract_age_graphs"),
                tract_eth_het_maps: path_or("TRACT_ETH_HET_MAPS_DIR", "./tract_eth_het_maps"),
                tract_rent_maps: path_or("TRACT_RENT_MAPS_DIR", "./tract_rent_maps"),
            },
            status_file: path_or("STATUS_FILE", "last_idx.txt"),
            city: var("CITY").unwrap_or_else(|| "Boston".to_string()),
            post_interval: secs_or("POST_INTERVAL_SECS", 60 * 60)?,
            recovery_delay: secs_or("RECOVERY_DELAY_SECS", 60)?,
            reply_composers,
            reply_mention: var("REPLY_MENTION"),
            google_maps_api_key: var("GOOGLE_MAPS_API_KEY"),
            posting,
            slack,
            dry_run,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Fixed path the street-level image is written to before upload.
    pub fn street_image_path(&self) -> PathBuf {
        self.images_dir.join(STREET_IMAGE_FILE)
    }

    pub fn require_posting(&self) -> Result<&PostingAccount> {
        self.posting.as_ref().context(
            "MASTODON_BASE_URL and MASTODON_ACCESS_TOKEN are required unless --dry-run is set",
        )
    }

    pub fn mappings_path(&self) -> Option<&Path> {
        self.mappings_path.as_deref()
    }
}

pub const STREET_IMAGE_FILE: &str = "gsv_0.jpg";
