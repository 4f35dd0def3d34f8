//! Record-to-sentence composers.
//!
//! The parcel composer writes the primary post. Reply composers are a closed
//! set named by `ComposerKind`; the runner picks one uniformly at random from
//! the enabled subset for each record.

pub mod parcel;
pub mod selector;
pub mod tract;
pub mod transit;

use std::fmt;
use std::str::FromStr;

use crate::errors::ComposeError;
use crate::models::parcel::ParcelRecord;
use crate::models::post::ComposedPost;
use crate::state::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposerKind {
    Transit,
    TractHousing,
    TractEthnicHeterogeneity,
    TractEducation,
}

impl ComposerKind {
    pub const ALL: [ComposerKind; 4] = [
        ComposerKind::Transit,
        ComposerKind::TractHousing,
        ComposerKind::TractEthnicHeterogeneity,
        ComposerKind::TractEducation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComposerKind::Transit => "transit",
            ComposerKind::TractHousing => "tract-housing",
            ComposerKind::TractEthnicHeterogeneity => "tract-ethnic-heterogeneity",
            ComposerKind::TractEducation => "tract-education",
        }
    }

    pub fn compose(self, record: &ParcelRecord, catalog: &Catalog) -> Result<ComposedPost, ComposeError> {
        match self {
            ComposerKind::Transit => transit::compose_transit(record, catalog),
            ComposerKind::TractHousing => tract::compose_housing(record, catalog),
            ComposerKind::TractEthnicHeterogeneity => {
                tract::compose_ethnic_heterogeneity(record, catalog)
            }
            ComposerKind::TractEducation => tract::compose_education(record, catalog),
        }
    }
}

impl fmt::Display for ComposerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComposerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ComposerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = ComposerKind::ALL.iter().map(|k| k.name()).collect();
                format!("Unknown composer '{wanted}' (known: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parcel::fixtures::day_street;

    #[test]
    fn test_names_round_trip() {
        for kind in ComposerKind::ALL {
            assert_eq!(kind.name().parse::<ComposerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_lists_known_ones() {
        let err = "weather".parse::<ComposerKind>().unwrap_err();
        assert!(err.contains("tract-housing"));
    }

    #[test]
    fn test_every_kind_composes_fixture_record() {
        let catalog = Catalog::fixture();
        let record = day_street();
        for kind in ComposerKind::ALL {
            let post = kind.compose(&record, &catalog).unwrap();
            assert!(post.message.ends_with('.'), "{kind} message: {}", post.message);
            assert!(!post.images.is_empty());
        }
    }
}
