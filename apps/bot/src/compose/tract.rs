//! Census tract composers. Each looks up the record's tract and writes one or
//! two sentences from its statistics. Percentages truncate.

use crate::errors::ComposeError;
use crate::models::census::TractRow;
use crate::models::parcel::ParcelRecord;
use crate::models::post::ComposedPost;
use crate::state::Catalog;
use crate::text::format::{group_thousands, percent_of};

fn tract_for<'a>(record: &ParcelRecord, catalog: &'a Catalog) -> Result<&'a TractRow, ComposeError> {
    let tract_id = record.tract_id.ok_or(ComposeError::MissingField("CT_ID_10"))?;
    Ok(catalog.tracts.lookup(&tract_id)?)
}

fn stat(value: Option<f64>, column: &'static str) -> Result<f64, ComposeError> {
    value.ok_or(ComposeError::MissingField(column))
}

/// Density and rent, with the rent choropleth.
pub fn compose_housing(record: &ParcelRecord, catalog: &Catalog) -> Result<ComposedPost, ComposeError> {
    let tract = tract_for(record, catalog)?;

    let density = group_thousands(stat(tract.population_density, "PopDen")? as i64);
    let density_pctile = percent_of(stat(tract.population_density_pctile, "PopDenPctile")?);
    let renters = percent_of(stat(tract.renters_share, "RentersPer")?);
    let rent = group_thousands(stat(tract.median_rent, "MedGrossRent")? as i64);
    let rent_pctile = percent_of(stat(tract.median_rent_pctile, "MedGrossRentPctile")?);

    Ok(ComposedPost {
        message: format!(
            "The density in this census tract ({}) is {density} per square mile, \
             which is less than {density_pctile}% of {}. \
             {renters}% of people rent their home, with a median rent of ${rent} \
             ({rent_pctile}% higher than the neighborhood-level median rent).",
            tract.tract_id, catalog.city
        ),
        images: vec![catalog.image_dirs.tract_rent_map(tract.tract_id)],
    })
}

/// Distance of the tract's ethnic heterogeneity percentile from the median.
pub fn compose_ethnic_heterogeneity(
    record: &ParcelRecord,
    catalog: &Catalog,
) -> Result<ComposedPost, ComposeError> {
    let tract = tract_for(record, catalog)?;
    let pctile = stat(tract.ethnic_heterogeneity_pctile, "EthHetPctile")?;

    let (more_less, ratio) = if pctile > 0.5 {
        ("more", pctile - 0.5)
    } else {
        ("less", 0.5 - pctile)
    };

    Ok(ComposedPost {
        message: format!(
            "This census tract ({}) is {}% {more_less} racially/ethnically diverse than the city average.",
            tract.tract_id,
            percent_of(ratio)
        ),
        images: vec![catalog.image_dirs.tract_eth_het_map(tract.tract_id)],
    })
}

/// Educational attainment, with the tract's age graph.
pub fn compose_education(record: &ParcelRecord, catalog: &Catalog) -> Result<ComposedPost, ComposeError> {
    let tract = tract_for(record, catalog)?;

    // already percentages in the source
    let high_school = stat(tract.high_school_or_less, "highSchoolDegreeOrless")? as i64;
    let college = stat(tract.college_or_bachelor, "completedCollegeOrBachelorDegree")? as i64;
    let graduate = stat(tract.graduate_degree, "graduateDegree")? as i64;

    Ok(ComposedPost {
        message: format!(
            "In this census tract ({}), {high_school}% of residents have a high school degree or less, \
             {college}% have completed some college or a bachelor's degree, \
             and {graduate}% have a graduate degree.",
            tract.tract_id
        ),
        images: vec![catalog.image_dirs.tract_age_graph(tract.tract_id)],
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::dataset::side_table::SideTable;
    use crate::errors::LookupError;
    use crate::models::parcel::fixtures::day_street;

    #[test]
    fn test_housing_message() {
        let catalog = Catalog::fixture();
        let post = compose_housing(&day_street(), &catalog).unwrap();
        assert_eq!(
            post.message,
            "The density in this census tract (25025081200) is 13,234 per square mile, \
             which is less than 75% of Boston. \
             50% of people rent their home, with a median rent of $1,850 \
             (25% higher than the neighborhood-level median rent)."
        );
        assert_eq!(post.images, vec![PathBuf::from("maps/rent/25025081200.png")]);
    }

    #[test]
    fn test_ethnic_heterogeneity_more() {
        let catalog = Catalog::fixture();
        let post = compose_ethnic_heterogeneity(&day_street(), &catalog).unwrap();
        assert_eq!(
            post.message,
            "This census tract (25025081200) is 25% more racially/ethnically diverse than the city average."
        );
        assert_eq!(post.images, vec![PathBuf::from("maps/eth_het/25025081200.png")]);
    }

    #[test]
    fn test_ethnic_heterogeneity_less() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.tract_id = Some(25025000100);
        let post = compose_ethnic_heterogeneity(&record, &catalog).unwrap();
        assert!(post.message.contains("is 25% less racially"));
    }

    #[test]
    fn test_ethnic_heterogeneity_at_median_reads_zero_less() {
        let mut catalog = Catalog::fixture();
        catalog.tracts = SideTable::from_rows(vec![TractRow {
            tract_id: 25025081200,
            ethnic_heterogeneity_pctile: Some(0.5),
            ..TractRow::default()
        }]);
        let post = compose_ethnic_heterogeneity(&day_street(), &catalog).unwrap();
        assert_eq!(
            post.message,
            "This census tract (25025081200) is 0% less racially/ethnically diverse than the city average."
        );
    }

    #[test]
    fn test_education_message() {
        let catalog = Catalog::fixture();
        let post = compose_education(&day_street(), &catalog).unwrap();
        assert_eq!(
            post.message,
            "In this census tract (25025081200), 20% of residents have a high school degree or less, \
             42% have completed some college or a bachelor's degree, \
             and 37% have a graduate degree."
        );
        assert_eq!(post.images, vec![PathBuf::from("maps/age/25025081200.png")]);
    }

    #[test]
    fn test_missing_statistic_is_reported() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.tract_id = Some(25025000100);
        assert!(matches!(
            compose_housing(&record, &catalog),
            Err(ComposeError::MissingField("PopDen"))
        ));
    }

    #[test]
    fn test_unknown_tract_is_fatal() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.tract_id = Some(1);
        assert!(matches!(
            compose_education(&record, &catalog),
            Err(ComposeError::Lookup(LookupError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_duplicate_tract_is_fatal() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.tract_id = Some(25025999999);
        assert!(matches!(
            compose_housing(&record, &catalog),
            Err(ComposeError::Lookup(LookupError::Ambiguous { count: 2, .. }))
        ));
    }
}
