//! Primary post: one sentence about the parcel, one about its assessed value,
//! one about its permit history.

use crate::errors::ComposeError;
use crate::models::parcel::ParcelRecord;
use crate::state::Catalog;
use crate::text::format::{
    article_for, capitalize, capitalize_each_word, contains_digit, group_thousands,
};
use crate::text::mapping::MappingTables;
use crate::text::section::resolve_location;

/// Earliest year covered by the permit export.
pub const PERMIT_CUTOFF_YEAR: i32 = 2006;

const MISSING_NUMBER_PLACEHOLDER: &str = "This parcel on";

#[derive(Debug, Clone, PartialEq)]
pub struct ParcelPost {
    pub message: String,
    /// "72 Day St."
    pub address: String,
    /// What to ask the street-level imagery service for, if anything.
    pub image_location: Option<String>,
}

/// "72 Day St.", "This parcel on Waymount St.", "5 Harbor Ave."
pub fn address_clause(record: &ParcelRecord, tables: &MappingTables) -> String {
    let number = match &record.street_number {
        Some(n) => n.to_string(),
        None => MISSING_NUMBER_PLACEHOLDER.to_string(),
    };

    let suffix = match record.street_suffix.as_deref() {
        Some(raw) => match tables.street_suffix.get(raw) {
            Some(mapped) => Some(mapped.to_string()),
            None => Some(format!("{}.", capitalize(raw))),
        },
        None => None,
    };

    let mut parts = vec![number, capitalize_each_word(&record.street_name)];
    parts.extend(suffix);
    parts.join(" ")
}

/// Land use wins when it is mapped; otherwise the (defaulting) building style.
pub fn building_style_clause<'a>(
    record: &ParcelRecord,
    tables: &'a MappingTables,
) -> Result<&'a str, ComposeError> {
    if let Some(phrase) = record
        .land_use
        .as_deref()
        .and_then(|lu| tables.land_use.get(lu))
    {
        return Ok(phrase);
    }
    tables
        .building_style
        .lookup(record.building_style.as_deref().unwrap_or_default())
}

pub fn year_built_clause(record: &ParcelRecord) -> String {
    match record.year_built {
        Some(year) => format!(" built in {year}"),
        None => String::new(),
    }
}

pub fn value_clause(record: &ParcelRecord, city: &str) -> String {
    format!(
        "The current value in the {city} tax assessment database is ${}.",
        group_thousands(record.assessed_value)
    )
}

/// Permit types are a closed vocabulary; an unknown type is an error.
pub fn permit_clause(record: &ParcelRecord, tables: &MappingTables) -> Result<String, ComposeError> {
    let Some(year) = record.permit_year else {
        return Ok(format!(
            "No building permits were issued for this address since {PERMIT_CUTOFF_YEAR}."
        ));
    };
    let permit_type = record
        .permit_type
        .as_deref()
        .ok_or(ComposeError::MissingField("permittypedescr"))?;
    let phrase = tables.permit_type.lookup(permit_type)?;
    Ok(format!(
        "{} {phrase} was last issued in {year}.",
        capitalize(article_for(phrase)?)
    ))
}

/// Street View query: the address plus neighbourhood when the number has
/// digits in it, else the coordinates. The neighbourhood keeps repeated
/// street names apart.
fn image_location(record: &ParcelRecord, address: &str, city: &str) -> Option<String> {
    match (&record.street_number, record.y, record.x) {
        (Some(number), _, _) if contains_digit(number) => {
            Some(format!("{address}, {}, {city}", record.neighborhood))
        }
        (_, Some(lat), Some(lon)) => Some(format!("{lat},{lon}")),
        _ => None,
    }
}

pub fn compose_parcel(record: &ParcelRecord, catalog: &Catalog) -> Result<ParcelPost, ComposeError> {
    let tables = &catalog.mappings;
    let address = address_clause(record, tables);
    let style = building_style_clause(record, tables)?;
    let location = resolve_location(&record.neighborhood, record.section.as_deref(), tables);

    let message = format!(
        "{address} is {} {style}{} {location}. {} {}",
        article_for(style)?,
        year_built_clause(record),
        value_clause(record, &catalog.city),
        permit_clause(record, tables)?,
    );

    Ok(ParcelPost {
        image_location: image_location(record, &address, &catalog.city),
        address,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parcel::{fixtures::day_street, CellValue};

    #[test]
    fn test_full_record_message() {
        let catalog = Catalog::fixture();
        let post = compose_parcel(&day_street(), &catalog).unwrap();
        assert_eq!(
            post.message,
            "72 Day St. is a Triple Decker built in 1905 in the Hyde Square section of #jamaicaplain. \
             The current value in the Boston tax assessment database is $1,234,500. \
             A permit for electrical work was last issued in 2017."
        );
        assert_eq!(post.address, "72 Day St.");
    }

    #[test]
    fn test_message_has_no_double_punctuation_or_spaces() {
        let catalog = Catalog::fixture();
        let post = compose_parcel(&day_street(), &catalog).unwrap();
        assert!(!post.message.contains(".."));
        assert!(!post.message.contains("  "));
        assert!(post.message.ends_with('.'));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let catalog = Catalog::fixture();
        let record = day_street();
        let first = compose_parcel(&record, &catalog).unwrap();
        let second = compose_parcel(&record, &catalog).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_street_number_uses_placeholder() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_number = None;
        record.street_name = "WAYMOUNT".to_string();
        assert_eq!(
            address_clause(&record, &catalog.mappings),
            "This parcel on Waymount St."
        );
    }

    #[test]
    fn test_mapped_suffix() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_suffix = Some("AV".to_string());
        assert_eq!(address_clause(&record, &catalog.mappings), "72 Day Ave.");
    }

    #[test]
    fn test_unmapped_suffix_is_capitalized_with_period() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_suffix = Some("ZZ".to_string());
        assert_eq!(address_clause(&record, &catalog.mappings), "72 Day Zz.");
    }

    #[test]
    fn test_absent_suffix_is_omitted() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_suffix = None;
        record.street_name = "MOUNT VERNON".to_string();
        assert_eq!(address_clause(&record, &catalog.mappings), "72 Mount Vernon");
    }

    #[test]
    fn test_textual_street_number_is_verbatim() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_number = Some(CellValue::Text("12-14".to_string()));
        assert_eq!(address_clause(&record, &catalog.mappings), "12-14 Day St.");
    }

    #[test]
    fn test_land_use_takes_priority() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.land_use = Some("I".to_string());
        let post = compose_parcel(&record, &catalog).unwrap();
        assert!(post.message.starts_with("72 Day St. is an industrial parcel built in 1905"));
    }

    #[test]
    fn test_unknown_style_defaults_to_residential() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.building_style = Some("OT".to_string());
        assert_eq!(
            building_style_clause(&record, &catalog.mappings).unwrap(),
            "residential parcel"
        );
        record.building_style = None;
        assert_eq!(
            building_style_clause(&record, &catalog.mappings).unwrap(),
            "residential parcel"
        );
    }

    #[test]
    fn test_missing_year_built_omitted() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.year_built = None;
        let post = compose_parcel(&record, &catalog).unwrap();
        assert!(post.message.starts_with("72 Day St. is a Triple Decker in the Hyde Square"));
    }

    #[test]
    fn test_no_permit_sentence() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.permit_year = None;
        record.permit_type = None;
        let post = compose_parcel(&record, &catalog).unwrap();
        assert!(post
            .message
            .ends_with("No building permits were issued for this address since 2006."));
    }

    #[test]
    fn test_unmapped_permit_type_is_fatal() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.permit_type = Some("Sign Permit".to_string());
        assert!(matches!(
            compose_parcel(&record, &catalog),
            Err(ComposeError::UnmappedCode { .. })
        ));
    }

    #[test]
    fn test_permit_year_without_type_is_fatal() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.permit_type = None;
        assert!(matches!(
            compose_parcel(&record, &catalog),
            Err(ComposeError::MissingField("permittypedescr"))
        ));
    }

    #[test]
    fn test_image_location_prefers_address() {
        let catalog = Catalog::fixture();
        let post = compose_parcel(&day_street(), &catalog).unwrap();
        assert_eq!(post.image_location.as_deref(), Some("72 Day St., Jamaica Plain, Boston"));
    }

    #[test]
    fn test_image_location_uses_plain_neighbourhood_name() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.neighborhood = "South Boston".to_string();
        record.section = None;
        let post = compose_parcel(&record, &catalog).unwrap();
        assert_eq!(
            post.image_location.as_deref(),
            Some("72 Day St., South Boston, Boston")
        );
        assert!(post.message.contains("in #southie."));
    }

    #[test]
    fn test_image_location_falls_back_to_coordinates() {
        let catalog = Catalog::fixture();
        let mut record = day_street();
        record.street_number = Some(CellValue::Text("REAR".to_string()));
        let post = compose_parcel(&record, &catalog).unwrap();
        assert_eq!(post.image_location.as_deref(), Some("42.3221,-71.1044"));

        record.x = None;
        let post = compose_parcel(&record, &catalog).unwrap();
        assert_eq!(post.image_location, None);
    }
}
