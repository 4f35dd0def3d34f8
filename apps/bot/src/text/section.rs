//! Neighbourhood/section resolution.
//!
//! The `section` column holds slash-separated synonyms for where a parcel sits
//! ("Fenway/West Fens"). The resolver drops the neighbourhood's own name,
//! collapses unnamed sections, and renders the neighbourhood as a hashtag.

use crate::text::mapping::MappingTables;

/// Marker the source data uses for parcels outside any named section.
const UNNAMED_SECTION: &str = "Unnamed";

/// "#jamaicaplain", or the override from the hashtag table ("#southie").
pub fn neighbourhood_hashtag(neighbourhood: &str, tables: &MappingTables) -> String {
    match tables.neighbourhood_hashtag.get(neighbourhood) {
        Some(tag) => tag.to_string(),
        None => format!("#{}", neighbourhood.to_lowercase().replace(' ', "")),
    }
}

/// The hashtag with a definite article where the name takes one:
/// "the #southend".
pub fn display_neighbourhood(neighbourhood: &str, tables: &MappingTables) -> String {
    let hashtag = neighbourhood_hashtag(neighbourhood, tables);
    if tables.prepend_the.contains(neighbourhood) {
        format!("the {hashtag}")
    } else {
        hashtag
    }
}

fn split_sections<'a>(raw_section: &'a str, tables: &'a MappingTables) -> Vec<&'a str> {
    match tables.section_exceptions.get(raw_section) {
        Some(fixed) => fixed.iter().map(String::as_str).collect(),
        None => raw_section.split('/').filter(|s| !s.is_empty()).collect(),
    }
}

/// "in the West Fens section of #fenway" or "in #charlestown".
///
/// Only the first entry equal to the neighbourhood name is removed. Any
/// `Unnamed` entry collapses the clause, even next to named sections.
pub fn resolve_location(
    neighbourhood: &str,
    raw_section: Option<&str>,
    tables: &MappingTables,
) -> String {
    let place = display_neighbourhood(neighbourhood, tables);

    let mut sections = raw_section
        .map(|raw| split_sections(raw, tables))
        .unwrap_or_default();
    if let Some(pos) = sections.iter().position(|s| *s == neighbourhood) {
        sections.remove(pos);
    }

    if sections.is_empty() || sections.contains(&UNNAMED_SECTION) {
        format!("in {place}")
    } else {
        format!("in the {} section of {place}", sections.join("/"))
    }
}
