use crate::errors::ComposeError;
use crate::models::parcel::ParcelRecord;
use crate::models::post::ComposedPost;
use crate::state::Catalog;
use crate::text::format::humanize_distance;

/// Closest stop, walk time, block-group walking distance, and how many lines
/// serve the neighbourhood. Attaches the neighbourhood map and the parcel
/// composite.
pub fn compose_transit(record: &ParcelRecord, catalog: &Catalog) -> Result<ComposedPost, ComposeError> {
    let neighborhood = catalog.neighborhoods.lookup(record.neighborhood.as_str())?;
    let transit_lines = neighborhood.n_bus_lines + neighborhood.n_subway_lines;

    let block_group_id = record
        .block_group_id
        .ok_or(ComposeError::MissingField("BG_ID_10"))?;
    let block_group = catalog.block_groups.lookup(&block_group_id)?;
    let distance = humanize_distance(
        block_group
            .median_transit_meters
            .ok_or(ComposeError::MissingField("MEDIAN_TRANSIT_METERS"))?,
    );

    let stop_type = record
        .stop_type
        .as_deref()
        .ok_or(ComposeError::MissingField("STOP_TYPE"))?
        .to_lowercase();
    let stop_name = record
        .stop_name
        .as_deref()
        .ok_or(ComposeError::MissingField("STOP_NAME"))?;
    let minutes = record
        .nearest_transit_seconds
        .ok_or(ComposeError::MissingField("NEAREST_TRANSIT_SECONDS"))?
        / 60.0;

    let mut images = vec![catalog.image_dirs.neighborhood_map(&record.neighborhood)];
    images.extend(
        record
            .land_parcel_id
            .map(|id| catalog.image_dirs.parcel_composite(id)),
    );

    Ok(ComposedPost {
        message: format!(
            "The closest MBTA {stop_type} stop is {stop_name}. \
             This is a {minutes:.2} minute walk, according to OpenStreetMap. \
             The average walking distance to a transit stop in this census block group is {distance}. \
             {transit_lines} different transit lines serve {}.",
            record.neighborhood
        ),
        images,
    })
}
