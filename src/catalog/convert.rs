use tracing::{debug, warn};

use super::classify;
use super::domain::Pos;
use crate::osm::OsmNode;

/// Raised when a fetched node lacks the fields a catalog entry requires,
/// or carries a postal code that is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("OSM node {0} is missing required fields")]
pub struct OsmNodeMissingFields(pub i64);

/// Build a POS candidate from a fetched node.
///
/// Validation is all-or-nothing: either every required field resolves and
/// a complete candidate is returned, or the conversion fails before any
/// persistence is attempted. The candidate carries no id and no
/// timestamps; both are assigned by the repository.
pub fn pos_from_osm_node(node: &OsmNode) -> Result<Pos, OsmNodeMissingFields> {
    let name = required_tag(node, "name")?;
    let street = required_tag(node, "addr:street")?;
    let house_number = required_tag(node, "addr:housenumber")?;
    let postal_code_raw = required_tag(node, "addr:postcode")?;
    let city = required_tag(node, "addr:city")?;

    let postal_code = postal_code_raw.parse::<u32>().map_err(|_| {
        warn!(
            node_id = node.node_id(),
            postal_code = postal_code_raw,
            "OSM node has an invalid postal code"
        );
        OsmNodeMissingFields(node.node_id())
    })?;

    // First non-blank wins, so a description is always present.
    let description = [node.tag("description"), node.tag("amenity")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(name)
        .to_string();

    let pos_type = classify::pos_type(node);
    let campus = classify::campus(city, node);

    debug!(
        node_id = node.node_id(),
        name,
        street,
        city,
        "converted OSM node to POS candidate"
    );

    Ok(Pos {
        id: None,
        name: name.to_string(),
        description,
        pos_type,
        campus,
        street: street.to_string(),
        house_number: house_number.to_string(),
        postal_code,
        city: city.to_string(),
        created_at: None,
        updated_at: None,
    })
}

fn required_tag<'a>(node: &'a OsmNode, key: &str) -> Result<&'a str, OsmNodeMissingFields> {
    match node.tag(key).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            warn!(node_id = node.node_id(), key, "OSM node is missing a required tag");
            Err(OsmNodeMissingFields(node.node_id()))
        }
    }
}
