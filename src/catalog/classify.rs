//! Deterministic tag-to-taxonomy classification. Both functions are
//! total: any tag set, including an empty one, yields a value.

use super::domain::{CampusType, PosType};
use crate::osm::OsmNode;

/// Derive the POS type from the node's tags.
///
/// The `amenity` tag wins when present; without it, a `shop` tag that
/// mentions bakery is enough. Anything else counts as a cafe, since the
/// catalog only carries coffee-related entries to begin with.
pub fn pos_type(node: &OsmNode) -> PosType {
    if let Some(amenity) = node.tag("amenity") {
        return match amenity.to_lowercase().as_str() {
            "cafe" | "coffee" => PosType::Cafe,
            "bakery" => PosType::Bakery,
            "vending_machine" => PosType::VendingMachine,
            "fast_food" | "restaurant" => PosType::Cafeteria,
            _ => PosType::Cafe,
        };
    }

    if node
        .tag("shop")
        .is_some_and(|shop| shop.to_lowercase().contains("bakery"))
    {
        return PosType::Bakery;
    }

    PosType::Cafe
}

/// Derive the campus zone from the (already validated) city and the
/// node's district tag. Cities other than Heidelberg always map to
/// Altstadt.
pub fn campus(city: &str, node: &OsmNode) -> CampusType {
    if !city.eq_ignore_ascii_case("heidelberg") {
        return CampusType::Altstadt;
    }

    match node.tag("addr:district").map(str::to_lowercase).as_deref() {
        Some("bergheim") => CampusType::Bergheim,
        Some("inf") | Some("neuenheim") => CampusType::Inf,
        _ => CampusType::Altstadt,
    }
}
