//! Catalog core: the POS domain model, OSM-to-POS conversion, and the
//! service facade tying fetch, conversion, and persistence together.

pub mod classify;
pub mod convert;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use convert::{pos_from_osm_node, OsmNodeMissingFields};
pub use domain::{CampusType, Pos, PosType};
pub use repository::{InMemoryPosRepository, PosRepository, RepositoryError};
pub use router::pos_router;
pub use service::{PosService, PosServiceError};
