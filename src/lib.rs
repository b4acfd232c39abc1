//! Campus Coffee catalog: a small service that maintains points of sale
//! (cafes, bakeries, vending machines, cafeterias) around the Heidelberg
//! campuses and imports new entries from OpenStreetMap nodes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod osm;
pub mod telemetry;
