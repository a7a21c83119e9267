//! Body catalog: the external body dataset in normalized, in-memory form.
//!
//! Reads the JSON document, derives size ratios and angular rates, and
//! validates names and texture references before anything is built.

mod catalog;
pub mod document;
mod error;
mod record;

pub use catalog::{Catalog, CatalogUnits};
pub use error::DataError;
pub use record::{BeltRecord, BodyRecord, RingRecord, SatelliteRecord, StarRecord};
