//! Marker catalog: static lists loaded from configuration and projected
//! into map markers

pub mod error;
pub mod icons;
pub mod marker_catalog;
pub mod records;
pub mod source;
pub mod views;

pub use error::{CatalogError, CatalogResult};
pub use icons::{decode_data_uri, BundledIcon, Icon, IconCache, IconRef};
pub use marker_catalog::{MarkerCatalog, NearestStrategy};
pub use records::{
    encode_id, Address, Contact, MarkerCategory, MarkerInfo, MarkerRecord, MarkerSource, Sponsor,
    TeamMember,
};
pub use source::{load_marker_records, JsonDirectorySource, RecordSource, StaticSource};
pub use views::{build_marker_view, InfoTemplate, MarkerView};
