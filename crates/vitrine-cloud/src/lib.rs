//! Cloud storage for Vitrine
//!
//! Lists, uploads and downloads models kept in a storage bucket folder
//! (`models/glb` by default). [`CloudListing`] refreshes the model list on an
//! interval and [`CloudSink`] lets the exporter save straight to the bucket.

pub mod config;
pub mod listing;
pub mod naming;
pub mod sink;
pub mod store;

pub use config::StorageConfig;
pub use listing::CloudListing;
pub use naming::object_name;
pub use sink::{cloud_export_options, CloudSink};
pub use store::{percent_encode, HttpObjectStore, MemoryStore, ObjectStore, RemoteModel};
