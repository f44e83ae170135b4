//! Link-stream input for the Physalia similarity-network toolkit.
//!
//! Reads pairwise similarity links from headered CSV files in the
//! `query,target,score,location,length` format and feeds them to a
//! spanning-tree builder.

pub mod links;

pub use links::{
    ingest_links, read_links, scan_max_node_id, IngestOptions, LinkRecord,
    DEFAULT_PROGRESS_CHUNK,
};
