//! CSV parsing and ingestion of similarity links.
//!
//! The expected format is a header line followed by
//! `query,target,score,location,length` records, all fields integer.
//! Malformed records and records whose node ids fall outside the
//! builder's capacity are skipped silently; only well-formed, in-range
//! records reach the tree and its counters.

use std::fs::File;
use std::path::Path;

use ::csv::{ErrorKind, ReaderBuilder, StringRecord};
use physalia_core::{PhysaliaError, Result};
use physalia_tree::MaxSpanningTree;

/// Distinct-query interval between progress log lines.
pub const DEFAULT_PROGRESS_CHUNK: usize = 1000;

/// One similarity link as it appears on the wire.
///
/// The CSV format carries a single score; it fills both the adjusted and
/// raw score slots of the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRecord {
    pub query: usize,
    pub target: usize,
    pub score: i32,
    pub location: i32,
    pub length: i32,
}

/// Options for [`ingest_links`].
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Log progress whenever a new `query` id divisible by this shows up.
    pub progress_chunk: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            progress_chunk: DEFAULT_PROGRESS_CHUNK,
        }
    }
}

fn parse_record(record: &StringRecord) -> Option<LinkRecord> {
    Some(LinkRecord {
        query: record.get(0)?.trim().parse().ok()?,
        target: record.get(1)?.trim().parse().ok()?,
        score: record.get(2)?.trim().parse().ok()?,
        location: record.get(3)?.trim().parse().ok()?,
        length: record.get(4)?.trim().parse().ok()?,
    })
}

fn open_reader(path: &Path) -> Result<::csv::Reader<File>> {
    let file = File::open(path).map_err(|e| {
        PhysaliaError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Read all well-formed link records from a CSV file.
///
/// Malformed records are dropped; node-id range checks are left to the
/// consumer since only the tree builder knows its capacity.
pub fn read_links(path: impl AsRef<Path>) -> Result<Vec<LinkRecord>> {
    let mut reader = open_reader(path.as_ref())?;
    let mut links = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                if let Some(link) = parse_record(&record) {
                    links.push(link);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => {
                return Err(PhysaliaError::Parse(e.to_string()))
            }
            Err(_) => continue,
        }
    }
    Ok(links)
}

/// Stream link records from a CSV file into a tree builder.
///
/// Records with ids outside the builder's capacity are skipped without
/// touching its counters. Progress is logged at every chunk-divisible
/// distinct `query` id.
pub fn ingest_links(
    path: impl AsRef<Path>,
    tree: &mut MaxSpanningTree,
    options: &IngestOptions,
) -> Result<()> {
    let mut reader = open_reader(path.as_ref())?;
    let capacity = tree.capacity();
    let mut last_query: Option<usize> = None;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => {
                return Err(PhysaliaError::Parse(e.to_string()))
            }
            Err(_) => continue,
        };
        let Some(link) = parse_record(&record) else {
            continue;
        };

        if last_query != Some(link.query) {
            last_query = Some(link.query);
            if options.progress_chunk > 0 && link.query % options.progress_chunk == 0 {
                log::info!("ingesting links for query {}", link.query);
            }
        }

        if link.query >= capacity || link.target >= capacity {
            continue;
        }

        tree.add_link(
            link.query,
            link.target,
            link.score,
            link.score,
            link.location,
            link.length,
        )?;
    }

    Ok(())
}

/// Scan the first CSV column for the maximum node id.
///
/// Used to size a builder when the caller does not know the node count:
/// allocate `scan_max_node_id(path)? + 1`.
pub fn scan_max_node_id(path: impl AsRef<Path>) -> Result<usize> {
    let mut reader = open_reader(path.as_ref())?;
    let mut max_id = 0usize;
    let mut last_logged = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => {
                return Err(PhysaliaError::Parse(e.to_string()))
            }
            Err(_) => continue,
        };
        let Some(id) = record.get(0).and_then(|f| f.trim().parse::<usize>().ok()) else {
            continue;
        };
        max_id = max_id.max(id);

        if id > last_logged {
            last_logged = id;
            if id % DEFAULT_PROGRESS_CHUNK == 0 {
                log::info!("scanned up to node id {id}");
            }
        }
    }

    Ok(max_id)
}
