use std::collections::HashMap;

use crate::domain::error::SubtitleError;
use crate::domain::formats::{extension_of, is_subtitle};
use crate::media::archive::{ArchiveFormat, ArchiveReader};
use crate::media::names::display_name;

/// Index of a container owned by a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Path as the owning archive lists it; used to read the entry back.
    pub logical_path: String,
    /// `logical_path` after name recovery; used for matching and display.
    pub decoded_path: String,
    pub container: ContainerId,
    pub is_directory: bool,
}

impl CatalogEntry {
    pub fn decoded_base_name(&self) -> &str {
        let trimmed = self.decoded_path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// Every subtitle reachable from one package, in first-seen order.
///
/// The catalog owns the archive readers its entries point into, nested ones
/// included, so entries stay readable until the catalog is dropped.
#[derive(Default)]
pub struct Catalog {
    containers: Vec<ArchiveReader>,
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, logical_path: &str) -> Option<&CatalogEntry> {
        self.index.get(logical_path).map(|&pos| &self.entries[pos])
    }

    /// Read an entry's bytes from the archive that holds it.
    pub fn read(&mut self, logical_path: &str) -> Result<Vec<u8>, SubtitleError> {
        let container = self
            .get(logical_path)
            .map(|entry| entry.container)
            .ok_or_else(|| SubtitleError::MissingEntry(logical_path.to_string()))?;
        self.containers[container.0].read_entry(logical_path)
    }

    fn adopt(&mut self, reader: ArchiveReader) -> ContainerId {
        self.containers.push(reader);
        ContainerId(self.containers.len() - 1)
    }

    /// A repeated path replaces the earlier value but keeps its position.
    fn insert(&mut self, entry: CatalogEntry) {
        match self.index.get(&entry.logical_path) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.logical_path.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Take over a child catalog's containers and entries. Child paths are
    /// not prefixed with the nested archive's name.
    fn merge(&mut self, child: Catalog) {
        let offset = self.containers.len();
        self.containers.extend(child.containers);
        for mut entry in child.entries {
            entry.container = ContainerId(entry.container.0 + offset);
            self.insert(entry);
        }
    }
}

/// Walk `reader` depth-first and collect every subtitle entry, descending
/// into nested zip/rar/7z archives up to `max_depth` levels below the package.
///
/// A nested archive that fails to open or list is logged and skipped; the
/// rest of the walk continues.
pub fn list_subtitle_entries(
    reader: ArchiveReader,
    max_depth: usize,
) -> Result<Catalog, SubtitleError> {
    walk(reader, 0, max_depth)
}

fn walk(mut reader: ArchiveReader, depth: usize, max_depth: usize) -> Result<Catalog, SubtitleError> {
    let raw_entries = reader.entries()?;
    let mut catalog = Catalog::default();
    let id = catalog.adopt(reader);

    for raw in raw_entries {
        if raw.is_directory || raw.name.ends_with('/') {
            continue;
        }

        if is_subtitle(&raw.name) {
            catalog.insert(CatalogEntry {
                decoded_path: display_name(&raw.name),
                logical_path: raw.name,
                container: id,
                is_directory: false,
            });
            continue;
        }

        let Some(format) = extension_of(&raw.name).and_then(|ext| ArchiveFormat::from_tag(&ext)) else {
            continue;
        };

        if depth >= max_depth {
            log::warn!(
                "skipping nested archive '{}': deeper than {max_depth} levels",
                display_name(&raw.name)
            );
            continue;
        }

        log::debug!("descending into nested {format:?} archive '{}'", display_name(&raw.name));
        let child = catalog.containers[id.0]
            .read_entry(&raw.name)
            .and_then(|bytes| ArchiveReader::open(format, bytes))
            .and_then(|nested| walk(nested, depth + 1, max_depth));

        match child {
            Ok(child) => catalog.merge(child),
            Err(e) => log::warn!("skipping nested archive '{}': {e}", display_name(&raw.name)),
        }
    }

    Ok(catalog)
}
