//! Append-only per-organism indexes kept next to the cache slots.
//!
//! Both are read lazily from every cache root the first time a bucket is
//! queried, memoized for the life of the process, and extended on each store.
//! Nothing is ever removed, so a synonym may keep pointing at an identifier
//! whose record has since changed. Only the primary root is written, and it
//! records every entry stored through it even when a secondary root already
//! lists the same one.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::Utf8Path;

use crate::domain::{Bucket, Organism};
use crate::error::BiocycError;
use crate::store::CacheLayout;

type BucketKey = (Organism, Bucket);

/// Name table for one organism and bucket. `merged` answers lookups across
/// every root; `primary` mirrors the primary root's file alone and decides
/// what still has to be written there.
#[derive(Debug, Default)]
struct Synonyms {
    merged: HashMap<String, String>,
    primary: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct NameIndex {
    loaded: Mutex<HashMap<BucketKey, Synonyms>>,
}

impl NameIndex {
    pub fn lookup(
        &self,
        layout: &CacheLayout,
        organism: &Organism,
        bucket: Bucket,
        name: &str,
    ) -> Option<String> {
        let mut loaded = lock(&self.loaded);
        let synonyms = loaded
            .entry((organism.clone(), bucket))
            .or_insert_with(|| load_synonyms(layout, organism, bucket));
        synonyms.merged.get(&normalize_name(name)).cloned()
    }

    pub fn append<S: AsRef<str>>(
        &self,
        layout: &CacheLayout,
        organism: &Organism,
        bucket: Bucket,
        id: &str,
        names: &[S],
    ) -> Result<(), BiocycError> {
        let mut loaded = lock(&self.loaded);
        let synonyms = loaded
            .entry((organism.clone(), bucket))
            .or_insert_with(|| load_synonyms(layout, organism, bucket));

        let mut lines = String::new();
        for name in names {
            let label = single_line(name.as_ref());
            let key = normalize_name(&label);
            if key.is_empty() {
                continue;
            }
            synonyms.merged.insert(key.clone(), id.to_string());
            if synonyms.primary.get(&key).is_some_and(|existing| existing == id) {
                continue;
            }
            lines.push_str(&format!("{id}\t{label}\n"));
            synonyms.primary.insert(key, id.to_string());
        }
        if lines.is_empty() {
            return Ok(());
        }
        let root = primary(layout)?;
        append_lines(&CacheLayout::synonyms_path(root, organism, bucket), &lines)
    }

    pub fn reset(&self) {
        lock(&self.loaded).clear();
    }
}

#[derive(Debug, Default)]
struct Listing {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl Listing {
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.insert(id.to_string()) {
            self.order.push(id.to_string());
            return true;
        }
        false
    }
}

/// Identifier listing for one organism and bucket, in first-seen order across
/// every root. `written` holds what the primary root's file already lists.
#[derive(Debug, Default)]
struct CatalogEntry {
    merged: Listing,
    written: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    loaded: Mutex<HashMap<BucketKey, CatalogEntry>>,
}

impl Catalog {
    /// Every identifier ever cached in `bucket`, in first-seen order.
    pub fn ids(&self, layout: &CacheLayout, organism: &Organism, bucket: Bucket) -> Vec<String> {
        let mut loaded = lock(&self.loaded);
        loaded
            .entry((organism.clone(), bucket))
            .or_insert_with(|| load_listing(layout, organism, bucket))
            .merged
            .order
            .clone()
    }

    pub fn append(
        &self,
        layout: &CacheLayout,
        organism: &Organism,
        bucket: Bucket,
        id: &str,
    ) -> Result<(), BiocycError> {
        let mut loaded = lock(&self.loaded);
        let catalog = loaded
            .entry((organism.clone(), bucket))
            .or_insert_with(|| load_listing(layout, organism, bucket));
        catalog.merged.insert(id);
        if !catalog.written.insert(id.to_string()) {
            return Ok(());
        }
        let root = primary(layout)?;
        append_lines(
            &CacheLayout::catalog_path(root, organism, bucket),
            &format!("{id}\n"),
        )
    }

    pub fn reset(&self) {
        lock(&self.loaded).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn primary(layout: &CacheLayout) -> Result<&Utf8Path, BiocycError> {
    layout
        .primary()
        .ok_or_else(|| BiocycError::Filesystem("no cache directory configured".to_string()))
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn single_line(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Secondary roots are applied first so that primary entries win on conflicts.
fn load_synonyms(layout: &CacheLayout, organism: &Organism, bucket: Bucket) -> Synonyms {
    let mut synonyms = Synonyms::default();
    for (position, root) in layout.roots().iter().enumerate().rev() {
        let path = CacheLayout::synonyms_path(root, organism, bucket);
        let Some(content) = read_index_file(&path) else {
            continue;
        };
        for line in content.lines() {
            if let Some((id, name)) = line.split_once('\t') {
                let key = normalize_name(name);
                if id.is_empty() || key.is_empty() {
                    continue;
                }
                if position == 0 {
                    synonyms.primary.insert(key.clone(), id.to_string());
                }
                synonyms.merged.insert(key, id.to_string());
            }
        }
    }
    tracing::debug!(%organism, %bucket, entries = synonyms.merged.len(), "name index loaded");
    synonyms
}

fn load_listing(layout: &CacheLayout, organism: &Organism, bucket: Bucket) -> CatalogEntry {
    let mut catalog = CatalogEntry::default();
    for (position, root) in layout.roots().iter().enumerate() {
        let path = CacheLayout::catalog_path(root, organism, bucket);
        let Some(content) = read_index_file(&path) else {
            continue;
        };
        for id in content.lines().map(str::trim).filter(|id| !id.is_empty()) {
            catalog.merged.insert(id);
            if position == 0 {
                catalog.written.insert(id.to_string());
            }
        }
    }
    tracing::debug!(%organism, %bucket, entries = catalog.merged.order.len(), "catalog loaded");
    catalog
}

fn read_index_file(path: &Utf8Path) -> Option<String> {
    match fs::read_to_string(path.as_std_path()) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => {
            tracing::warn!(%path, error = %err, "unreadable index file");
            None
        }
    }
}

fn append_lines(path: &Utf8Path, lines: &str) -> Result<(), BiocycError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_std_path())
        .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
    file.write_all(lines.as_bytes())
        .map_err(|err| BiocycError::Filesystem(err.to_string()))
}
