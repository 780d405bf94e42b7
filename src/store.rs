use std::fs;
use std::io::{self, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{Bucket, Organism};
use crate::error::BiocycError;
use crate::index::{Catalog, NameIndex};
use crate::record::{Entry, Record};

/// On-disk layout shared by every cache root:
///
/// ```text
/// <root>/<ORG>/<id>                 one JSON snapshot per record
/// <root>/<ORG>/<bucket>             catalog, one identifier per line
/// <root>/<ORG>/<bucket>-synonyms    name index, `id\tname` per line
/// ```
#[derive(Debug, Clone)]
pub struct CacheLayout {
    roots: Vec<Utf8PathBuf>,
}

impl CacheLayout {
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    /// Only the primary root is ever written.
    pub fn primary(&self) -> Option<&Utf8Path> {
        self.roots.first().map(Utf8PathBuf::as_path)
    }

    /// All roots, primary first.
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    pub fn push_root(&mut self, root: Utf8PathBuf) {
        self.roots.push(root);
    }

    pub fn organism_dir(root: &Utf8Path, organism: &Organism) -> Utf8PathBuf {
        root.join(organism.as_str())
    }

    pub fn slot_path(root: &Utf8Path, organism: &Organism, id: &str) -> Utf8PathBuf {
        Self::organism_dir(root, organism).join(slot_file_name(id))
    }

    pub fn catalog_path(root: &Utf8Path, organism: &Organism, bucket: Bucket) -> Utf8PathBuf {
        Self::organism_dir(root, organism).join(bucket.as_str())
    }

    pub fn synonyms_path(root: &Utf8Path, organism: &Organism, bucket: Bucket) -> Utf8PathBuf {
        Self::organism_dir(root, organism).join(bucket.synonyms_file_name())
    }

    fn primary_or_err(&self) -> Result<&Utf8Path, BiocycError> {
        self.primary()
            .ok_or_else(|| BiocycError::Filesystem("no cache directory configured".to_string()))
    }
}

/// Frame ids are used verbatim as file names; only separators and dot-names are escaped.
/// Ids that would land on an index file (`Compounds`, `GENES-synonyms`, ...), compared
/// case-insensitively, get their first character escaped.
fn slot_file_name(id: &str) -> String {
    match id {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ if is_index_file_name(id) => {
            let mut chars = id.chars();
            let first = chars.next().map(u32::from).unwrap_or_default();
            format!("%{first:02X}{}", chars.as_str())
        }
        _ => id
            .replace('%', "%25")
            .replace('/', "%2F")
            .replace('\\', "%5C"),
    }
}

fn is_index_file_name(id: &str) -> bool {
    Bucket::NAME_SEARCH_ORDER.iter().any(|bucket| {
        id.eq_ignore_ascii_case(bucket.as_str())
            || id.eq_ignore_ascii_case(&bucket.synonyms_file_name())
    })
}

pub struct CacheStore {
    layout: CacheLayout,
    expiry: Duration,
    names: NameIndex,
    catalog: Catalog,
}

impl CacheStore {
    pub fn new(roots: Vec<Utf8PathBuf>, expiry: Duration) -> Self {
        Self {
            layout: CacheLayout::new(roots),
            expiry,
            names: NameIndex::default(),
            catalog: Catalog::default(),
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn set_expiry(&mut self, expiry: Duration) {
        self.expiry = expiry;
    }

    pub fn add_secondary(&mut self, root: Utf8PathBuf) {
        self.layout.push_root(root);
        self.names.reset();
        self.catalog.reset();
    }

    pub fn is_fresh(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match TimeDelta::from_std(self.expiry)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
        {
            Some(cutoff) => created_at > cutoff,
            None => true,
        }
    }

    /// First fresh entry across the cache roots, primary first. Unreadable and
    /// stale slots are skipped and left in place.
    pub fn lookup(&self, organism: &Organism, id: &str) -> Option<Entry> {
        let now = Utc::now();
        for root in self.layout.roots() {
            let path = CacheLayout::slot_path(root, organism, id);
            let Some(entry) = read_slot(&path) else {
                continue;
            };
            if self.is_fresh(entry.created_at(), now) {
                tracing::debug!(%organism, id, %path, "cache hit");
                return Some(entry);
            }
            tracing::debug!(%organism, id, %path, "stale cache entry");
        }
        None
    }

    /// Writes the entry to the primary root and, for bucketed records, extends
    /// the catalog and name index.
    pub fn store(&self, entry: &Entry) -> Result<(), BiocycError> {
        let root = self.layout.primary_or_err()?;
        let path = CacheLayout::slot_path(root, entry.organism(), entry.id());
        let content = serde_json::to_vec_pretty(entry)
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
        Self::write_bytes_atomic(&path, &content)?;
        tracing::info!(organism = %entry.organism(), id = entry.id(), found = entry.is_found(), "cache.store");

        if let Some(record) = entry.record() {
            self.index(record)?;
        }
        Ok(())
    }

    fn index(&self, record: &Record) -> Result<(), BiocycError> {
        let Some(bucket) = record.category.bucket() else {
            return Ok(());
        };
        self.catalog
            .append(&self.layout, &record.organism, bucket, &record.id)?;
        self.names.append(
            &self.layout,
            &record.organism,
            bucket,
            &record.id,
            &record.index_names(),
        )
    }

    pub fn name_lookup(&self, organism: &Organism, bucket: Bucket, name: &str) -> Option<String> {
        self.names.lookup(&self.layout, organism, bucket, name)
    }

    pub fn catalog_ids(&self, organism: &Organism, bucket: Bucket) -> Vec<String> {
        self.catalog.ids(&self.layout, organism, bucket)
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), BiocycError> {
        let parent = path
            .parent()
            .ok_or_else(|| BiocycError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".biocyc-slot")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| BiocycError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn read_slot(path: &Utf8Path) -> Option<Entry> {
    let content = match fs::read(path.as_std_path()) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(%path, error = %err, "unreadable cache slot");
            return None;
        }
    };
    match serde_json::from_slice(&content) {
        Ok(entry) => Some(entry),
        Err(err) => {
            tracing::warn!(%path, error = %err, "corrupt cache slot");
            None
        }
    }
}
