use std::time::Duration;

use camino::Utf8PathBuf;

use crate::config::{ClientConfig, parse_expiry};
use crate::domain::{Bucket, Category, DetailLevel, Organism, Relation};
use crate::error::BiocycError;
use crate::rate::RateGate;
use crate::record::{Entry, Record};
use crate::registry::{self, Built};
use crate::remote::{HttpTransport, RemoteFetcher, Transport};
use crate::store::CacheStore;

/// Resolves BioCyc frames through the disk cache, falling back to the web
/// service. Settings are changed through `&mut self`, so a shared client
/// cannot be reconfigured underneath a running lookup.
pub struct Client<T: Transport> {
    organism: Organism,
    fetcher: RemoteFetcher<T>,
    store: CacheStore,
}

impl Client<HttpTransport> {
    pub fn connect(config: ClientConfig) -> Result<Self, BiocycError> {
        Ok(Self::new(config, HttpTransport::new()?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let gate = RateGate::new(config.min_interval);
        Self {
            organism: config.organism,
            fetcher: RemoteFetcher::new(transport, gate, &config.base_url, config.detail),
            store: CacheStore::new(config.cache_paths, config.expiry),
        }
    }

    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }

    pub fn organism(&self) -> &Organism {
        &self.organism
    }

    pub fn detail(&self) -> DetailLevel {
        self.fetcher.detail()
    }

    pub fn expiry(&self) -> Duration {
        self.store.expiry()
    }

    pub fn set_organism(&mut self, organism: &str) -> Result<(), BiocycError> {
        self.organism = organism.parse()?;
        Ok(())
    }

    pub fn set_detail(&mut self, detail: &str) -> Result<(), BiocycError> {
        self.fetcher.set_detail(detail.parse()?);
        Ok(())
    }

    pub fn set_detail_level(&mut self, detail: DetailLevel) {
        self.fetcher.set_detail(detail);
    }

    pub fn set_expiry(&mut self, expiry: Duration) {
        self.store.set_expiry(expiry);
    }

    pub fn set_expiry_str(&mut self, expiry: &str) -> Result<(), BiocycError> {
        self.store.set_expiry(parse_expiry(expiry)?);
        Ok(())
    }

    /// Adds a read-only fallback cache root after the existing ones.
    pub fn add_secondary_cache(&mut self, root: Utf8PathBuf) {
        self.store.add_secondary(root);
    }

    /// Resolves one identifier in the current organism. `None` only for an
    /// empty identifier; a missing frame is `Entry::NotFound`.
    pub fn resolve(&self, id: &str) -> Result<Option<Entry>, BiocycError> {
        self.resolve_in(&self.organism, id)
    }

    pub fn resolve_all<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Option<Entry>>, BiocycError> {
        self.resolve_all_in(&self.organism, ids)
    }

    pub fn resolve_all_in<S: AsRef<str>>(
        &self,
        organism: &Organism,
        ids: &[S],
    ) -> Result<Vec<Option<Entry>>, BiocycError> {
        ids.iter()
            .map(|id| self.resolve_in(organism, id.as_ref()))
            .collect()
    }

    pub fn resolve_in(&self, organism: &Organism, id: &str) -> Result<Option<Entry>, BiocycError> {
        if id.is_empty() {
            return Ok(None);
        }
        if let Some(entry) = self.store.lookup(organism, id) {
            return Ok(Some(entry));
        }

        tracing::debug!(%organism, id, "cache miss");
        let built = match self.fetcher.fetch_record(organism, id)? {
            Some(document) => registry::build(organism, id, &document),
            None => Built::not_found(organism, id),
        };
        for record in built.embedded {
            self.store.store(&Entry::found(record))?;
        }
        self.store.store(&built.entry)?;
        Ok(Some(built.entry))
    }

    /// Record of the given category, or `None` when the identifier is unknown
    /// or names a frame of another category.
    pub fn get(&self, category: Category, id: &str) -> Result<Option<Record>, BiocycError> {
        Ok(self
            .resolve(id)?
            .and_then(Entry::into_record)
            .filter(|record| record.category == category))
    }

    pub fn compound(&self, id: &str) -> Result<Option<Record>, BiocycError> {
        self.get(Category::Compound, id)
    }

    pub fn pathway(&self, id: &str) -> Result<Option<Record>, BiocycError> {
        self.get(Category::Pathway, id)
    }

    pub fn reaction(&self, id: &str) -> Result<Option<Record>, BiocycError> {
        self.get(Category::Reaction, id)
    }

    pub fn protein(&self, id: &str) -> Result<Option<Record>, BiocycError> {
        self.get(Category::Protein, id)
    }

    pub fn gene(&self, id: &str) -> Result<Option<Record>, BiocycError> {
        self.get(Category::Gene, id)
    }

    /// Identifier registered for `name` in one bucket of the current organism.
    pub fn lookup_name(&self, bucket: Bucket, name: &str) -> Option<String> {
        self.store.name_lookup(&self.organism, bucket, name)
    }

    pub fn get_by_name(&self, bucket: Bucket, name: &str) -> Result<Option<Record>, BiocycError> {
        match self.lookup_name(bucket, name) {
            Some(id) => self.get(bucket.category(), &id),
            None => Ok(None),
        }
    }

    /// Probes pathways, genes, reactions, compounds and proteins, in that order.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Entry>, BiocycError> {
        for bucket in Bucket::NAME_SEARCH_ORDER {
            if let Some(id) = self.lookup_name(bucket, name) {
                return self.resolve(&id);
            }
        }
        Ok(None)
    }

    pub fn compound_by_name(&self, name: &str) -> Result<Option<Record>, BiocycError> {
        self.get_by_name(Bucket::Compounds, name)
    }

    pub fn pathway_by_name(&self, name: &str) -> Result<Option<Record>, BiocycError> {
        self.get_by_name(Bucket::Pathways, name)
    }

    pub fn reaction_by_name(&self, name: &str) -> Result<Option<Record>, BiocycError> {
        self.get_by_name(Bucket::Reactions, name)
    }

    pub fn protein_by_name(&self, name: &str) -> Result<Option<Record>, BiocycError> {
        self.get_by_name(Bucket::Proteins, name)
    }

    pub fn gene_by_name(&self, name: &str) -> Result<Option<Record>, BiocycError> {
        self.get_by_name(Bucket::Genes, name)
    }

    /// Every record ever cached in `bucket` for the current organism.
    pub fn list(&self, bucket: Bucket) -> Result<Vec<Entry>, BiocycError> {
        let ids = self.store.catalog_ids(&self.organism, bucket);
        Ok(self.resolve_all(&ids)?.into_iter().flatten().collect())
    }

    /// Resolves the neighbours of `record` along `relation` in the record's own organism.
    pub fn related(&self, record: &Record, relation: Relation) -> Result<Vec<Entry>, BiocycError> {
        let ids = record.related_ids(relation);
        Ok(self
            .resolve_all_in(&record.organism, &ids)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Runs a web-service function (e.g. `genes-of-pathway`) and resolves every
    /// frame it returns. The function result itself is not cached.
    pub fn apply_function(&self, function: &str, id: &str) -> Result<Vec<Entry>, BiocycError> {
        let Some(document) = self.fetcher.fetch_function(function, &self.organism, id)? else {
            return Ok(Vec::new());
        };
        let ids = document.frame_ids("*");
        Ok(self.resolve_all(&ids)?.into_iter().flatten().collect())
    }

    pub fn object_url(&self, record: &Record) -> String {
        format!(
            "https://biocyc.org/{}/NEW-IMAGE?type={}&object={}",
            record.organism, record.category, record.id
        )
    }
}
