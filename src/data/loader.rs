use std::collections::HashMap;
use std::sync::Arc;

use super::model::Table;
use super::store::{MovieStore, ReportQuery, StoreError};

/// Anything that can answer a report query with a materialised table.
pub trait TableSource {
    fn load(&mut self, query: ReportQuery) -> Result<Arc<Table>, StoreError>;
}

// ---------------------------------------------------------------------------
// QueryCache – query text → materialised result
// ---------------------------------------------------------------------------

/// Read-through cache keyed by the exact SQL text.
///
/// Entries never expire: the movie table is treated as static for the life of
/// the session. [`QueryCache::clear`] is the only invalidation, driven by the
/// user reloading data or switching databases. Failed queries are not cached.
#[derive(Debug, Default)]
pub struct QueryCache {
    enabled: bool,
    entries: HashMap<String, Arc<Table>>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn get_or_load(
        &mut self,
        sql: &str,
        load: impl FnOnce(&str) -> Result<Table, StoreError>,
    ) -> Result<Arc<Table>, StoreError> {
        if !self.enabled {
            return load(sql).map(Arc::new);
        }
        if let Some(table) = self.entries.get(sql) {
            self.hits += 1;
            log::debug!("cache hit for {sql:?}");
            return Ok(Arc::clone(table));
        }
        self.misses += 1;
        let table = Arc::new(load(sql)?);
        self.entries.insert(sql.to_string(), Arc::clone(&table));
        Ok(table)
    }

    pub fn clear(&mut self) {
        log::info!("clearing {} cached result(s)", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

// ---------------------------------------------------------------------------
// DatasetLoader – store + cache
// ---------------------------------------------------------------------------

/// Runs report queries through the cache.
#[derive(Debug)]
pub struct DatasetLoader {
    store: MovieStore,
    cache: QueryCache,
}

impl DatasetLoader {
    pub fn new(store: MovieStore, cache_enabled: bool) -> Self {
        Self {
            store,
            cache: QueryCache::new(cache_enabled),
        }
    }

    /// Drop cached results so the next load reads the database again.
    pub fn reload(&mut self) {
        self.cache.clear();
    }

    /// Point at a different database; the cache is emptied.
    pub fn replace_store(&mut self, store: MovieStore) {
        self.store = store;
        self.cache.clear();
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

impl TableSource for DatasetLoader {
    fn load(&mut self, query: ReportQuery) -> Result<Arc<Table>, StoreError> {
        let sql = self.store.sql_for(query);
        log::debug!("loading {query:?}");
        let store = &self.store;
        self.cache.get_or_load(&sql, |sql| store.run(sql))
    }
}
