//! Reloadable catalog snapshots.
//!
//! A [`Snapshot`] pairs a [`Catalog`] with the [`BlendTable`] built from it.
//! [`CatalogStore`] publishes snapshots through [`arc_swap::ArcSwap`]:
//!
//! - Readers call [`CatalogStore::snapshot`] and keep the returned `Arc` for
//!   as long as they need a consistent view. Loading never blocks.
//! - [`CatalogStore::reload`] builds a complete new snapshot off to the side
//!   and publishes it with one atomic store. A reload that fails leaves the
//!   current snapshot untouched.
//!
//! Reloads are serialized so two of them never race to publish.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tintbot_color::Color;

use crate::blend::{BlendTable, DEFAULT_BLEND_RATIOS};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::namer::{self, NamedColor};
use crate::recency::RecentNameMemory;
use crate::resources::{ReferenceData, ReferenceSource};
use crate::selector::ColorSelector;

/// How snapshots are built.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub blend_ratios: Vec<f64>,
    pub strict: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            blend_ratios: DEFAULT_BLEND_RATIOS.to_vec(),
            strict: false,
        }
    }
}

/// A catalog and the blend table derived from it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    catalog: Catalog,
    table: BlendTable,
    generation: u64,
}

impl Snapshot {
    /// Build a catalog and its blend table from reference data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Data`] for a bad row in strict mode and
    /// [`crate::CoreError::InvalidArgument`] for a bad blend ratio.
    pub fn build(
        data: &ReferenceData,
        options: &StoreOptions,
        selector: &mut dyn ColorSelector,
    ) -> Result<Self> {
        let catalog = Catalog::from_reference(data, options.strict)?;
        let table = BlendTable::build(&catalog, &options.blend_ratios, selector)?;
        Ok(Self {
            catalog,
            table,
            generation: 0,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn table(&self) -> &BlendTable {
        &self.table
    }

    /// 0 for the first snapshot a store publishes, then +1 per reload.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// [`namer::name_color`] against this snapshot's table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidArgument`] if `k` is zero.
    pub fn name_color(
        &self,
        target: &Color,
        k: usize,
        memory: &RecentNameMemory,
    ) -> Result<Vec<NamedColor>> {
        namer::name_color(target, &self.table, k, memory)
    }
}

/// Atomically swappable [`Snapshot`] backed by a [`ReferenceSource`].
pub struct CatalogStore {
    source: Box<dyn ReferenceSource>,
    options: StoreOptions,
    current: ArcSwap<Snapshot>,
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("source", &self.source.describe())
            .field("options", &self.options)
            .field("generation", &self.current.load().generation)
            .finish()
    }
}

impl CatalogStore {
    /// Load the source once and publish the first snapshot.
    ///
    /// # Errors
    ///
    /// Propagates any error from loading the source or building the snapshot.
    pub fn open(
        source: impl ReferenceSource + 'static,
        options: StoreOptions,
        selector: &mut dyn ColorSelector,
    ) -> Result<Self> {
        let source: Box<dyn ReferenceSource> = Box::new(source);
        let snapshot = Snapshot::build(&source.load()?, &options, selector)?;
        log_published(&source.describe(), &snapshot);
        Ok(Self {
            source,
            options,
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
        })
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Rebuild from the source and publish the result.
    ///
    /// # Errors
    ///
    /// On failure the previous snapshot stays current and the error is
    /// returned.
    pub fn reload(&self, selector: &mut dyn ColorSelector) -> Result<Arc<Snapshot>> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.current.load().generation + 1;

        let built = self
            .source
            .load()
            .and_then(|data| Snapshot::build(&data, &self.options, selector));
        let mut snapshot = match built {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    %error,
                    "catalog reload failed; keeping previous snapshot"
                );
                return Err(error);
            }
        };

        snapshot.generation = generation;
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        log_published(&self.source.describe(), &snapshot);
        Ok(snapshot)
    }

    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}

fn log_published(source: &str, snapshot: &Snapshot) {
    let summary = snapshot.catalog.summary();
    tracing::info!(
        source,
        generation = snapshot.generation,
        rows = summary.entries,
        skipped = summary.skipped,
        splits = summary.splits,
        table = snapshot.table.len(),
        "catalog snapshot published"
    );
}
