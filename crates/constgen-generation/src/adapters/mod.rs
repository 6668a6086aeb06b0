//! Data-source adapters
//!
//! An adapter turns one generator item's source data into a lookup model.
//! Adapters are looked up by the item's logic ID. Built-in adapters
//! register themselves at startup through `inventory::submit!` and are
//! collected by [`AdapterRegistry::discover`]; embedding applications and
//! tests add their own with [`AdapterRegistry::register`].
//!
//! # Example
//!
//! ```ignore
//! use constgen_generation::adapters::{AdapterRegistration, DataSourceAdapter};
//!
//! inventory::submit! {
//!     AdapterRegistration::new("my-source", "Reads my source format", create_my_adapter)
//! }
//! ```

pub mod json;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use constgen_storage::GeneratorItem;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::GenerationResult;
use crate::lookup::LookupSource;

pub use json::{JsonEntriesAdapter, LocaJsonAdapter, ParseKey};

/// What an adapter sees of the run it is called from
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    /// The item being generated
    pub item: &'a GeneratorItem,
    /// Root all item paths are relative to
    pub data_root: &'a Path,
}

impl<'a> AdapterContext<'a> {
    pub fn new(item: &'a GeneratorItem, data_root: &'a Path) -> Self {
        Self { item, data_root }
    }

    /// The item's source file resolved against the data root
    pub fn source_path(&self) -> PathBuf {
        self.data_root.join(&self.item.source_path)
    }
}

/// Builds a populated lookup model for a generator item
///
/// Adapters are shared across runs and threads; the model they build is
/// owned by a single run.
pub trait DataSourceAdapter: Send + Sync {
    /// Logic ID this adapter serves
    fn logic_id(&self) -> &str;

    /// One-line description shown by tooling
    fn description(&self) -> &str {
        ""
    }

    /// Build the model for one item
    fn build(&self, context: &AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>>;
}

/// Adapter backed by a closure
pub struct FnAdapter<F> {
    logic_id: String,
    build_fn: F,
}

impl<F> FnAdapter<F>
where
    F: Fn(&AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> + Send + Sync,
{
    pub fn new(logic_id: impl Into<String>, build_fn: F) -> Self {
        Self {
            logic_id: logic_id.into(),
            build_fn,
        }
    }
}

impl<F> DataSourceAdapter for FnAdapter<F>
where
    F: Fn(&AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> + Send + Sync,
{
    fn logic_id(&self) -> &str {
        &self.logic_id
    }

    fn build(&self, context: &AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> {
        (self.build_fn)(context)
    }
}

/// Static registration of a built-in adapter
pub struct AdapterRegistration {
    /// Logic ID served by the adapter
    pub logic_id: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Creates the adapter instance
    pub factory_fn: fn() -> Arc<dyn DataSourceAdapter>,
}

impl AdapterRegistration {
    pub const fn new(
        logic_id: &'static str,
        description: &'static str,
        factory_fn: fn() -> Arc<dyn DataSourceAdapter>,
    ) -> Self {
        Self {
            logic_id,
            description,
            factory_fn,
        }
    }
}

inventory::collect!(AdapterRegistration);

/// Logic IDs of all statically registered adapters, sorted
pub fn list_discovered_adapters() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = inventory::iter::<AdapterRegistration>
        .into_iter()
        .map(|registration| registration.logic_id)
        .collect();
    ids.sort_unstable();
    ids
}

/// Mapping from logic ID to adapter
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: IndexMap<String, Arc<dyn DataSourceAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every statically registered adapter, in logic ID order
    pub fn discover() -> Self {
        let mut registrations: Vec<&AdapterRegistration> =
            inventory::iter::<AdapterRegistration>.into_iter().collect();
        registrations.sort_by_key(|registration| registration.logic_id);

        let mut registry = Self::new();
        for registration in registrations {
            debug!(logic_id = registration.logic_id, "Discovered data-source adapter");
            registry.register((registration.factory_fn)());
        }
        registry
    }

    /// Register an adapter under its logic ID, returning the one it replaces
    pub fn register(&mut self, adapter: Arc<dyn DataSourceAdapter>) -> Option<Arc<dyn DataSourceAdapter>> {
        self.adapters.insert(adapter.logic_id().to_string(), adapter)
    }

    /// Register a closure as the adapter for `logic_id`
    pub fn register_fn<F>(&mut self, logic_id: impl Into<String>, build_fn: F) -> Option<Arc<dyn DataSourceAdapter>>
    where
        F: Fn(&AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnAdapter::new(logic_id, build_fn)))
    }

    pub fn get(&self, logic_id: &str) -> Option<&Arc<dyn DataSourceAdapter>> {
        self.adapters.get(logic_id)
    }

    pub fn contains(&self, logic_id: &str) -> bool {
        self.adapters.contains_key(logic_id)
    }

    /// Registered adapters in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DataSourceAdapter>> {
        self.adapters.values()
    }

    pub fn logic_ids(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("logic_ids", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}
