//! Template-driven constants generation
//!
//! Expands a marked repeat line once per entry of a lookup model and writes
//! a runtime constants file plus optional editor-only list and lookup files
//! for every configured generator item. Data sources plug in through the
//! adapter registry; a debounced file watcher can trigger runs.

pub mod adapters;
pub mod error;
pub mod lookup;
pub mod output_writer;
pub mod pipeline;
pub mod report;
pub mod templates;
pub mod watcher;

// Re-export public API
pub use adapters::{
    list_discovered_adapters, AdapterContext, AdapterRegistration, AdapterRegistry,
    DataSourceAdapter, FnAdapter, JsonEntriesAdapter, LocaJsonAdapter, ParseKey,
};
pub use error::{GenerationError, GenerationResult};
pub use lookup::{
    default_cleanup, BoolLookupModel, Entry, FloatKey, FloatLookupModel, IntLookupModel, KeyKind,
    LookupKey, LookupModel, LookupSource, StringLookupModel, TransformFn,
};
pub use output_writer::{FileWriteResult, GeneratedFile, OutputWriter, OutputWriterConfig};
pub use pipeline::{
    GeneratingGuard, GenerationPipeline, LogRefresh, NoopRefresh, PipelineConfig, PipelineState,
    RefreshNotifier,
};
pub use report::{ItemOutcome, ItemReport, MissingMarker, RunOutcome, RunReport};
pub use templates::{
    BlockBuilder, NameTokens, ParsedTemplate, Placeholders, SubstitutionEngine, TemplateCache,
    TemplateKind, TemplateMarkerParser,
};
pub use watcher::{ChangeFlag, ChangeWatcher, NotifyBackend, TickAction, WatchBackend, WatchLoop};
