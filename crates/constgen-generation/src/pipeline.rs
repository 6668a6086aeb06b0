//! Generation pipeline
//!
//! One run drives every selected generator item through its data-source
//! adapter and the three templates, then writes the resulting files. At
//! most one run executes at a time per [`PipelineState`]; a request made
//! while a run is in progress is dropped, not queued.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use constgen_storage::{GeneratorItem, LoadedSettings, TemplatePaths};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::{AdapterContext, AdapterRegistry, DataSourceAdapter};
use crate::error::{GenerationError, GenerationResult};
use crate::output_writer::{FileWriteResult, GeneratedFile, OutputWriter, OutputWriterConfig};
use crate::report::{ItemOutcome, ItemReport, MissingMarker, RunOutcome, RunReport};
use crate::templates::{BlockBuilder, NameTokens, TemplateCache, TemplateKind};

/// Inputs shared by every run of a pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root all item output and source paths are relative to
    pub data_root: PathBuf,
    /// Template identifiers
    pub templates: TemplatePaths,
    /// Directory relative template identifiers resolve against
    pub template_base_dir: PathBuf,
    /// Extension of generated files, without the dot
    pub output_extension: String,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn from_settings(loaded: &LoadedSettings) -> Self {
        Self {
            data_root: loaded.data_root(),
            templates: loaded.settings.templates.clone(),
            template_base_dir: loaded.base_dir.clone(),
            output_extension: loaded.settings.output_extension.clone(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Destination of the file produced from `kind` for `item`
    pub fn output_path(&self, item: &GeneratorItem, kind: TemplateKind) -> PathBuf {
        let (dir, class_name) = match kind {
            TemplateKind::Runtime => (&item.output_path, &item.class_name_keys),
            TemplateKind::List => (&item.output_editor_path, &item.class_name_list),
            TemplateKind::Lookup => (&item.output_editor_path, &item.class_name_lookup),
        };
        self.data_root
            .join(dir)
            .join(format!("{}.{}", class_name, self.output_extension))
    }
}

/// Receives a notification once after every completed run
pub trait RefreshNotifier: Send + Sync {
    fn refresh(&self, report: &RunReport);
}

/// Ignores refresh notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRefresh;

impl RefreshNotifier for NoopRefresh {
    fn refresh(&self, _report: &RunReport) {}
}

/// Logs a one-line run summary
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRefresh;

impl RefreshNotifier for LogRefresh {
    fn refresh(&self, report: &RunReport) {
        info!(
            items = report.items.len(),
            files_written = report.files_written(),
            failures = report.failures().count(),
            missing_markers = report.missing_markers.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "Generation run finished"
        );
    }
}

/// In-progress flag shared by every handle of a pipeline
#[derive(Debug, Default)]
pub struct PipelineState {
    generating: AtomicBool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Enter the generating state, or `None` if a run is already in progress
    pub fn try_begin(self: &Arc<Self>) -> Option<GeneratingGuard> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GeneratingGuard {
                state: Arc::clone(self),
            })
    }
}

/// Returns the pipeline to idle when dropped, including on panic
#[derive(Debug)]
pub struct GeneratingGuard {
    state: Arc<PipelineState>,
}

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.state.generating.store(false, Ordering::Release);
    }
}

/// Orchestrates generation runs
#[derive(Clone)]
pub struct GenerationPipeline {
    config: Arc<PipelineConfig>,
    registry: Arc<AdapterRegistry>,
    state: Arc<PipelineState>,
    refresh: Arc<dyn RefreshNotifier>,
}

impl GenerationPipeline {
    pub fn new(config: PipelineConfig, registry: AdapterRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            state: Arc::new(PipelineState::new()),
            refresh: Arc::new(NoopRefresh),
        }
    }

    pub fn with_refresh(mut self, refresh: Arc<dyn RefreshNotifier>) -> Self {
        self.refresh = refresh;
        self
    }

    /// Share an in-progress flag with other pipelines
    pub fn with_state(mut self, state: Arc<PipelineState>) -> Self {
        self.state = state;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<PipelineState> {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        self.state.is_generating()
    }

    /// Start a run on the blocking pool without waiting for it
    ///
    /// Returns `None` when a run is already in progress. Must be called
    /// from within a Tokio runtime.
    pub fn trigger(
        &self,
        items: Vec<GeneratorItem>,
        filter: Option<Vec<String>>,
    ) -> Option<JoinHandle<RunOutcome>> {
        let Some(guard) = self.state.try_begin() else {
            debug!("Generation already in progress, dropping trigger");
            return None;
        };

        let pipeline = self.clone();
        Some(tokio::task::spawn_blocking(move || {
            let report = pipeline.execute(&items, filter.as_deref());
            drop(guard);
            pipeline.refresh.refresh(&report);
            RunOutcome::Completed(report)
        }))
    }

    /// Run and wait for completion
    pub async fn run(
        &self,
        items: Vec<GeneratorItem>,
        filter: Option<Vec<String>>,
    ) -> GenerationResult<RunOutcome> {
        match self.trigger(items, filter) {
            Some(handle) => handle
                .await
                .map_err(|e| GenerationError::Worker(e.to_string())),
            None => Ok(RunOutcome::Skipped),
        }
    }

    /// Run on the calling thread
    pub fn run_blocking(&self, items: &[GeneratorItem], filter: Option<&[String]>) -> RunOutcome {
        let Some(guard) = self.state.try_begin() else {
            debug!("Generation already in progress, dropping run");
            return RunOutcome::Skipped;
        };

        let report = self.execute(items, filter);
        drop(guard);
        self.refresh.refresh(&report);
        RunOutcome::Completed(report)
    }

    fn execute(&self, items: &[GeneratorItem], filter: Option<&[String]>) -> RunReport {
        let started = Instant::now();
        let mut run = RunState::new(&self.config);
        let mut report = RunReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        info!(items = items.len(), filtered = filter.is_some(), "Starting generation run");

        for (index, item) in items.iter().enumerate() {
            if !item.is_selected(filter) {
                continue;
            }

            let Some(adapter) = self.registry.get(&item.logic_id) else {
                warn!(logic_id = %item.logic_id, "No adapter registered, skipping item");
                report.items.push(ItemReport {
                    index,
                    logic_id: item.logic_id.clone(),
                    entries: 0,
                    outcome: ItemOutcome::Skipped {
                        reason: GenerationError::UnknownLogicId(item.logic_id.clone()).to_string(),
                    },
                });
                continue;
            };

            let (entries, outcome) = match run.generate_item(item, adapter.as_ref()) {
                Ok(generated) => {
                    report.missing_markers.extend(generated.missing_markers);
                    (generated.entries, ItemOutcome::Written { files: generated.files })
                }
                Err(e) => {
                    error!(logic_id = %item.logic_id, error = %e, "Generation failed for item");
                    (0, ItemOutcome::Failed { error: e })
                }
            };

            report.items.push(ItemReport {
                index,
                logic_id: item.logic_id.clone(),
                entries,
                outcome,
            });
        }

        report.duration = started.elapsed();
        report
    }
}

/// Products of one successfully generated item
struct GeneratedItem {
    entries: usize,
    files: Vec<FileWriteResult>,
    missing_markers: Vec<MissingMarker>,
}

/// Working state of one run
struct RunState<'c> {
    config: &'c PipelineConfig,
    templates: TemplateCache,
    writer: OutputWriter,
}

impl<'c> RunState<'c> {
    fn new(config: &'c PipelineConfig) -> Self {
        let paths = config.templates.resolve(&config.template_base_dir);
        Self {
            config,
            templates: TemplateCache::new(paths),
            writer: OutputWriter::with_config(OutputWriterConfig {
                dry_run: config.dry_run,
            }),
        }
    }

    fn generate_item(
        &mut self,
        item: &GeneratorItem,
        adapter: &dyn DataSourceAdapter,
    ) -> GenerationResult<GeneratedItem> {
        let kinds: &[TemplateKind] = if item.create_editor_only_lookup {
            &TemplateKind::ALL
        } else {
            &[TemplateKind::Runtime]
        };

        let names = NameTokens::from_item(item);
        let mut templates = Vec::with_capacity(kinds.len());
        let mut missing_markers = Vec::new();
        for &kind in kinds {
            let parsed = self.templates.get(kind)?;
            if !parsed.has_repeat_line() {
                let template_path = self.templates.path(kind).to_path_buf();
                warn!(
                    logic_id = %item.logic_id,
                    kind = %kind,
                    path = %template_path.display(),
                    "Template has no repeat-line marker, data block omitted"
                );
                missing_markers.push(MissingMarker {
                    logic_id: item.logic_id.clone(),
                    kind,
                    template_path,
                });
            }
            templates.push((kind, names.apply_to(&parsed)));
        }

        let context = AdapterContext::new(item, &self.config.data_root);
        let mut model = adapter.build(&context)?;
        let entries = model.len();
        let type_name = model.type_name();

        let builders: Rc<RefCell<Vec<BlockBuilder>>> = Rc::new(RefCell::new(
            templates
                .iter()
                .map(|(_, parsed)| BlockBuilder::new(parsed, type_name))
                .collect(),
        ));
        let sink = Rc::clone(&builders);
        model.set_transform(Box::new(move |key, value, comment| {
            for builder in sink.borrow_mut().iter_mut() {
                builder.push(key, value, comment);
            }
        }));
        model.transform_each()?;
        drop(model);

        let blocks: Vec<String> = builders
            .borrow_mut()
            .drain(..)
            .map(BlockBuilder::finish)
            .collect();

        let files: Vec<GeneratedFile> = templates
            .iter()
            .zip(blocks)
            .map(|((kind, parsed), block)| GeneratedFile {
                kind: *kind,
                path: self.config.output_path(item, *kind),
                content: parsed.inject_block(&block),
            })
            .collect();

        debug!(logic_id = %item.logic_id, entries, files = files.len(), "Assembled item");
        let files = self.writer.write_all(&files)?;

        Ok(GeneratedItem {
            entries,
            files,
            missing_markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::lookup::{IntLookupModel, LookupSource};

    fn setup() -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("runtime.cs.tmpl"),
            "class //%classNameKeys {\n    %constKey = \"%constValue\"; //%0\n}\n",
        )
        .unwrap();
        fs::write(templates.join("list.cs.tmpl"), "//%classNameList: %constValue //%0\n").unwrap();
        fs::write(
            templates.join("lookup.cs.tmpl"),
            "//%classNameLookup: %constKey=%constValue //%0\n",
        )
        .unwrap();

        let config = PipelineConfig {
            data_root: dir.path().join("out"),
            templates: TemplatePaths::default(),
            template_base_dir: dir.path().to_path_buf(),
            output_extension: "cs".to_string(),
            dry_run: false,
        };
        (dir, config)
    }

    fn registry() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register_fn("numbers", |_ctx| {
            let model: IntLookupModel = [(1, "Hello"), (2, "Good Bye")].into_iter().collect();
            Ok(Box::new(model) as Box<dyn LookupSource>)
        });
        registry
    }

    #[test]
    fn test_output_paths() {
        let (_dir, config) = setup();
        let item = GeneratorItem {
            class_name_keys: "Strings".to_string(),
            ..GeneratorItem::new("numbers")
        };
        assert_eq!(
            config.output_path(&item, TemplateKind::Runtime),
            config.data_root.join("Generated/Localization/Strings.cs")
        );
        assert_eq!(
            config.output_path(&item, TemplateKind::Lookup),
            config.data_root.join("Generated/Localization/Editor/Lookup.cs")
        );
    }

    #[test]
    fn test_run_blocking_writes_three_files() {
        let (_dir, config) = setup();
        let pipeline = GenerationPipeline::new(config.clone(), registry());
        let item = GeneratorItem::new("numbers");

        let outcome = pipeline.run_blocking(&[item.clone()], None);
        let report = outcome.report().unwrap();
        assert!(report.is_success());
        assert_eq!(report.files_written(), 3);
        assert_eq!(report.items[0].entries, 2);

        let runtime = fs::read_to_string(config.output_path(&item, TemplateKind::Runtime)).unwrap();
        assert_eq!(
            runtime,
            "class Keys {\n    1 = \"Hello\"; \n    2 = \"Good_Bye\"; \n}\n"
        );
        let list = fs::read_to_string(config.output_path(&item, TemplateKind::List)).unwrap();
        assert_eq!(list, "List: Hello \nList: Good_Bye \n");
        assert!(!pipeline.is_generating());
    }

    #[test]
    fn test_entry_data_is_not_renamed() {
        let (_dir, config) = setup();
        let mut registry = AdapterRegistry::new();
        registry.register_fn("tokens", |_ctx| {
            let model: IntLookupModel = [(1, "Use_//%classNameKeys")].into_iter().collect();
            Ok(Box::new(model) as Box<dyn LookupSource>)
        });
        let pipeline = GenerationPipeline::new(config.clone(), registry);
        let item = GeneratorItem {
            class_name_keys: "Strings".to_string(),
            create_editor_only_lookup: false,
            ..GeneratorItem::new("tokens")
        };

        pipeline.run_blocking(&[item.clone()], None).into_report().unwrap();
        let runtime = fs::read_to_string(config.output_path(&item, TemplateKind::Runtime)).unwrap();
        assert_eq!(runtime, "class Strings {\n    1 = \"Use_//%classNameKeys\"; \n}\n");
    }

    #[test]
    fn test_unregistered_logic_id_is_skipped_with_reason() {
        let (_dir, config) = setup();
        let pipeline = GenerationPipeline::new(config, registry());

        let report = pipeline
            .run_blocking(&[GeneratorItem::new("missing")], None)
            .into_report()
            .unwrap();
        match &report.items[0].outcome {
            ItemOutcome::Skipped { reason } => {
                assert_eq!(reason, &GenerationError::UnknownLogicId("missing".to_string()).to_string());
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_editor_only_outputs_follow_flag() {
        let (_dir, config) = setup();
        let pipeline = GenerationPipeline::new(config.clone(), registry());
        let item = GeneratorItem {
            create_editor_only_lookup: false,
            ..GeneratorItem::new("numbers")
        };

        let report = pipeline.run_blocking(&[item.clone()], None).into_report().unwrap();
        assert_eq!(report.files_written(), 1);
        assert!(!config.output_path(&item, TemplateKind::List).exists());
    }

    #[test]
    fn test_guard_blocks_second_run() {
        let (_dir, config) = setup();
        let pipeline = GenerationPipeline::new(config, registry());

        let guard = pipeline.state().try_begin().unwrap();
        assert!(pipeline.is_generating());
        assert!(pipeline.run_blocking(&[GeneratorItem::new("numbers")], None).is_skipped());
        drop(guard);
        assert!(!pipeline.is_generating());
    }

    #[test]
    fn test_unreadable_template_fails_item_only() {
        let (dir, config) = setup();
        fs::remove_file(dir.path().join("templates/list.cs.tmpl")).unwrap();
        let pipeline = GenerationPipeline::new(config, registry());
        let items = [
            GeneratorItem::new("numbers"),
            GeneratorItem {
                create_editor_only_lookup: false,
                class_name_keys: "Other".to_string(),
                ..GeneratorItem::new("numbers")
            },
        ];

        let report = pipeline.run_blocking(&items, None).into_report().unwrap();
        assert!(matches!(
            report.items[0].outcome,
            ItemOutcome::Failed {
                error: GenerationError::TemplateUnreadable {
                    kind: TemplateKind::List,
                    ..
                }
            }
        ));
        assert_eq!(report.items[1].files().len(), 1);
    }
}
