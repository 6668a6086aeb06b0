// Show which markers the configured templates contain

use std::path::PathBuf;

use async_trait::async_trait;
use constgen_generation::{AdapterRegistry, PipelineConfig, TemplateCache, TemplateKind};
use constgen_storage::{ConfigLoader, LoadedSettings};

use super::Command;
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Marker lines found in one template, 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub kind: TemplateKind,
    pub path: PathBuf,
    pub repeat_line: Option<usize>,
    pub comment_line: Option<usize>,
    /// Read error, when the template could not be loaded
    pub error: Option<String>,
}

/// One generator item as the pipeline would see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub logic_id: String,
    pub is_active: bool,
    pub adapter_registered: bool,
    pub outputs: Vec<PathBuf>,
}

/// Inspect the settings file and its templates
pub struct InspectCommand {
    pub config_path: PathBuf,
}

impl InspectCommand {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Parse the three configured templates
    pub fn templates(loaded: &LoadedSettings) -> Vec<TemplateSummary> {
        let mut cache = TemplateCache::new(loaded.settings.templates.resolve(&loaded.base_dir));

        TemplateKind::ALL
            .iter()
            .map(|&kind| {
                let path = cache.path(kind).to_path_buf();
                match cache.get(kind) {
                    Ok(parsed) => TemplateSummary {
                        kind,
                        path,
                        repeat_line: parsed.repeat_site().map(|site| site.line_index + 1),
                        comment_line: parsed.comment_site().map(|site| site.line_index + 1),
                        error: None,
                    },
                    Err(e) => TemplateSummary {
                        kind,
                        path,
                        repeat_line: None,
                        comment_line: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect()
    }

    /// Summarize configured items against the registered adapters
    pub fn items(loaded: &LoadedSettings, registry: &AdapterRegistry) -> Vec<ItemSummary> {
        let config = PipelineConfig::from_settings(loaded);
        loaded
            .settings
            .generators
            .iter()
            .map(|item| {
                let kinds: &[TemplateKind] = if item.create_editor_only_lookup {
                    &TemplateKind::ALL
                } else {
                    &[TemplateKind::Runtime]
                };
                ItemSummary {
                    logic_id: item.logic_id.clone(),
                    is_active: item.is_active,
                    adapter_registered: registry.contains(&item.logic_id),
                    outputs: kinds.iter().map(|&kind| config.output_path(item, kind)).collect(),
                }
            })
            .collect()
    }
}

fn describe_line(line: Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}", line),
        None => "missing".to_string(),
    }
}

#[async_trait]
impl Command for InspectCommand {
    async fn execute(&self) -> CliResult<()> {
        let loaded = ConfigLoader::load(&self.config_path)?;
        let registry = AdapterRegistry::discover();
        let style = OutputStyle::default();

        println!("{}", style.section("Settings"));
        println!("{}", style.key_value("file", &loaded.path.display().to_string()));
        println!("{}", style.key_value("data root", &loaded.data_root().display().to_string()));
        let watching = loaded
            .watch_path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string());
        println!("{}", style.key_value("watch", &watching));

        println!("{}", style.section("Templates"));
        let templates = Self::templates(&loaded);
        for template in &templates {
            println!(
                "{}",
                style.key_value(
                    &template.kind.to_string(),
                    &style.code(&template.path.display().to_string())
                )
            );
            match &template.error {
                Some(error) => println!("    {}", style.error(error)),
                None => {
                    let repeat = describe_line(template.repeat_line);
                    if template.repeat_line.is_some() {
                        println!("    {}", style.success(&format!("repeat marker: {}", repeat)));
                    } else {
                        println!("    {}", style.warning(&format!("repeat marker: {}", repeat)));
                    }
                    println!(
                        "    {}",
                        style.info(&format!(
                            "comment marker: {}",
                            describe_line(template.comment_line)
                        ))
                    );
                }
            }
        }

        println!("{}", style.section("Generators"));
        for item in Self::items(&loaded, &registry) {
            let mut status = Vec::new();
            if !item.is_active {
                status.push("inactive");
            }
            if !item.adapter_registered {
                status.push("no adapter");
            }
            let label = if status.is_empty() {
                item.logic_id.clone()
            } else {
                format!("{} ({})", item.logic_id, status.join(", "))
            };
            println!("{}", style.list_item(&label));
            for output in &item.outputs {
                println!("      {}", style.code(&output.display().to_string()));
            }
        }

        let unreadable = templates.iter().filter(|t| t.error.is_some()).count();
        if unreadable > 0 {
            return Err(CliError::Config(format!(
                "{} template(s) could not be read",
                unreadable
            )));
        }
        Ok(())
    }
}
