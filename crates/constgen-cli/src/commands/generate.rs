// Run the generation pipeline once

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use constgen_generation::{
    AdapterRegistry, GenerationPipeline, ItemOutcome, LogRefresh, PipelineConfig, RunOutcome,
    RunReport,
};
use constgen_storage::ConfigLoader;
use tracing::warn;

use super::Command;
use crate::error::{CliError, CliResult};
use crate::logging::VerbosityLevel;
use crate::output::{self, OutputStyle};

/// Generate constants files for all or selected generator items
pub struct GenerateCommand {
    pub config_path: PathBuf,
    pub only: Vec<String>,
    pub dry_run: bool,
}

impl GenerateCommand {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            only: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Load settings and run the pipeline, returning the run report
    pub async fn generate(&self) -> CliResult<RunReport> {
        let loaded = ConfigLoader::load(&self.config_path)?;

        let filter = (!self.only.is_empty()).then(|| self.only.clone());
        if let Some(ids) = &filter {
            for id in ids {
                if !loaded.settings.generators.iter().any(|item| item.logic_id == *id) {
                    warn!(logic_id = %id, "No generator item uses this logic ID");
                }
            }
        }

        let config = PipelineConfig::from_settings(&loaded).with_dry_run(self.dry_run);
        let pipeline = GenerationPipeline::new(config, AdapterRegistry::discover())
            .with_refresh(Arc::new(LogRefresh));

        match pipeline.run(loaded.settings.generators.clone(), filter).await? {
            RunOutcome::Completed(report) => Ok(report),
            RunOutcome::Skipped => Err(CliError::Internal(
                "generation was already in progress".to_string(),
            )),
        }
    }

    fn print_report(&self, report: &RunReport) {
        let style = OutputStyle::default();
        let details = VerbosityLevel::Verbose.should_output();

        for item in &report.items {
            match &item.outcome {
                ItemOutcome::Written { files } => {
                    output::print_success(&format!(
                        "{}: {} entries, {} files",
                        item.logic_id,
                        item.entries,
                        files.len()
                    ));
                    if details {
                        for file in files {
                            println!(
                                "{}",
                                style.key_value(
                                    &file.kind.to_string(),
                                    &style.code(&file.path.display().to_string())
                                )
                            );
                        }
                    }
                }
                ItemOutcome::Skipped { reason } => {
                    output::print_warning(&format!("{}: skipped ({})", item.logic_id, reason));
                }
                ItemOutcome::Failed { error } => {
                    output::print_error(&format!("{}: {}", item.logic_id, error));
                }
            }
        }

        for missing in &report.missing_markers {
            output::print_warning(&format!(
                "{} template {} has no repeat-line marker, no data was emitted for {}",
                missing.kind,
                missing.template_path.display(),
                missing.logic_id
            ));
        }

        let files = report.files().count();
        if report.dry_run {
            output::print_info(&format!(
                "Dry run: {} files computed, nothing written ({} ms)",
                files,
                report.duration.as_millis()
            ));
        } else {
            output::print_info(&format!(
                "Wrote {} files ({} ms)",
                report.files_written(),
                report.duration.as_millis()
            ));
        }
    }
}

#[async_trait]
impl Command for GenerateCommand {
    async fn execute(&self) -> CliResult<()> {
        let report = self.generate().await?;
        self.print_report(&report);

        let failed = report.failures().count();
        if failed > 0 {
            return Err(CliError::RunFailed {
                failed,
                total: report.items.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_command_builder() {
        let command = GenerateCommand::new("settings.yaml")
            .with_only(vec!["loca-json".to_string()])
            .with_dry_run(true);
        assert_eq!(command.config_path, PathBuf::from("settings.yaml"));
        assert_eq!(command.only, vec!["loca-json".to_string()]);
        assert!(command.dry_run);
    }

    #[tokio::test]
    async fn test_generate_missing_settings_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let command = GenerateCommand::new(dir.path().join("missing.yaml"));
        let err = command.generate().await.unwrap_err();
        assert!(matches!(err, CliError::Storage(_)));
    }
}
