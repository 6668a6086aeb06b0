// Regenerate whenever the watched data file changes

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use constgen_generation::{
    AdapterRegistry, ChangeWatcher, GenerationPipeline, LogRefresh, NotifyBackend, PipelineConfig,
    WatchLoop,
};
use constgen_storage::{ConfigLoader, LoadedSettings};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use super::Command;
use crate::error::{CliError, CliResult};
use crate::output;

/// A watch loop ready to run, plus the handle that re-targets it
pub struct WatchSetup {
    pub watch_loop: WatchLoop<NotifyBackend>,
    /// Watched path at startup
    pub path: PathBuf,
    /// Publishes a new watched path; the loop re-arms on its next due tick
    pub path_tx: watch::Sender<Option<PathBuf>>,
    /// Interval between two settings reloads
    pub tick_rate: Duration,
}

/// Run the change watcher until Ctrl-C
pub struct WatchCommand {
    pub config_path: PathBuf,
}

impl WatchCommand {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Build the watch loop from loaded settings
    pub fn build_loop(loaded: &LoadedSettings) -> CliResult<WatchSetup> {
        let watch_settings = &loaded.settings.watch;
        let path = loaded.watch_path().ok_or_else(|| {
            CliError::Config("watch.path is not set, nothing to watch".to_string())
        })?;

        let tick_rate = Duration::try_from_secs_f64(watch_settings.tick_rate_secs).map_err(|e| {
            CliError::Config(format!(
                "watch.tick_rate_secs {} is not a valid duration: {}",
                watch_settings.tick_rate_secs, e
            ))
        })?;
        let filter = (!watch_settings.logic_ids.is_empty()).then(|| watch_settings.logic_ids.clone());

        let pipeline = GenerationPipeline::new(
            PipelineConfig::from_settings(loaded),
            AdapterRegistry::discover(),
        )
        .with_refresh(Arc::new(LogRefresh));

        let (path_tx, path_rx) = watch::channel(Some(path.clone()));
        let watch_loop = WatchLoop::new(
            ChangeWatcher::new(NotifyBackend::new(), tick_rate),
            pipeline,
            loaded.settings.generators.clone(),
            path_rx,
        )
        .with_filter(filter)
        .with_min_tick(Duration::from_millis(watch_settings.min_tick_ms));

        Ok(WatchSetup {
            watch_loop,
            path,
            path_tx,
            tick_rate,
        })
    }

    /// Re-read the settings file and publish its watch path if it moved
    ///
    /// Returns whether a new path was published. Clearing `watch.path`
    /// publishes `None`, which stops watching until a path is set again.
    pub fn reload_watch_path(
        config_path: &Path,
        path_tx: &watch::Sender<Option<PathBuf>>,
    ) -> CliResult<bool> {
        let path = ConfigLoader::load(config_path)?.watch_path();
        Ok(path_tx.send_if_modified(|current| {
            if *current == path {
                return false;
            }
            *current = path;
            true
        }))
    }
}

#[async_trait]
impl Command for WatchCommand {
    async fn execute(&self) -> CliResult<()> {
        let loaded = ConfigLoader::load(&self.config_path)?;
        let WatchSetup {
            watch_loop,
            path,
            path_tx,
            tick_rate,
        } = Self::build_loop(&loaded)?;

        let config_path = self.config_path.clone();
        let reload = tokio::spawn(async move {
            let mut interval = time::interval(tick_rate);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                interval.tick().await;
                match WatchCommand::reload_watch_path(&config_path, &path_tx) {
                    Ok(true) => {
                        let current = path_tx.borrow().clone();
                        info!(path = ?current, "Watch path changed in settings");
                    }
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Failed to reload settings, keeping watch path"),
                }
            }
        });

        output::print_info(&format!(
            "Watching {} (press Ctrl-C to stop)",
            path.display()
        ));

        watch_loop
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
            })
            .await?;
        reload.abort();

        output::print_info("Stopped watching");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use constgen_storage::Settings;
    use tempfile::TempDir;

    use super::*;

    fn loaded(settings: Settings) -> LoadedSettings {
        LoadedSettings {
            settings,
            base_dir: PathBuf::from("/project"),
            path: PathBuf::from("/project/constgen.yaml"),
        }
    }

    #[test]
    fn test_watch_requires_path() {
        let err = WatchCommand::build_loop(&loaded(Settings::default())).err();
        assert!(matches!(err, Some(CliError::Config(_))));
    }

    #[test]
    fn test_watch_path_resolves_against_data_root() {
        let mut settings = Settings::default();
        settings.data_root = PathBuf::from("Assets");
        settings.watch.path = Some(PathBuf::from("loca.json"));

        let setup = WatchCommand::build_loop(&loaded(settings)).unwrap();
        assert_eq!(setup.path, PathBuf::from("/project/Assets/loca.json"));
        assert_eq!(setup.tick_rate, Duration::from_secs(3));
        assert_eq!(setup.watch_loop.watcher().last_watched_path(), None);
    }

    #[test]
    fn test_reload_publishes_edited_watch_path() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("constgen.yaml");
        fs::write(&config, "watch:\n  path: a.json\n").unwrap();
        let setup = WatchCommand::build_loop(&ConfigLoader::load(&config).unwrap()).unwrap();
        let path_rx = setup.path_tx.subscribe();

        assert!(!WatchCommand::reload_watch_path(&config, &setup.path_tx).unwrap());

        fs::write(&config, "watch:\n  path: b.json\n").unwrap();
        assert!(WatchCommand::reload_watch_path(&config, &setup.path_tx).unwrap());
        assert_eq!(*path_rx.borrow(), Some(dir.path().join("b.json")));
        assert!(!WatchCommand::reload_watch_path(&config, &setup.path_tx).unwrap());
    }

    #[test]
    fn test_reload_keeps_path_on_broken_settings() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("constgen.yaml");
        fs::write(&config, "watch:\n  path: a.json\n").unwrap();
        let setup = WatchCommand::build_loop(&ConfigLoader::load(&config).unwrap()).unwrap();

        fs::write(&config, "watch: [not, a, map\n").unwrap();
        assert!(WatchCommand::reload_watch_path(&config, &setup.path_tx).is_err());
        assert_eq!(*setup.path_tx.borrow(), Some(dir.path().join("a.json")));
    }
}
