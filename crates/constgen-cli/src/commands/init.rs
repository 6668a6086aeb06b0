// Write a starter settings file, templates and sample data

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use constgen_storage::{ConfigLoader, GeneratorItem, Settings};
use tracing::debug;

use super::Command;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputStyle};

const SAMPLE_SOURCE: &str = "Localization/loca.json";

const RUNTIME_TEMPLATE: &str = r#"// <auto-generated />
namespace //%namespaceRuntime
{
    public static class //%classNameKeys
    {
        /// <summary>%constComment</summary> //%1
        public const %constType %constValue = "%constKey"; //%0
    }
}
"#;

const LIST_TEMPLATE: &str = r#"// <auto-generated />
namespace //%namespace
{
    public static class //%classNameList
    {
        public static readonly string[] Names =
        {
            "%constValue", //%0
        };
    }
}
"#;

const LOOKUP_TEMPLATE: &str = r#"// <auto-generated />
using System.Collections.Generic;

namespace //%namespace
{
    public static class //%classNameLookup
    {
        public static readonly Dictionary<string, string> ByKey = new Dictionary<string, string>
        {
            { "%constKey", "%constValue" }, //%0
        };
    }
}
"#;

const SAMPLE_DATA: &str = r#"{
  "translations": {
    "menu.title": "Main Menu",
    "menu.quit": "Quit Game"
  },
  "comments": {
    "Main_Menu": "Title of the start screen"
  }
}
"#;

/// Create a starter project around a settings file
pub struct InitCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl InitCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Settings written by `init`
    pub fn starter_settings() -> Settings {
        let mut settings = Settings::default();
        settings.watch.path = Some(PathBuf::from(SAMPLE_SOURCE));

        let mut item = GeneratorItem::new("loca-json");
        item.source_path = SAMPLE_SOURCE.to_string();
        settings.generators.push(item);
        settings
    }

    /// Write the starter files, returning the paths created
    ///
    /// The settings file is only replaced with `force`. Templates and
    /// sample data are never overwritten.
    pub fn write_starter(&self) -> CliResult<Vec<PathBuf>> {
        if self.path.exists() && !self.force {
            return Err(CliError::InvalidArgument {
                message: format!(
                    "{} already exists, pass --force to overwrite it",
                    self.path.display()
                ),
            });
        }

        let base_dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&base_dir)?;

        let settings = Self::starter_settings();
        ConfigLoader::save_to_file(&settings, &self.path)?;
        let mut created = vec![self.path.clone()];

        let templates = settings.templates.resolve(&base_dir);
        let data = base_dir.join(&settings.data_root).join(SAMPLE_SOURCE);
        for (path, content) in [
            (templates.runtime, RUNTIME_TEMPLATE),
            (templates.list, LIST_TEMPLATE),
            (templates.lookup, LOOKUP_TEMPLATE),
            (data, SAMPLE_DATA),
        ] {
            if write_if_missing(&path, content)? {
                created.push(path);
            }
        }

        Ok(created)
    }
}

fn write_if_missing(path: &Path, content: &str) -> CliResult<bool> {
    if path.exists() {
        debug!(path = %path.display(), "Keeping existing file");
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self) -> CliResult<()> {
        let created = self.write_starter()?;
        let style = OutputStyle::default();

        output::print_success(&format!("Initialized {}", self.path.display()));
        for path in &created {
            println!("{}", style.list_item(&style.code(&path.display().to_string())));
        }
        println!(
            "\n{}",
            style.tip("Run 'constgen generate' to produce the constants files")
        );
        Ok(())
    }
}
