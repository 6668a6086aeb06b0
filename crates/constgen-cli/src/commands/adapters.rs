// List registered data-source adapters

use async_trait::async_trait;
use constgen_generation::AdapterRegistry;

use super::Command;
use crate::error::CliResult;
use crate::output::{self, OutputStyle};

/// Print every logic ID a generator item can use
pub struct AdaptersCommand;

impl AdaptersCommand {
    pub fn new() -> Self {
        Self
    }

    /// Logic IDs and descriptions in registry order
    pub fn list(registry: &AdapterRegistry) -> Vec<(String, String)> {
        registry
            .iter()
            .map(|adapter| (adapter.logic_id().to_string(), adapter.description().to_string()))
            .collect()
    }
}

impl Default for AdaptersCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for AdaptersCommand {
    async fn execute(&self) -> CliResult<()> {
        let adapters = Self::list(&AdapterRegistry::discover());
        if adapters.is_empty() {
            output::print_warning("No adapters registered");
            return Ok(());
        }

        let style = OutputStyle::default();
        println!("{}", style.section("Adapters"));
        for (logic_id, description) in adapters {
            if description.is_empty() {
                println!("{}", style.list_item(&style.code(&logic_id)));
            } else {
                println!(
                    "{}",
                    style.list_item(&format!("{}  {}", style.code(&logic_id), description))
                );
            }
        }
        Ok(())
    }
}
