// Command handlers for the constgen CLI

pub mod adapters;
pub mod generate;
pub mod init;
pub mod inspect;
pub mod watch;

pub use adapters::AdaptersCommand;
pub use generate::GenerateCommand;
pub use init::InitCommand;
pub use inspect::InspectCommand;
pub use watch::WatchCommand;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}
