pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::session::{SessionContext, SessionGuard, TerminalNavigator};

#[derive(Parser)]
#[command(name = "finpal")]
#[command(about = "finpal CLI - budget, dashboard and chat history from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Store or clear the session token")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Configure and check the API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Budget and expense operations")]
    Budget {
        #[command(subcommand)]
        cmd: commands::budget::BudgetCommands,
    },

    #[command(about = "Show the dashboard summary")]
    Dashboard,

    #[command(about = "Look up badges by name")]
    Badges {
        #[arg(help = "Badge names (none sends an empty list)")]
        names: Vec<String>,
    },

    #[command(about = "List learning modules")]
    Modules,

    #[command(about = "Chat history")]
    Chat {
        #[command(subcommand)]
        cmd: commands::chat::ChatCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs, built once per invocation
pub struct CliContext {
    pub session: SessionContext,
    pub output: OutputFormat,
    pub api_url: String,
}

impl CliContext {
    pub fn load(output: OutputFormat) -> anyhow::Result<Self> {
        let store = config::token_store()?;
        let session = SessionContext::load(Arc::new(store))?;
        let api_url = config::load_cli_config()?.resolved_api_url();

        Ok(Self {
            session,
            output,
            api_url,
        })
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let timeout = Duration::from_secs(crate::config::config().api.request_timeout_secs);
        Ok(ApiClient::new(&self.api_url, timeout, self.session.clone())?)
    }

    /// Run the session guard for a protected command. `false` means the
    /// command must render nothing; the login hint has already been shown.
    pub async fn authorize(&self) -> anyhow::Result<bool> {
        let mut guard = SessionGuard::with_redirect(crate::config::config().api.login_path.as_str());
        let state = guard.run(&self.session, &TerminalNavigator::default()).await?;
        Ok(state.can_render())
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::load(OutputFormat::from_cli(&cli))?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Server { cmd } => commands::server::handle(cmd, &ctx).await,
        Commands::Budget { cmd } => commands::budget::handle(cmd, &ctx).await,
        Commands::Dashboard => commands::user::dashboard(&ctx).await,
        Commands::Badges { names } => commands::user::badges(names, &ctx).await,
        Commands::Modules => commands::user::modules(&ctx).await,
        Commands::Chat { cmd } => commands::chat::handle(cmd, &ctx).await,
    }
}
