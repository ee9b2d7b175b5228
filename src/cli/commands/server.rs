use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_cli_config, ping_server, save_cli_config, ServerStatus};
use crate::cli::utils::{output_error, output_success};
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Set the API base URL")]
    Set {
        #[arg(help = "Base URL, e.g. https://api.example.com")]
        url: String,
    },

    #[command(about = "Show the API base URL in use")]
    Show,

    #[command(about = "Check the server health endpoint")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;
            let mut config = load_cli_config()?;
            config.api_url = Some(parsed.as_str().trim_end_matches('/').to_string());
            save_cli_config(&config)?;
            output_success(
                &ctx.output,
                &format!("API server set to {}", config.resolved_api_url()),
                Some(json!({ "api_url": config.resolved_api_url() })),
            )
        }
        ServerCommands::Show => output_success(
            &ctx.output,
            &format!("API server: {}", ctx.api_url),
            Some(json!({ "api_url": ctx.api_url })),
        ),
        ServerCommands::Ping => {
            let status = ping_server(&ctx.api_url).await;
            let mut config = load_cli_config()?;
            config.update_ping(status);
            save_cli_config(&config)?;

            match status {
                ServerStatus::Up => output_success(
                    &ctx.output,
                    &format!("{} is up", ctx.api_url),
                    Some(json!({ "status": "up" })),
                ),
                ServerStatus::Down => {
                    output_error(&ctx.output, &format!("{} is not responding", ctx.api_url), Some("SERVER_DOWN"))?;
                    anyhow::bail!("server unreachable")
                }
            }
        }
    }
}
