use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::CliContext;
use crate::session::SessionToken;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store a session token obtained from the login page")]
    Login {
        #[arg(long, help = "Session token")]
        token: String,
    },

    #[command(about = "Clear the stored session token")]
    Logout,

    #[command(about = "Show whether a session token is stored")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { token } => {
            let token = SessionToken::parse(&token).ok_or_else(|| anyhow::anyhow!("Token must not be empty"))?;
            ctx.session.login(token)?;
            output_success(&ctx.output, "Session token stored", Some(json!({ "authenticated": true })))
        }
        AuthCommands::Logout => {
            ctx.session.logout()?;
            output_success(&ctx.output, "Logged out", Some(json!({ "authenticated": false })))
        }
        AuthCommands::Status => {
            // Presence only; the token is never verified client-side
            let authenticated = ctx.session.has_token();
            let message = if authenticated {
                "Session token present"
            } else {
                "No session token stored"
            };
            output_success(&ctx.output, message, Some(json!({ "authenticated": authenticated })))
        }
    }
}
