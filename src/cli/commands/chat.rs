use clap::Subcommand;

use crate::cli::utils::output_payload;
use crate::cli::{CliContext, OutputFormat};
use crate::models::chat::{ChatDocument, NewChatDocument, NewTurn, Role};
use crate::services::ChatService;

#[derive(Subcommand)]
pub enum ChatCommands {
    #[command(about = "List chat sessions")]
    List,

    #[command(about = "Show one chat session")]
    Show {
        #[arg(help = "Session ID")]
        session_id: String,
    },

    #[command(about = "Start a new chat session")]
    Start {
        #[arg(help = "Session ID")]
        session_id: String,
        #[arg(long, help = "budgeting, investing, saving, debt or general")]
        topic: Option<String>,
        #[arg(long, help = "Opening message")]
        message: Option<String>,
    },

    #[command(about = "Append a message to a chat session")]
    Say {
        #[arg(help = "Session ID")]
        session_id: String,
        #[arg(help = "Message text")]
        message: String,
        #[arg(long, default_value = "user", help = "user or assistant")]
        role: String,
    },
}

pub async fn handle(cmd: ChatCommands, ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.authorize().await? {
        return Ok(());
    }

    let service = ChatService::new(ctx.client()?);

    match cmd {
        ChatCommands::List => {
            let sessions = service.list_sessions().await?;
            match ctx.output {
                OutputFormat::Json => output_payload(&ctx.output, "Chats", &serde_json::to_value(&sessions)?),
                OutputFormat::Text => {
                    if sessions.is_empty() {
                        println!("No chat sessions");
                    }
                    for doc in &sessions {
                        println!(
                            "{}  [{}]  {} turns  updated {}",
                            doc.session_id,
                            doc.topic,
                            doc.conversation.len(),
                            doc.updated_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                    Ok(())
                }
            }
        }
        ChatCommands::Show { session_id } => {
            let doc = service.get_session(&session_id).await?;
            print_document(ctx, &doc)
        }
        ChatCommands::Start {
            session_id,
            topic,
            message,
        } => {
            let draft = NewChatDocument {
                session_id: Some(session_id),
                conversation: Some(message.map(|m| vec![NewTurn::new(Role::User, m)]).unwrap_or_default()),
                topic,
            };
            let doc = service.start_session(&draft).await?;
            print_document(ctx, &doc)
        }
        ChatCommands::Say {
            session_id,
            message,
            role,
        } => {
            // Role is validated by the server so the CLI reports the same error an app would
            let turn = NewTurn {
                role: Some(role),
                message: Some(message),
                ..Default::default()
            };
            let doc = service.append_turn(&session_id, &turn).await?;
            print_document(ctx, &doc)
        }
    }
}

fn print_document(ctx: &CliContext, doc: &ChatDocument) -> anyhow::Result<()> {
    match ctx.output {
        OutputFormat::Json => output_payload(&ctx.output, "Chat", &serde_json::to_value(doc)?),
        OutputFormat::Text => {
            println!("Session {} [{}]", doc.session_id, doc.topic);
            for turn in &doc.conversation {
                println!("{} {:>9}: {}", turn.timestamp.format("%H:%M:%S"), turn.role.as_str(), turn.message);
            }
            Ok(())
        }
    }
}
