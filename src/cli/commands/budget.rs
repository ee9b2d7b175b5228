use clap::Subcommand;

use crate::cli::utils::output_payload;
use crate::cli::CliContext;
use crate::services::BudgetService;

#[derive(Subcommand)]
pub enum BudgetCommands {
    #[command(about = "Show the full budget snapshot")]
    Show,

    #[command(about = "Record a new expense")]
    Add {
        #[arg(help = "Budget category")]
        category: String,
        #[arg(help = "What the money was spent on")]
        description: String,
        #[arg(help = "Amount spent", allow_negative_numbers = true)]
        amount: f64,
    },

    #[command(about = "Delete an expense")]
    Delete {
        #[arg(help = "Transaction ID")]
        transaction_id: String,
        #[arg(help = "Category the expense was filed under (any casing)")]
        category: String,
    },
}

pub async fn handle(cmd: BudgetCommands, ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.authorize().await? {
        return Ok(());
    }

    let service = BudgetService::new(ctx.client()?);

    match cmd {
        BudgetCommands::Show => {
            let budget = service.get_budget().await?;
            output_payload(&ctx.output, "Budget", &budget)
        }
        BudgetCommands::Add {
            category,
            description,
            amount,
        } => {
            let updated = service.update_transactions(&category, &description, amount).await?;
            output_payload(&ctx.output, &format!("Recorded {:.2} under {}", amount, category), &updated)
        }
        BudgetCommands::Delete {
            transaction_id,
            category,
        } => {
            let confirmation = service.delete_transaction(&transaction_id, &category).await?;
            output_payload(&ctx.output, &format!("Deleted transaction {}", transaction_id), &confirmation)
        }
    }
}
