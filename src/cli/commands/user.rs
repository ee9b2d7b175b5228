use crate::cli::utils::output_payload;
use crate::cli::CliContext;
use crate::services::UserService;

pub async fn dashboard(ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.authorize().await? {
        return Ok(());
    }

    let data = UserService::new(ctx.client()?).get_dashboard_data().await?;
    output_payload(&ctx.output, "Dashboard", &data)
}

pub async fn badges(names: Vec<String>, ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.authorize().await? {
        return Ok(());
    }

    let badges = UserService::new(ctx.client()?).get_badges(&names).await?;
    output_payload(&ctx.output, "Badges", &badges)
}

pub async fn modules(ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.authorize().await? {
        return Ok(());
    }

    let modules = UserService::new(ctx.client()?).get_modules().await?;
    output_payload(&ctx.output, "Modules", &modules)
}
