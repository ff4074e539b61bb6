use tracing::{info, warn};

use super::send_chunked;
use crate::chat;
use crate::files::export::archive_path;
use crate::state::Context;

/// Send a prompt (with your staging context) to the AI
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "What should the AI build or change?"] prompt: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let user_id = ctx.author().id.get();
    info!(user = ctx.author().name, prompt_len = prompt.len(), "ask started");

    let absorbed = match chat::ask(ctx.data(), user_id, &prompt).await {
        Ok(absorbed) => absorbed,
        Err(e) => {
            warn!(user = ctx.author().name, error = %e, "ask failed");
            ctx.say(format!("Error: {:#}", e)).await?;
            return Ok(());
        }
    };

    let mut summary = format!(
        "Extracted **{}** file(s): {} new, {} already stored.\n",
        absorbed.parsed,
        absorbed.inserted.len(),
        absorbed.duplicates()
    );
    for record in &absorbed.inserted {
        summary.push_str(&format!("- `{}`\n", archive_path(record)));
    }
    ctx.say(summary).await?;

    if !absorbed.reply.trim().is_empty() {
        send_chunked(&ctx, &absorbed.reply).await?;
    }
    Ok(())
}

/// Save the last AI reply into your workspace as a new file
#[poise::command(slash_command, guild_only)]
pub async fn keep(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let path = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, clock| {
            let reply = session.last_reply.clone()?;
            Some(session.workspace.keep_response(&reply, clock).path.clone())
        })
        .await;

    match path {
        Some(path) => ctx.say(format!("Saved reply as `{}`.", path)).await?,
        None => ctx.say("No reply yet. Use `/forge ask` first.").await?,
    };
    Ok(())
}
