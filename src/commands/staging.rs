use poise::serenity_prelude as serenity;
use tracing::info;

use super::{autocomplete_path, autocomplete_record, fetch_attachment, send_chunked};
use crate::state::Context;

#[derive(Debug, poise::ChoiceParameter)]
pub enum ContextAction {
    Show,
    Clear,
}

/// Put a generated file into your staging context so the AI can update it
#[poise::command(slash_command, guild_only)]
pub async fn stage(
    ctx: Context<'_>,
    #[description = "project/file@version (version optional = latest)"]
    #[autocomplete = "autocomplete_record"]
    file: String,
) -> Result<(), anyhow::Error> {
    let staged = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let record = session.files.resolve(&file)?.clone();
            session.staging.stage_record(&record);
            Some(format!("{}/{}@{}", record.project_name, record.file_name, record.version))
        })
        .await;

    match staged {
        Some(label) => {
            ctx.say(format!(
                "Staged `{}`. Describe the change with `/forge ask`.",
                label
            ))
            .await?
        }
        None => ctx.say(format!("No generated file matches `{}`.", file)).await?,
    };
    Ok(())
}

/// Append a workspace file or an uploaded text file to your staging context
#[poise::command(slash_command, guild_only)]
pub async fn attach(
    ctx: Context<'_>,
    #[description = "Workspace path"]
    #[autocomplete = "autocomplete_path"]
    path: Option<String>,
    #[description = "Text file to upload"] upload: Option<serenity::Attachment>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();

    if let Some(upload) = upload {
        ctx.defer().await?;
        let text = fetch_attachment(&upload).await?;
        ctx.data()
            .sessions
            .with(user_id, |session, _| session.staging.attach_upload(&upload.filename, &text))
            .await;
        info!(user = ctx.author().name, file = %upload.filename, size = text.len(), "upload attached");
        ctx.say(format!("Attached upload `{}` to the context.", upload.filename))
            .await?;
        return Ok(());
    }

    let Some(path) = path else {
        ctx.say("Give a workspace `path` or an `upload`.").await?;
        return Ok(());
    };

    let attached = ctx
        .data()
        .sessions
        .with(user_id, |session, _| {
            let file = session.workspace.get(&path)?.clone();
            session.staging.attach_file(&file);
            Some(())
        })
        .await;

    match attached {
        Some(()) => ctx.say(format!("Attached `{}` to the context.", path)).await?,
        None => ctx.say(format!("No workspace file at `{}`.", path)).await?,
    };
    Ok(())
}

/// Show or clear your staging context
#[poise::command(slash_command, guild_only)]
pub async fn context(
    ctx: Context<'_>,
    #[description = "show (default) or clear"] action: Option<ContextAction>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    match action.unwrap_or(ContextAction::Show) {
        ContextAction::Show => {
            let text = ctx
                .data()
                .sessions
                .with(user_id, |session, _| {
                    (!session.staging.is_empty()).then(|| session.staging.as_str().to_string())
                })
                .await;
            match text {
                Some(text) => send_chunked(&ctx, &text).await?,
                None => {
                    ctx.say("Staging context is empty.").await?;
                }
            }
        }
        ContextAction::Clear => {
            ctx.data()
                .sessions
                .with(user_id, |session, _| session.staging.clear())
                .await;
            ctx.say("Staging context cleared.").await?;
        }
    }
    Ok(())
}
