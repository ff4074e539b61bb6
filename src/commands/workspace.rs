use poise::serenity_prelude as serenity;
use tracing::info;

use super::{autocomplete_path, fetch_attachment, send_chunked};
use crate::state::Context;

/// List your workspace files, or show one
#[poise::command(slash_command, guild_only)]
pub async fn workspace(
    ctx: Context<'_>,
    #[description = "File to show"]
    #[autocomplete = "autocomplete_path"]
    path: Option<String>,
    #[description = "Only list documents/"] documents: Option<bool>,
) -> Result<(), anyhow::Error> {
    let documents = documents.unwrap_or(false);
    let output = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| match &path {
            Some(path) => session.workspace.get(path).map(|f| {
                format!("**{}** ({})\n```{}\n{}\n```", f.path, f.language, f.language, f.content)
            }),
            None if documents => {
                let docs = session.workspace.documents();
                if docs.is_empty() {
                    return Some("No documents yet. Start one with `/forge new`.".to_string());
                }
                let mut output = String::from("**Documents**\n");
                for doc in docs {
                    let title = doc.content.lines().next().unwrap_or_default();
                    output.push_str(&format!("  - `{}` {}\n", doc.path, title));
                }
                Some(output)
            }
            None => {
                let mut output = String::from("**Workspace**\n");
                for file in session.workspace.files() {
                    output.push_str(&format!(
                        "  - `{}` ({}, {} B)\n",
                        file.path,
                        file.language,
                        file.content.len()
                    ));
                }
                Some(output)
            }
        })
        .await;

    match output {
        Some(text) => send_chunked(&ctx, &text).await?,
        None => {
            ctx.say(format!(
                "No workspace file at `{}`.",
                path.as_deref().unwrap_or_default()
            ))
            .await?;
        }
    }
    Ok(())
}

/// Create a workspace file, or a new document when no path is given
#[poise::command(slash_command, guild_only)]
pub async fn new(
    ctx: Context<'_>,
    #[description = "Path, e.g. src/app.ts (empty .json files get a template)"] path: Option<String>,
    #[description = "Initial content"] content: Option<String>,
) -> Result<(), anyhow::Error> {
    let created = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let file = match path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                Some(path) => session
                    .workspace
                    .create_file(path, content.as_deref().unwrap_or_default()),
                None => session.workspace.create_document(),
            };
            (file.path.clone(), file.language.clone())
        })
        .await;

    info!(user = ctx.author().name, path = %created.0, "workspace file created");
    ctx.say(format!("Created `{}` ({}).", created.0, created.1))
        .await?;
    Ok(())
}

/// Replace a workspace file's content with text or an uploaded file
#[poise::command(slash_command, guild_only)]
pub async fn edit(
    ctx: Context<'_>,
    #[description = "Workspace path"]
    #[autocomplete = "autocomplete_path"]
    path: String,
    #[description = "New content"] text: Option<String>,
    #[description = "File whose text becomes the new content"] upload: Option<serenity::Attachment>,
) -> Result<(), anyhow::Error> {
    let content = match (text, upload) {
        (_, Some(upload)) => {
            ctx.defer().await?;
            fetch_attachment(&upload).await?
        }
        (Some(text), None) => text,
        (None, None) => {
            ctx.say("Give the new content as `text` or an `upload`.").await?;
            return Ok(());
        }
    };

    let size = content.len();
    let updated = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            session.workspace.update_content(&path, &content).is_some()
        })
        .await;

    if updated {
        info!(user = ctx.author().name, path = %path, size, "workspace file edited");
        ctx.say(format!("Updated `{}` ({} B).", path, size)).await?;
    } else {
        ctx.say(format!("No workspace file at `{}`.", path)).await?;
    }
    Ok(())
}
