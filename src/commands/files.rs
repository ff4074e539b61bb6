use poise::serenity_prelude as serenity;
use tracing::info;

use super::{autocomplete_record, send_chunked};
use crate::files::export::{self, PROJECT_ARCHIVE_NAME};
use crate::state::Context;

/// List generated files by project and file, newest version first
#[poise::command(slash_command, guild_only)]
pub async fn files(
    ctx: Context<'_>,
    #[description = "Only show this project"] project: Option<String>,
) -> Result<(), anyhow::Error> {
    let output = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let grouped = session.files.grouped();
            let mut output = String::from("**Generated Files**\n\n");
            for (project_name, files) in &grouped {
                if project.as_deref().is_some_and(|p| p != *project_name) {
                    continue;
                }
                output.push_str(&format!("**Project: {}**\n", project_name));
                for (file_name, versions) in files {
                    let list: Vec<String> = versions
                        .iter()
                        .map(|r| format!("`{}` ({} B)", r.version, r.content.len()))
                        .collect();
                    output.push_str(&format!("  - {}: {}\n", file_name, list.join(", ")));
                }
                output.push('\n');
            }
            (session.files.is_empty(), output)
        })
        .await;

    match output {
        (true, _) => {
            ctx.say("No files generated yet. Use `/forge ask` to create some.")
                .await?;
        }
        (false, text) => send_chunked(&ctx, &text).await?,
    }
    Ok(())
}

/// Download one generated file
#[poise::command(slash_command, guild_only)]
pub async fn download(
    ctx: Context<'_>,
    #[description = "project/file@version (version optional = latest)"]
    #[autocomplete = "autocomplete_record"]
    file: String,
) -> Result<(), anyhow::Error> {
    let found = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            session.files.resolve(&file).map(|r| {
                (
                    export::versioned_file_name(r),
                    r.content.clone().into_bytes(),
                )
            })
        })
        .await;

    let Some((name, bytes)) = found else {
        ctx.say(format!("No generated file matches `{}`.", file)).await?;
        return Ok(());
    };
    // Attachment names cannot contain directories.
    let attachment_name = name.rsplit('/').next().unwrap_or(&name).to_string();

    ctx.send(
        poise::CreateReply::default()
            .content(format!("`{}`", name))
            .attachment(serenity::CreateAttachment::bytes(bytes, attachment_name)),
    )
    .await?;
    Ok(())
}

/// Download generated files (or your workspace) as a ZIP archive
#[poise::command(slash_command, guild_only)]
pub async fn export(
    ctx: Context<'_>,
    #[description = "Export the workspace tree instead of generated files"] workspace: Option<bool>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;
    let workspace = workspace.unwrap_or(false);

    let built = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            if workspace {
                let entries = session
                    .workspace
                    .files()
                    .iter()
                    .map(|f| (f.path.clone(), f.content.as_str()));
                export::write_zip(entries)
                    .map(|bytes| (bytes, session.workspace.files().len(), export::WORKSPACE_ARCHIVE_NAME))
            } else {
                export::project_zip(session.files.records())
                    .map(|bytes| (bytes, session.files.len(), PROJECT_ARCHIVE_NAME))
            }
        })
        .await;
    let (bytes, count, name) = built?;

    if count == 0 {
        ctx.say("Nothing to export yet.").await?;
        return Ok(());
    }

    info!(user = ctx.author().name, count, size = bytes.len(), name, "archive exported");
    ctx.send(
        poise::CreateReply::default()
            .content(format!("{} file(s) in `{}`", count, name))
            .attachment(serenity::CreateAttachment::bytes(bytes, name)),
    )
    .await?;
    Ok(())
}

/// Copy a generated file into your workspace under downloads/
#[poise::command(slash_command, guild_only)]
pub async fn import(
    ctx: Context<'_>,
    #[description = "project/file@version (version optional = latest)"]
    #[autocomplete = "autocomplete_record"]
    file: String,
) -> Result<(), anyhow::Error> {
    let imported = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let record = session.files.resolve(&file)?.clone();
            Some(session.workspace.import_record(&record).path.clone())
        })
        .await;

    match imported {
        Some(path) => ctx.say(format!("Imported as `{}`.", path)).await?,
        None => ctx.say(format!("No generated file matches `{}`.", file)).await?,
    };
    Ok(())
}

/// Delete every generated file in your session
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let removed = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let n = session.files.len();
            session.files.clear();
            n
        })
        .await;

    info!(user = ctx.author().name, removed, "generated files cleared");
    ctx.say(format!("Cleared {} generated file(s).", removed)).await?;
    Ok(())
}
