mod ask;
mod config;
mod files;
mod history;
mod manage;
mod staging;
mod workspace;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use crate::state::Context;

/// Forge - turn AI replies into versioned project files
#[poise::command(
    slash_command,
    subcommands(
        "ask::ask",
        "ask::keep",
        "files::files",
        "files::download",
        "files::export",
        "files::import",
        "files::clear",
        "staging::stage",
        "staging::attach",
        "staging::context",
        "workspace::workspace",
        "workspace::new",
        "workspace::edit",
        "history::history",
        "manage::profile",
        "manage::key",
        "config::config"
    )
)]
pub async fn forge(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a message in Discord-safe chunks (max 1990 chars), splitting on
/// line or word boundaries where possible.
pub(crate) async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in chunks(text, 1990) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Download an uploaded attachment as text.
pub(crate) async fn fetch_attachment(upload: &serenity::Attachment) -> Result<String, anyhow::Error> {
    let body = reqwest::get(&upload.url)
        .await
        .context("Failed to fetch attachment")?
        .bytes()
        .await
        .context("Failed to read attachment body")?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn chunks(text: &str, max: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        out.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    out
}

/// Autocomplete `project/file@version` specs from the caller's generated files.
pub(crate) async fn autocomplete_record(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    ctx.data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            session
                .files
                .records()
                .iter()
                .map(|r| format!("{}/{}@{}", r.project_name, r.file_name, r.version))
                .filter(|spec| spec.to_lowercase().contains(&partial))
                .take(25)
                .collect()
        })
        .await
}

/// Autocomplete workspace paths.
pub(crate) async fn autocomplete_path(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    ctx.data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            session
                .workspace
                .files()
                .iter()
                .map(|f| f.path.clone())
                .filter(|p| p.to_lowercase().contains(&partial))
                .take(25)
                .collect()
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_split_on_newlines() {
        let text = format!("{}\n{}", "a".repeat(10), "b".repeat(10));
        let parts = chunks(&text, 15);
        assert_eq!(parts, vec![&text[..11], &text[11..]]);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_chunks_respect_char_boundaries() {
        let text = "é".repeat(10);
        let parts = chunks(&text, 5);
        assert!(parts.iter().all(|p| p.len() <= 5));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_chunks_empty() {
        assert!(chunks("", 10).is_empty());
    }
}
