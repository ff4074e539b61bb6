use super::send_chunked;
use crate::state::Context;

/// Review past prompts and replies
#[poise::command(slash_command, guild_only)]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Only this profile"] profile: Option<String>,
    #[description = "Show entry N in full (1 = newest)"] entry: Option<u32>,
) -> Result<(), anyhow::Error> {
    let output = ctx
        .data()
        .sessions
        .with(ctx.author().id.get(), |session, _| {
            let history = &session.history;
            if history.is_empty() {
                return "No interactions yet.".to_string();
            }

            if let Some(n) = entry {
                return match history.nth(profile.as_deref(), n) {
                    Some(i) => format!(
                        "**{}** · {}\n**Prompt:**\n{}\n\n**Response:**\n{}",
                        i.profile_name, i.timestamp, i.prompt, i.response
                    ),
                    None => format!("No entry {}.", n),
                };
            }

            let matching: Vec<_> = history.filtered(profile.as_deref()).collect();
            let mut output = format!(
                "**History** ({} of {}; profiles: {})\n",
                matching.len(),
                history.entries().len(),
                history.profile_names().join(", ")
            );
            for (idx, i) in matching.iter().enumerate().take(20) {
                let preview: String = i.prompt.lines().last().unwrap_or("").chars().take(80).collect();
                output.push_str(&format!(
                    "{}. `{}` {} - {}\n",
                    idx + 1,
                    i.timestamp,
                    i.profile_name,
                    preview
                ));
            }
            output
        })
        .await;

    send_chunked(&ctx, &output).await
}
