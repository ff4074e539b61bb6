use crate::state::Context;

/// Configure generation parameters (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "temperature | max_tokens"] param: Option<String>,
    #[description = "New value"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        // Show current config
        (None, _) => {
            let config = *ctx.data().config.read().await;
            ctx.say(format!(
                "**Forge Configuration:**\n\
                 `model`: {}\n\
                 `temperature`: {}\n\
                 `max_tokens`: {}",
                ctx.data().llm.model(),
                config.temperature,
                config.max_tokens
            ))
            .await?;
        }
        // Set a parameter
        (Some(key), Some(val)) => {
            let mut config = ctx.data().config.write().await;
            let reply = match key {
                "temperature" => match val.parse::<f32>() {
                    Ok(t) if (0.0..=2.0).contains(&t) => {
                        config.temperature = t;
                        format!("`temperature` set to {}", t)
                    }
                    _ => "`temperature` must be a number between 0 and 2".to_string(),
                },
                "max_tokens" => match val.parse::<u32>() {
                    Ok(n) if n > 0 => {
                        config.max_tokens = n;
                        format!("`max_tokens` set to {}", n)
                    }
                    _ => "`max_tokens` must be a positive integer".to_string(),
                },
                _ => format!(
                    "Unknown param `{}`. Valid: `temperature`, `max_tokens`",
                    key
                ),
            };
            drop(config);
            ctx.say(reply).await?;
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/forge config temperature 0.7`")
                .await?;
        }
    }

    Ok(())
}
