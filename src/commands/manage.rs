use tracing::info;

use crate::profiles::{self, PROFILES};
use crate::state::Context;

#[derive(Debug, poise::ChoiceParameter)]
pub enum KeyAction {
    Set,
    Clear,
    Status,
}

/// Show the active AI profile, or switch to another
#[poise::command(slash_command, guild_only)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Profile name"]
    #[autocomplete = "autocomplete_profile"]
    name: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();

    let Some(name) = name else {
        let current = ctx
            .data()
            .sessions
            .with(user_id, |session, _| session.profile)
            .await;
        ctx.say(format!(
            "**{}** ({})\n{}\n*Specialization:* {}\n*Tone:* {}",
            current.name,
            current.archetype,
            current.persona,
            current.specialization,
            current.tone.join(", ")
        ))
        .await?;
        return Ok(());
    };

    let Some(profile) = profiles::find(&name) else {
        let names: Vec<_> = PROFILES.iter().map(|p| p.name).collect();
        ctx.say(format!("Unknown profile `{}`. Available: {}", name, names.join(", ")))
            .await?;
        return Ok(());
    };

    ctx.data()
        .sessions
        .with(user_id, |session, _| session.profile = profile)
        .await;
    info!(user = ctx.author().name, profile = profile.name, "profile selected");
    ctx.say(format!("Profile set to **{}**.", profile.name)).await?;
    Ok(())
}

async fn autocomplete_profile(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    PROFILES
        .iter()
        .map(|p| p.name.to_string())
        .filter(|n| n.to_lowercase().contains(&partial))
        .collect()
}

/// Set, clear or check your AI service API key (only you see the reply)
#[poise::command(slash_command, guild_only)]
pub async fn key(
    ctx: Context<'_>,
    #[description = "set | clear | status"] action: KeyAction,
    #[description = "API key (for set)"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let shared = ctx.data().llm.shared_api_key().is_some();

    let reply = ctx
        .data()
        .sessions
        .with(user_id, |session, _| match action {
            KeyAction::Set => match value.as_deref() {
                Some(v) if session.set_api_key(v) => "API key saved for this session.".to_string(),
                _ => "Provide a non-empty `value`.".to_string(),
            },
            KeyAction::Clear => {
                session.clear_api_key();
                "API key cleared.".to_string()
            }
            KeyAction::Status => match (session.has_api_key(), shared) {
                (true, _) => "Your API key is set.".to_string(),
                (false, true) => "No personal key; the shared key will be used.".to_string(),
                (false, false) => "API key is not set.".to_string(),
            },
        })
        .await;

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}
