use anyhow::Result;
use tracing::info;

use crate::session::Absorbed;
use crate::state::AppState;

/// Send a prompt for one user and fold the reply into their session.
///
/// The session lock is held only while composing the request and while
/// absorbing the reply, never across the network call. The session's busy
/// flag keeps a second request from starting in between.
pub async fn ask(state: &AppState, user_id: u64, prompt: &str) -> Result<Absorbed> {
    let shared_key = state.llm.shared_api_key();
    let pending = state
        .sessions
        .with(user_id, |session, clock| session.begin_request(prompt, shared_key, clock))
        .await?;

    let config = *state.config.read().await;
    info!(
        user_id,
        profile = pending.profile.name,
        prompt_len = pending.full_prompt.len(),
        "sending prompt"
    );

    let outcome = state
        .llm
        .complete(
            pending.profile.system_instruction,
            &pending.full_prompt,
            &pending.api_key,
            &config,
        )
        .await;

    state
        .sessions
        .with(user_id, |session, clock| session.complete_request(pending, outcome, clock))
        .await
}
