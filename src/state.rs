use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::LlmClient;
use crate::session::SessionRegistry;

/// Generation parameters (admins can modify at runtime).
#[derive(Debug, Clone, Copy)]
pub struct ForgeConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 8192,
        }
    }
}

pub struct AppState {
    pub llm: Arc<LlmClient>,
    pub sessions: Arc<SessionRegistry>,
    pub admin_ids: HashSet<u64>,
    pub config: Arc<RwLock<ForgeConfig>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
