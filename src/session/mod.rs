pub mod history;
pub mod staging;
pub mod workspace;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::files::parser::parse_response;
use crate::files::types::FileRecord;
use crate::files::GeneratedFileStore;
use crate::profiles::{self, AiProfile};

use history::History;
use staging::StagingContext;
use workspace::Workspace;

pub const MISSING_KEY: &str = "API key not set. Use `/forge key set` first.";

/// Everything one user works with: generated files, workspace, staging
/// context, history, profile and credential.
pub struct Session {
    pub files: GeneratedFileStore,
    pub workspace: Workspace,
    pub history: History,
    pub staging: StagingContext,
    pub profile: &'static AiProfile,
    /// The last reply, kept so it can be saved into the workspace.
    pub last_reply: Option<String>,
    api_key: Option<String>,
    busy: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            files: GeneratedFileStore::new(),
            workspace: Workspace::default(),
            history: History::default(),
            staging: StagingContext::default(),
            profile: profiles::default_profile(),
            last_reply: None,
            api_key: None,
            busy: false,
        }
    }
}

/// A request that has been composed and is waiting on the AI service.
#[derive(Debug)]
pub struct PendingRequest {
    pub profile: &'static AiProfile,
    pub full_prompt: String,
    pub api_key: String,
}

/// What one AI reply contributed to the session.
#[derive(Debug)]
pub struct Absorbed {
    pub reply: String,
    pub parsed: usize,
    pub inserted: Vec<FileRecord>,
}

impl Absorbed {
    pub fn duplicates(&self) -> usize {
        self.parsed - self.inserted.len()
    }
}

impl Session {
    pub fn set_api_key(&mut self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        self.api_key = Some(key.to_string());
        true
    }

    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Compose the prompt and mark the session busy.
    ///
    /// A missing credential is recorded in history like any other failed
    /// request; an empty prompt or an in-flight request is rejected without
    /// touching history.
    pub fn begin_request(
        &mut self,
        prompt: &str,
        shared_key: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<PendingRequest> {
        if prompt.trim().is_empty() {
            bail!("Prompt is empty.");
        }
        if self.busy {
            bail!("A request is already running for this session. Wait for it to finish.");
        }

        let full_prompt = self.staging.compose(prompt);
        let Some(api_key) = self.api_key.clone().or_else(|| shared_key.map(str::to_string)) else {
            self.history.record(
                self.profile.name,
                &full_prompt,
                &format!("Error: {}", MISSING_KEY),
                clock,
            );
            bail!(MISSING_KEY);
        };

        self.busy = true;
        Ok(PendingRequest {
            profile: self.profile,
            full_prompt,
            api_key,
        })
    }

    /// Record the outcome, then parse a successful reply into the store.
    pub fn complete_request(
        &mut self,
        pending: PendingRequest,
        outcome: Result<String>,
        clock: &dyn Clock,
    ) -> Result<Absorbed> {
        self.busy = false;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(profile = pending.profile.name, error = %e, "AI request failed");
                self.history.record(
                    pending.profile.name,
                    &pending.full_prompt,
                    &format!("Error: {:#}", e),
                    clock,
                );
                return Err(e);
            }
        };

        self.history
            .record(pending.profile.name, &pending.full_prompt, &reply, clock);
        Ok(self.absorb_reply(reply, clock))
    }

    /// Parse a reply and insert every extracted file, skipping duplicates.
    pub fn absorb_reply(&mut self, reply: String, clock: &dyn Clock) -> Absorbed {
        let candidates = parse_response(&reply, clock);
        let parsed = candidates.len();
        let mut inserted = Vec::new();
        for candidate in candidates {
            if let Some(record) = self.files.insert(candidate, clock.now_millis()) {
                debug!(
                    project = %record.project_name,
                    file = %record.file_name,
                    version = %record.version,
                    "generated file stored"
                );
                inserted.push(record.clone());
            }
        }
        info!(parsed, inserted = inserted.len(), "reply absorbed");
        self.last_reply = Some(reply.clone());
        Absorbed {
            reply,
            parsed,
            inserted,
        }
    }
}

/// Per-user sessions. All mutation happens under the write lock, so inserts
/// into any one store are serialized.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<u64, Session>>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Run `f` against the user's session, creating it on first use.
    pub async fn with<R>(&self, user_id: u64, f: impl FnOnce(&mut Session, &dyn Clock) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id).or_default();
        f(session, self.clock.as_ref())
    }
}
