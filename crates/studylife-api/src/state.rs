//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API: the configured profile store, the study assistant, the CLI's notice
//! bus and (for the server) the open workspaces keyed by user id, each with
//! a notice bus of its own.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;

use studylife_core::assistant::StudyAssistant;
use studylife_core::llm::box_provider::BoxLlmProvider;
use studylife_core::llm::provider::LlmProvider;
use studylife_core::notice::bus::NoticeBus;
use studylife_core::workspace::{StudentWorkspace, WorkspaceSettings};
use studylife_infra::config::load_global_config;
use studylife_infra::filesystem::resolve_data_dir;
use studylife_infra::llm::create_provider;
use studylife_infra::secret::{FIREBASE_API_KEY, GEMINI_API_KEY, env_secret};
use studylife_infra::storage::{ProfileBackend, open_profile_store};
use studylife_types::config::GlobalConfig;
use studylife_types::identity::AuthIdentity;
use studylife_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// A workspace shared between request handlers.
pub type SharedWorkspace = Arc<Mutex<StudentWorkspace>>;

const NOTICE_CAPACITY: usize = 64;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: Arc<GlobalConfig>,
    pub store: Arc<ProfileBackend>,
    pub assistant: Arc<StudyAssistant>,
    /// Notices of the single workspace a CLI invocation opens.
    pub notices: NoticeBus,
    pub workspaces: Arc<DashMap<String, SharedWorkspace>>,
    /// Per-user notice buses of the server's open workspaces. Read without
    /// taking the workspace lock.
    pub workspace_notices: Arc<DashMap<String, NoticeBus>>,
}

impl AppState {
    /// Initialize the application state: load config, open the profile
    /// store, build the assistant.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let store = open_profile_store(&config.storage, &data_dir, env_secret(FIREBASE_API_KEY)).await?;

        let provider = match create_provider(&config.assistant, env_secret(GEMINI_API_KEY)) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(error = %e, "Assistant features disabled");
                BoxLlmProvider::new(UnconfiguredProvider)
            }
        };
        let assistant = StudyAssistant::new(
            provider,
            config.assistant.model.clone(),
            config.assistant.temperature,
        );

        Ok(Self::new(data_dir, config, store, assistant))
    }

    pub fn new(
        data_dir: PathBuf,
        config: GlobalConfig,
        store: ProfileBackend,
        assistant: StudyAssistant,
    ) -> Self {
        let notices = NoticeBus::new(NOTICE_CAPACITY, config.notices.duration_ms);
        Self {
            data_dir,
            config: Arc::new(config),
            store: Arc::new(store),
            assistant: Arc::new(assistant),
            notices,
            workspaces: Arc::new(DashMap::new()),
            workspace_notices: Arc::new(DashMap::new()),
        }
    }

    pub fn assistant_configured(&self) -> bool {
        self.assistant.provider_name() != UnconfiguredProvider::NAME
    }

    /// Open a workspace that is not shared (one CLI invocation).
    pub async fn open_workspace(&self, identity: AuthIdentity) -> StudentWorkspace {
        self.open_with_notices(identity, self.notices.clone()).await
    }

    async fn open_with_notices(&self, identity: AuthIdentity, notices: NoticeBus) -> StudentWorkspace {
        StudentWorkspace::open(
            identity,
            Arc::clone(&self.store),
            Arc::clone(&self.assistant),
            notices,
            WorkspaceSettings::from_config(&self.config),
        )
        .await
    }

    /// The user's shared workspace, opening it on first use.
    ///
    /// Each shared workspace publishes to its own notice bus, so one user's
    /// notices never reach another.
    pub async fn workspace(&self, identity: AuthIdentity) -> SharedWorkspace {
        if let Some(existing) = self.workspaces.get(&identity.id) {
            return Arc::clone(existing.value());
        }
        let user_id = identity.id.clone();
        let notices = NoticeBus::new(NOTICE_CAPACITY, self.config.notices.duration_ms);
        let opened = self.open_with_notices(identity, notices.clone()).await;

        // A concurrent open may have won; keep whichever was inserted first.
        match self.workspaces.entry(user_id) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(slot) => {
                self.workspace_notices.insert(slot.key().clone(), notices);
                Arc::clone(slot.insert(Arc::new(Mutex::new(opened))).value())
            }
        }
    }

    /// Notice bus of an open shared workspace.
    pub fn workspace_notices(&self, user_id: &str) -> Option<NoticeBus> {
        self.workspace_notices.get(user_id).map(|bus| bus.value().clone())
    }

    pub fn existing_workspace(&self, user_id: &str) -> Option<SharedWorkspace> {
        self.workspaces.get(user_id).map(|w| Arc::clone(w.value()))
    }

    /// Save pending edits, stop autosaving and forget the workspace.
    pub async fn close_workspace(&self, user_id: &str) -> bool {
        let Some((_, workspace)) = self.workspaces.remove(user_id) else {
            return false;
        };
        self.workspace_notices.remove(user_id);
        let workspace = workspace.lock().await;
        workspace.flush().await;
        workspace.close();
        tracing::info!(user_id, "Workspace closed");
        true
    }

    /// Flush and close every open workspace (server shutdown).
    pub async fn close_all(&self) {
        let user_ids: Vec<String> = self.workspaces.iter().map(|e| e.key().clone()).collect();
        for user_id in user_ids {
            self.close_workspace(&user_id).await;
        }
    }
}

/// Stands in for the generative text provider when no API key is set.
///
/// Every call fails, which the workspace turns into its usual inline
/// fallback replies.
pub struct UnconfiguredProvider;

impl UnconfiguredProvider {
    pub const NAME: &'static str = "unconfigured";
}

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::MissingApiKey(GEMINI_API_KEY.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use studylife_infra::sqlite::pool::DatabasePool;
    use studylife_infra::sqlite::profile::SqliteProfileStore;
    use studylife_types::llm::{StopReason, Usage};

    /// Replies with a fixed text to every request.
    pub struct FixedReply(pub &'static str);

    impl LlmProvider for FixedReply {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.0.to_string(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    pub async fn test_state(reply: &'static str) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        let store = ProfileBackend::Sqlite(SqliteProfileStore::new(pool));
        let assistant = StudyAssistant::new(BoxLlmProvider::new(FixedReply(reply)), "test-model", 0.7);
        let state = AppState::new(dir.path().to_path_buf(), GlobalConfig::default(), store, assistant);
        (state, dir)
    }

    pub fn identity(id: &str) -> AuthIdentity {
        AuthIdentity {
            id: id.to_string(),
            display_name: Some("Ada".into()),
            email: Some("ada@uni.edu".into()),
        }
    }
}
