//! Per-user workspace.
//!
//! `StudentWorkspace` holds the signed-in user's profile, chat transcript,
//! planner and SOS state. Every mutation is fed to an
//! [`AutosaveSynchronizer`], so persistence happens in the background once
//! edits settle. Failures of the assistant or the store are recovered here:
//! they become notices or inline replies, never errors that tear the
//! workspace down.

use std::sync::Arc;
use std::time::Duration;

use studylife_types::chat::{Attachment, ChatMessage};
use studylife_types::config::{EmergencyContact, GlobalConfig};
use studylife_types::error::WorkspaceError;
use studylife_types::identity::AuthIdentity;
use studylife_types::llm::LlmError;
use studylife_types::profile::{ProfileField, ProfileFields, UserProfile};
use studylife_types::task::{StudyTask, TaskPriority};
use studylife_types::wellness::{
    DEFAULT_ENERGY_LEVEL, DashboardSummary, StressLevel, WellnessMetrics,
};
use tracing::{info, warn};

use crate::assistant::{ChatContext, StudyAssistant};
use crate::autosave::AutosaveSynchronizer;
use crate::notice::bus::NoticeBus;
use crate::safety::is_emergency;
use crate::storage::profile_store::ProfileStore;

pub const LOAD_FAILED_NOTICE: &str = "Couldn't load your saved data. Showing defaults.";
pub const SAVE_DISABLED_NOTICE: &str =
    "Saving is paused because your data couldn't be loaded. Reopen to retry.";
pub const PROFILE_SAVED_NOTICE: &str = "Profile Updated Successfully!";
pub const EMERGENCY_NOTICE: &str = "Emergency Protocol Initiated";
pub const PLAN_CREATED_NOTICE: &str = "Study plan created!";
pub const PLAN_EMPTY_NOTICE: &str = "No tasks were generated. Try a different topic.";
pub const PLAN_FAILED_NOTICE: &str = "Failed to generate study plan. Please try again.";
pub const CHAT_FAILED_REPLY: &str =
    "Sorry, I couldn't reach the AI service right now. Please try again in a moment.";
pub const INSIGHT_FAILED_TEXT: &str = "Unable to generate an insight right now. Please try again.";

/// Tunables a workspace is opened with.
#[derive(Debug, Clone)]
pub struct WorkspaceSettings {
    pub debounce: Duration,
    pub energy_level: u8,
    pub contacts: Vec<EmergencyContact>,
}

impl WorkspaceSettings {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.autosave.debounce_ms),
            energy_level: DEFAULT_ENERGY_LEVEL,
            contacts: config.safety.contacts.clone(),
        }
    }
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self::from_config(&GlobalConfig::default())
    }
}

/// The signed-in user's live state.
pub struct StudentWorkspace {
    identity: AuthIdentity,
    profile: UserProfile,
    assistant: Arc<StudyAssistant>,
    notices: NoticeBus,
    sync: AutosaveSynchronizer,
    settings: WorkspaceSettings,
    sos_active: bool,
    insight: Option<String>,
    next_task_id: u64,
    autosave_engaged: bool,
}

impl StudentWorkspace {
    /// Load the user's profile and start autosaving it.
    ///
    /// A failed load publishes a notice and continues with defaults, but
    /// nothing is saved for the rest of the session. Empty name/email
    /// fields are filled from the identity.
    pub async fn open<S: ProfileStore + 'static>(
        identity: AuthIdentity,
        store: Arc<S>,
        assistant: Arc<StudyAssistant>,
        notices: NoticeBus,
        settings: WorkspaceSettings,
    ) -> Self {
        let sync = AutosaveSynchronizer::spawn(
            identity.id.clone(),
            Arc::clone(&store),
            notices.clone(),
            settings.debounce,
        );

        let loaded = match store.load(&identity.id).await {
            Ok(Some(fields)) => Some(fields),
            Ok(None) => {
                info!(user_id = %identity.id, "No saved profile, starting fresh");
                Some(ProfileFields::default())
            }
            Err(e) => {
                warn!(user_id = %identity.id, error = %e, "Failed to load profile, autosave disabled");
                notices.error(LOAD_FAILED_NOTICE);
                None
            }
        };

        let mut profile = UserProfile::default();
        // Without a baseline the worker drops every settle, so defaults shown
        // after a failed load never reach the store.
        let autosave_engaged = loaded.is_some();
        if let Some(fields) = loaded {
            profile.apply(fields.clone());
            sync.mark_loaded(fields);
        }

        // A stored id of u64::MAX leaves next_task_id at u64::MAX, which
        // push_task refuses to hand out.
        let next_task_id = profile
            .tasks
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let mut workspace = Self {
            identity,
            profile,
            assistant,
            notices,
            sync,
            settings,
            sos_active: false,
            insight: None,
            next_task_id,
            autosave_engaged,
        };
        workspace.fill_from_identity();
        workspace
    }

    fn fill_from_identity(&mut self) {
        if self.profile.name.is_empty() {
            if let Some(name) = self.identity.display_name.clone().filter(|n| !n.is_empty()) {
                self.set_name(name);
            }
        }
        if self.profile.email.is_empty() {
            if let Some(email) = self.identity.email.clone().filter(|e| !e.is_empty()) {
                self.set_email(email);
            }
        }
    }

    pub fn identity(&self) -> &AuthIdentity {
        &self.identity
    }

    pub fn user_id(&self) -> &str {
        &self.identity.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    fn touch(&self, field: ProfileField) {
        self.sync.record(self.profile.value(field));
    }

    // --- Profile ---

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.profile.name = name.into();
        self.touch(ProfileField::Name);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.profile.email = email.into();
        self.touch(ProfileField::Email);
    }

    pub fn set_sleep_hours(&mut self, hours: f64) -> Result<(), WorkspaceError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(WorkspaceError::InvalidSleepHours(hours));
        }
        self.profile.sleep_hours = hours;
        self.touch(ProfileField::SleepHours);
        Ok(())
    }

    /// Persist pending profile edits now and confirm with a notice.
    pub async fn save_profile(&self) {
        if !self.autosave_engaged {
            self.notices.error(SAVE_DISABLED_NOTICE);
            return;
        }
        self.sync.flush().await;
        self.notices.success(PROFILE_SAVED_NOTICE);
    }

    // --- Tasks ---

    pub fn tasks(&self) -> &[StudyTask] {
        &self.profile.tasks
    }

    pub fn add_task(
        &mut self,
        title: &str,
        priority: TaskPriority,
    ) -> Result<StudyTask, WorkspaceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WorkspaceError::EmptyTaskTitle);
        }
        let task = self.push_task(title.to_string(), priority)?;
        self.touch(ProfileField::Tasks);
        Ok(task)
    }

    fn push_task(&mut self, title: String, priority: TaskPriority) -> Result<StudyTask, WorkspaceError> {
        let id = self.next_task_id;
        self.next_task_id = id.checked_add(1).ok_or(WorkspaceError::TaskIdsExhausted)?;
        let task = StudyTask {
            id,
            title,
            priority,
            completed: false,
        };
        self.profile.tasks.push(task.clone());
        Ok(task)
    }

    /// Flip a task's completion. Returns the new state.
    pub fn toggle_task(&mut self, id: u64) -> Result<bool, WorkspaceError> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.touch(ProfileField::Tasks);
        Ok(completed)
    }

    pub fn rename_task(&mut self, id: u64, title: &str) -> Result<(), WorkspaceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WorkspaceError::EmptyTaskTitle);
        }
        self.task_mut(id)?.title = title.to_string();
        self.touch(ProfileField::Tasks);
        Ok(())
    }

    pub fn remove_task(&mut self, id: u64) -> Result<StudyTask, WorkspaceError> {
        let index = self
            .profile
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(WorkspaceError::TaskNotFound(id))?;
        let task = self.profile.tasks.remove(index);
        self.touch(ProfileField::Tasks);
        Ok(task)
    }

    fn task_mut(&mut self, id: u64) -> Result<&mut StudyTask, WorkspaceError> {
        self.profile
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(WorkspaceError::TaskNotFound(id))
    }

    // --- Chat ---

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.profile.chat_history
    }

    /// Send a chat message and append the assistant's reply.
    ///
    /// Returns `None` when there is nothing to send. An assistant failure
    /// is answered with an inline error reply.
    pub async fn send_message(
        &mut self,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Option<ChatMessage> {
        if text.trim().is_empty() && attachment.is_none() {
            return None;
        }

        let display = match &attachment {
            Some(file) if text.trim().is_empty() => format!("[Sent File: {}]", file.name),
            _ => text.to_string(),
        };
        self.profile.chat_history.push(ChatMessage::user(display));
        self.touch(ProfileField::ChatHistory);

        if is_emergency(text) {
            self.activate_sos();
            self.notices.error(EMERGENCY_NOTICE);
        }

        let context = ChatContext {
            user_name: Some(self.greeting_name()),
            sleep_hours: Some(self.profile.sleep_hours),
        };
        let reply_text = match self
            .assistant
            .chat(&self.profile.chat_history, &context, attachment.as_ref())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(user_id = %self.identity.id, error = %e, "Chat completion failed");
                CHAT_FAILED_REPLY.to_string()
            }
        };

        let reply = ChatMessage::model(reply_text);
        self.profile.chat_history.push(reply.clone());
        self.touch(ProfileField::ChatHistory);
        Some(reply)
    }

    // --- Planner ---

    /// Ask the assistant for a plan and append its tasks.
    ///
    /// A blank topic is ignored. Failures publish an error notice and are
    /// also returned so callers can report them.
    pub async fn generate_plan(&mut self, topic: &str) -> Result<Vec<StudyTask>, LlmError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Ok(Vec::new());
        }

        let planned = match self.assistant.plan(topic).await {
            Ok(planned) => planned,
            Err(e) => {
                warn!(user_id = %self.identity.id, topic, error = %e, "Study plan generation failed");
                self.notices.error(PLAN_FAILED_NOTICE);
                return Err(e);
            }
        };

        if planned.is_empty() {
            self.notices.info(PLAN_EMPTY_NOTICE);
            return Ok(Vec::new());
        }

        let mut added = Vec::new();
        for planned_task in planned.into_iter().filter(|p| !p.title.trim().is_empty()) {
            match self.push_task(planned_task.title.trim().to_string(), planned_task.priority) {
                Ok(task) => added.push(task),
                Err(e) => {
                    warn!(user_id = %self.identity.id, error = %e, "Dropping remaining planned tasks");
                    break;
                }
            }
        }
        self.touch(ProfileField::Tasks);
        self.notices.success(PLAN_CREATED_NOTICE);
        info!(user_id = %self.identity.id, topic, count = added.len(), "Study plan added");
        Ok(added)
    }

    // --- Dashboard ---

    pub fn metrics(&self) -> WellnessMetrics {
        WellnessMetrics {
            sleep_hours: self.profile.sleep_hours,
            energy_level: self.settings.energy_level,
        }
    }

    /// Generate and remember today's wellness tip.
    pub async fn generate_insight(&mut self) -> String {
        let insight = match self.assistant.insight(&self.metrics()).await {
            Ok(text) => text,
            Err(e) => {
                warn!(user_id = %self.identity.id, error = %e, "Insight generation failed");
                INSIGHT_FAILED_TEXT.to_string()
            }
        };
        self.insight = Some(insight.clone());
        insight
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary {
            greeting_name: self.greeting_name(),
            sleep_hours: self.profile.sleep_hours,
            energy_level: self.settings.energy_level,
            stress: StressLevel::from_sleep_hours(self.profile.sleep_hours),
            completed_tasks: self.profile.tasks.iter().filter(|t| t.completed).count(),
            total_tasks: self.profile.tasks.len(),
            insight: self.insight.clone(),
        }
    }

    fn greeting_name(&self) -> String {
        if self.profile.name.trim().is_empty() {
            self.identity.greeting_name()
        } else {
            self.profile.name.clone()
        }
    }

    // --- Safety ---

    pub fn activate_sos(&mut self) {
        if !self.sos_active {
            warn!(user_id = %self.identity.id, "SOS mode activated");
        }
        self.sos_active = true;
    }

    pub fn dismiss_sos(&mut self) {
        self.sos_active = false;
    }

    pub fn is_sos_active(&self) -> bool {
        self.sos_active
    }

    pub fn emergency_contacts(&self) -> &[EmergencyContact] {
        &self.settings.contacts
    }

    // --- Autosave ---

    pub fn pending_fields(&self) -> Vec<ProfileField> {
        self.sync.pending_fields()
    }

    pub fn saves_issued(&self) -> u64 {
        self.sync.saves_issued()
    }

    /// False after a failed load: edits stay local.
    pub fn is_autosave_engaged(&self) -> bool {
        self.autosave_engaged
    }

    /// Persist every pending edit now.
    pub async fn flush(&self) {
        self.sync.flush().await;
    }

    /// Stop autosaving. Pending edits are discarded.
    pub fn close(&self) {
        self.sync.close();
    }
}

impl std::fmt::Debug for StudentWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentWorkspace")
            .field("user_id", &self.identity.id)
            .field("sos_active", &self.sos_active)
            .field("sync", &self.sync)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::provider::LlmProvider;
    use crate::storage::memory::MemoryProfileStore;
    use studylife_types::chat::{AttachmentCategory, ChatRole};
    use studylife_types::error::RepositoryError;
    use studylife_types::llm::{CompletionRequest, CompletionResponse, StopReason, Usage};
    use studylife_types::profile::FieldValue;

    struct CannedProvider {
        reply: Option<&'static str>,
    }

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match self.reply {
                Some(content) => Ok(CompletionResponse {
                    content: content.to_string(),
                    model: request.model.clone(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                None => Err(LlmError::Provider {
                    message: "HTTP 503".into(),
                }),
            }
        }
    }

    /// Load always fails; saves succeed and are counted.
    #[derive(Clone, Default)]
    struct UnreadableStore {
        saves: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl ProfileStore for UnreadableStore {
        async fn save(&self, _: &str, _: &ProfileFields) -> Result<(), RepositoryError> {
            self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn load(&self, _: &str) -> Result<Option<ProfileFields>, RepositoryError> {
            Err(RepositoryError::Connection)
        }
    }

    fn assistant(reply: Option<&'static str>) -> Arc<StudyAssistant> {
        Arc::new(StudyAssistant::new(
            BoxLlmProvider::new(CannedProvider { reply }),
            "gemini-2.0-flash",
            0.7,
        ))
    }

    fn identity() -> AuthIdentity {
        AuthIdentity {
            id: "uid-1".into(),
            display_name: Some("Ada".into()),
            email: Some("ada@uni.edu".into()),
        }
    }

    async fn open_with(
        store: MemoryProfileStore,
        reply: Option<&'static str>,
    ) -> (StudentWorkspace, NoticeBus) {
        let notices = NoticeBus::default();
        let ws = StudentWorkspace::open(
            identity(),
            Arc::new(store),
            assistant(reply),
            notices.clone(),
            WorkspaceSettings::default(),
        )
        .await;
        (ws, notices)
    }

    fn notice_messages(notices: &NoticeBus) -> Vec<String> {
        notices
            .active(chrono::Utc::now())
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_profile_uses_defaults_and_identity() {
        let store = MemoryProfileStore::new();
        let (ws, _) = open_with(store.clone(), Some("ok")).await;

        assert_eq!(ws.profile().name, "Ada");
        assert_eq!(ws.profile().email, "ada@uni.edu");
        assert_eq!(ws.profile().sleep_hours, 6.0);
        assert_eq!(ws.tasks().len(), 2);

        ws.flush().await;
        let doc = store.document("uid-1").unwrap();
        assert_eq!(doc.name.as_deref(), Some("Ada"));
        assert!(doc.tasks.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_profile_is_not_written_back() {
        let store = MemoryProfileStore::new();
        store
            .save(
                "uid-1",
                &ProfileFields::default()
                    .with(FieldValue::Name("Ada L.".into()))
                    .with(FieldValue::Email("ada@uni.edu".into()))
                    .with(FieldValue::SleepHours(7.0)),
            )
            .await
            .unwrap();

        let (ws, _) = open_with(store, Some("ok")).await;
        assert_eq!(ws.profile().name, "Ada L.");
        assert_eq!(ws.profile().sleep_hours, 7.0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ws.saves_issued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_notifies_and_never_saves_defaults() {
        let store = UnreadableStore::default();
        let notices = NoticeBus::default();
        let mut ws = StudentWorkspace::open(
            identity(),
            Arc::new(store.clone()),
            assistant(Some("ok")),
            notices.clone(),
            WorkspaceSettings::default(),
        )
        .await;
        assert_eq!(ws.profile().sleep_hours, 6.0);
        assert!(!ws.is_autosave_engaged());
        assert!(notice_messages(&notices).contains(&LOAD_FAILED_NOTICE.to_string()));

        ws.toggle_task(1).unwrap();
        ws.set_sleep_hours(8.0).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        ws.flush().await;

        assert_eq!(store.saves.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(ws.saves_issued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_save_after_load_failure_reports_paused() {
        let notices = NoticeBus::default();
        let ws = StudentWorkspace::open(
            identity(),
            Arc::new(UnreadableStore::default()),
            assistant(Some("ok")),
            notices.clone(),
            WorkspaceSettings::default(),
        )
        .await;
        ws.save_profile().await;

        let messages = notice_messages(&notices);
        assert!(messages.contains(&SAVE_DISABLED_NOTICE.to_string()));
        assert!(!messages.contains(&PROFILE_SAVED_NOTICE.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn stored_max_task_id_refuses_new_tasks() {
        let store = MemoryProfileStore::new();
        store
            .save(
                "uid-1",
                &ProfileFields::default().with(FieldValue::Tasks(vec![StudyTask {
                    id: u64::MAX,
                    title: "Last one".into(),
                    priority: TaskPriority::Low,
                    completed: false,
                }])),
            )
            .await
            .unwrap();

        let (mut ws, _) = open_with(store, Some("ok")).await;
        assert_eq!(
            ws.add_task("Overflow", TaskPriority::High),
            Err(WorkspaceError::TaskIdsExhausted)
        );
        assert_eq!(ws.tasks().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_edits_are_debounced_into_one_save() {
        let store = MemoryProfileStore::new();
        let (mut ws, _) = open_with(store.clone(), Some("ok")).await;
        ws.flush().await;
        let baseline = ws.saves_issued();

        ws.set_sleep_hours(7.0).unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        ws.set_sleep_hours(8.0).unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(ws.saves_issued(), baseline + 1);
        assert_eq!(store.document("uid-1").unwrap().sleep_hours, Some(8.0));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_sleep_hours_rejected() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("ok")).await;
        assert!(ws.set_sleep_hours(25.0).is_err());
        assert!(ws.set_sleep_hours(f64::NAN).is_err());
        assert!(ws.set_sleep_hours(-1.0).is_err());
        assert!(ws.set_sleep_hours(24.0).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn task_ids_are_unique_and_increasing() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("ok")).await;
        let a = ws.add_task("Read", TaskPriority::Low).unwrap();
        ws.remove_task(a.id).unwrap();
        let b = ws.add_task("Write", TaskPriority::High).unwrap();
        assert_eq!(a.id, 3);
        assert!(b.id > a.id);

        assert!(ws.toggle_task(b.id).unwrap());
        assert!(!ws.toggle_task(b.id).unwrap());
        ws.rename_task(b.id, "Write essay").unwrap();
        assert_eq!(ws.tasks().last().unwrap().title, "Write essay");

        assert_eq!(ws.toggle_task(99), Err(WorkspaceError::TaskNotFound(99)));
        assert_eq!(
            ws.add_task("   ", TaskPriority::Low),
            Err(WorkspaceError::EmptyTaskTitle)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_message_is_ignored() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("ok")).await;
        assert!(ws.send_message("   ", None).await.is_none());
        assert_eq!(ws.chat_history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn chat_appends_user_and_model_messages() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("Take a break.")).await;
        let reply = ws.send_message("I'm stressed", None).await.unwrap();
        assert_eq!(reply.text, "Take a break.");
        let history = ws.chat_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[2].role, ChatRole::Model);
    }

    #[tokio::test(start_paused = true)]
    async fn attachment_only_message_shows_file_name() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("Got it")).await;
        let file = Attachment {
            name: "syllabus.pdf".into(),
            mime_type: "application/pdf".into(),
            data: "data:application/pdf;base64,AAA".into(),
            category: AttachmentCategory::Pdf,
        };
        ws.send_message("", Some(file)).await.unwrap();
        assert_eq!(ws.chat_history()[1].text, "[Sent File: syllabus.pdf]");
    }

    #[tokio::test(start_paused = true)]
    async fn emergency_message_activates_sos() {
        let (mut ws, notices) = open_with(MemoryProfileStore::new(), Some("Stay calm.")).await;
        ws.send_message("this is an emergency", None).await;
        assert!(ws.is_sos_active());
        assert!(notice_messages(&notices).contains(&EMERGENCY_NOTICE.to_string()));
        ws.dismiss_sos();
        assert!(!ws.is_sos_active());
        assert_eq!(ws.emergency_contacts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn assistant_failure_becomes_inline_reply() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), None).await;
        let reply = ws.send_message("hello", None).await.unwrap();
        assert_eq!(reply.text, CHAT_FAILED_REPLY);
        assert_eq!(reply.role, ChatRole::Model);
    }

    #[tokio::test(start_paused = true)]
    async fn generate_plan_appends_tasks_and_notifies() {
        let reply = r#"[{"title": "Review trees", "priority": "High"}, {"title": "Solve 5 problems", "priority": "Medium"}]"#;
        let (mut ws, notices) = open_with(MemoryProfileStore::new(), Some(reply)).await;
        let added = ws.generate_plan("Data Structures").await.unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(ws.tasks().len(), 4);
        assert!(notice_messages(&notices).contains(&PLAN_CREATED_NOTICE.to_string()));

        assert!(ws.generate_plan("  ").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn generate_plan_failure_notifies() {
        let (mut ws, notices) = open_with(MemoryProfileStore::new(), None).await;
        assert!(ws.generate_plan("Graphs").await.is_err());
        assert_eq!(ws.tasks().len(), 2);
        assert!(notice_messages(&notices).contains(&PLAN_FAILED_NOTICE.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn dashboard_reflects_state_and_insight() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), Some("Sleep earlier tonight.")).await;
        ws.set_sleep_hours(5.0).unwrap();
        let first = ws.tasks()[0].id;
        ws.toggle_task(first).unwrap();
        ws.generate_insight().await;

        let summary = ws.dashboard();
        assert_eq!(summary.greeting_name, "Ada");
        assert_eq!(summary.stress, StressLevel::High);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.insight.as_deref(), Some("Sleep earlier tonight."));
    }

    #[tokio::test(start_paused = true)]
    async fn insight_failure_uses_inline_text() {
        let (mut ws, _) = open_with(MemoryProfileStore::new(), None).await;
        assert_eq!(ws.generate_insight().await, INSIGHT_FAILED_TEXT);
    }

    #[tokio::test(start_paused = true)]
    async fn close_discards_pending_edits() {
        let store = MemoryProfileStore::new();
        let (mut ws, _) = open_with(store.clone(), Some("ok")).await;
        ws.flush().await;
        ws.set_sleep_hours(9.0).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.close();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.document("uid-1").unwrap().sleep_hours.is_none());
    }
}
