//! Debounced multi-field autosave.
//!
//! Every profile field gets its own [`Debouncer`]. Settled values are sent
//! to a single worker task that turns them into partial-update saves:
//!
//! - settles that arrive before [`AutosaveSynchronizer::mark_loaded`] are
//!   dropped, so loading a profile never writes it back;
//! - settles already queued when a batch is built are coalesced into it;
//! - only fields that differ from the last successfully saved value are
//!   sent, and an empty batch issues no save;
//! - a failed save is logged and published as an error notice. The next
//!   edit of the field starts a fresh debounce cycle.
//!
//! The worker issues saves one at a time. Closing the synchronizer cancels
//! pending timers and the worker; a save already in flight runs to
//! completion but its outcome is ignored.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use studylife_types::profile::{FieldValue, ProfileField, ProfileFields};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notice::bus::NoticeBus;
use crate::storage::profile_store::ProfileStore;

use super::debounce::Debouncer;

/// Notice shown when a background save fails.
pub const SAVE_FAILED_NOTICE: &str = "Couldn't save your latest changes. Edit again to retry.";

/// Messages from the debouncers and the owning workspace to the worker.
enum SyncCommand {
    Settled(FieldValue),
    Loaded(ProfileFields),
    Flush(oneshot::Sender<()>),
}

/// Debounces each profile field and pushes merged partial saves.
pub struct AutosaveSynchronizer {
    user_id: String,
    debouncers: HashMap<ProfileField, Debouncer<FieldValue>>,
    commands: mpsc::UnboundedSender<SyncCommand>,
    cancel: CancellationToken,
    saves_issued: Arc<AtomicU64>,
}

impl AutosaveSynchronizer {
    /// Create the synchronizer and spawn its worker task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: ProfileStore + 'static>(
        user_id: impl Into<String>,
        store: Arc<S>,
        notices: NoticeBus,
        window: Duration,
    ) -> Self {
        let user_id = user_id.into();
        let (commands, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let saves_issued = Arc::new(AtomicU64::new(0));

        let debouncers = ProfileField::ALL
            .into_iter()
            .map(|field| {
                let tx = commands.clone();
                let debouncer = Debouncer::new(window, move |value: FieldValue| {
                    let _ = tx.send(SyncCommand::Settled(value));
                });
                (field, debouncer)
            })
            .collect();

        let worker = SyncWorker {
            user_id: user_id.clone(),
            store,
            notices,
            cancel: cancel.clone(),
            saves_issued: Arc::clone(&saves_issued),
            loaded: false,
            last_saved: ProfileFields::default(),
        };
        tokio::spawn(worker.run(rx));

        debug!(user_id = %user_id, window_ms = window.as_millis() as u64, "Autosave synchronizer started");

        Self {
            user_id,
            debouncers,
            commands,
            cancel,
            saves_issued,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Feed a new local value for one field. Restarts that field's window.
    pub fn record(&self, value: FieldValue) {
        if self.cancel.is_cancelled() {
            return;
        }
        if let Some(debouncer) = self.debouncers.get(&value.field()) {
            debouncer.push(value);
        }
    }

    /// Signal that the initial load is complete.
    ///
    /// `loaded` becomes the "last saved" baseline: fields equal to it are
    /// never re-sent.
    pub fn mark_loaded(&self, loaded: ProfileFields) {
        let _ = self.commands.send(SyncCommand::Loaded(loaded));
    }

    /// Settle every pending field now and wait until the resulting batch
    /// has been processed.
    pub async fn flush(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        for field in ProfileField::ALL {
            if let Some(debouncer) = self.debouncers.get(&field) {
                debouncer.settle_now();
            }
        }
        let (ack, done) = oneshot::channel();
        if self.commands.send(SyncCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Teardown: cancel pending timers and stop the worker.
    pub fn close(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        for debouncer in self.debouncers.values() {
            debouncer.cancel();
        }
        self.cancel.cancel();
        debug!(user_id = %self.user_id, "Autosave synchronizer closed");
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fields with an unsettled local change.
    pub fn pending_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| {
                self.debouncers
                    .get(field)
                    .is_some_and(|debouncer| debouncer.is_pending())
            })
            .collect()
    }

    /// Number of store saves issued so far (successful or not).
    pub fn saves_issued(&self) -> u64 {
        self.saves_issued.load(Ordering::Relaxed)
    }
}

impl Drop for AutosaveSynchronizer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AutosaveSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveSynchronizer")
            .field("user_id", &self.user_id)
            .field("closed", &self.is_closed())
            .field("saves_issued", &self.saves_issued())
            .finish()
    }
}

struct SyncWorker<S: ProfileStore> {
    user_id: String,
    store: Arc<S>,
    notices: NoticeBus,
    cancel: CancellationToken,
    saves_issued: Arc<AtomicU64>,
    loaded: bool,
    last_saved: ProfileFields,
}

impl<S: ProfileStore> SyncWorker<S> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SyncCommand>) {
        loop {
            let command = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                command = rx.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            let mut batch = ProfileFields::default();
            let mut acks = Vec::new();
            self.absorb(command, &mut batch, &mut acks);
            while let Ok(queued) = rx.try_recv() {
                self.absorb(queued, &mut batch, &mut acks);
            }

            let changed = self.changed_fields(batch);
            if !changed.is_empty() && !self.save(changed).await {
                break;
            }

            for ack in acks {
                let _ = ack.send(());
            }
        }
        debug!(user_id = %self.user_id, "Autosave worker stopped");
    }

    fn absorb(
        &mut self,
        command: SyncCommand,
        batch: &mut ProfileFields,
        acks: &mut Vec<oneshot::Sender<()>>,
    ) {
        match command {
            SyncCommand::Loaded(fields) => {
                self.loaded = true;
                self.last_saved = fields;
            }
            SyncCommand::Settled(value) if self.loaded => batch.insert(value),
            SyncCommand::Settled(value) => {
                debug!(user_id = %self.user_id, field = %value.field(), "Dropping settle before initial load");
            }
            SyncCommand::Flush(ack) => acks.push(ack),
        }
    }

    fn changed_fields(&self, batch: ProfileFields) -> ProfileFields {
        batch
            .values()
            .into_iter()
            .filter(|value| self.last_saved.get(value.field()).as_ref() != Some(value))
            .fold(ProfileFields::default(), |changed, value| changed.with(value))
    }

    /// Issue one save. Returns `false` when the synchronizer was closed
    /// while the save was in flight.
    async fn save(&mut self, changed: ProfileFields) -> bool {
        let fields = changed.fields();
        self.saves_issued.fetch_add(1, Ordering::Relaxed);
        let result = self.store.save(&self.user_id, &changed).await;

        if self.cancel.is_cancelled() {
            debug!(user_id = %self.user_id, "Ignoring save result after close");
            return false;
        }

        match result {
            Ok(()) => {
                info!(user_id = %self.user_id, fields = ?fields, "Profile autosaved");
                self.last_saved.merge(changed);
            }
            Err(e) => {
                warn!(user_id = %self.user_id, fields = ?fields, error = %e, "Profile autosave failed");
                self.notices.error(SAVE_FAILED_NOTICE);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;
    use studylife_types::error::RepositoryError;
    use studylife_types::notice::NoticeLevel;

    #[derive(Clone, Default)]
    struct RecordingStore {
        saves: Arc<Mutex<Vec<(String, ProfileFields)>>>,
        fail: Arc<AtomicBool>,
    }

    impl RecordingStore {
        fn saves(&self) -> Vec<(String, ProfileFields)> {
            self.saves.lock().unwrap().clone()
        }
    }

    impl ProfileStore for RecordingStore {
        async fn save(&self, user_id: &str, fields: &ProfileFields) -> Result<(), RepositoryError> {
            self.saves
                .lock()
                .unwrap()
                .push((user_id.to_string(), fields.clone()));
            if self.fail.load(Ordering::SeqCst) {
                Err(RepositoryError::Remote("unavailable".into()))
            } else {
                Ok(())
            }
        }

        async fn load(&self, _user_id: &str) -> Result<Option<ProfileFields>, RepositoryError> {
            Ok(None)
        }
    }

    fn setup(window_ms: u64) -> (AutosaveSynchronizer, RecordingStore, NoticeBus) {
        let store = RecordingStore::default();
        let notices = NoticeBus::default();
        let sync = AutosaveSynchronizer::spawn(
            "user-1",
            Arc::new(store.clone()),
            notices.clone(),
            Duration::from_millis(window_ms),
        );
        (sync, store, notices)
    }

    fn baseline() -> ProfileFields {
        ProfileFields::default()
            .with(FieldValue::Name("Ada".into()))
            .with(FieldValue::SleepHours(6.0))
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_sleep_edits_produce_one_save_with_last_value() {
        let (sync, store, _) = setup(1500);
        sync.mark_loaded(baseline());

        sync.record(FieldValue::SleepHours(6.0));
        advance(250).await;
        sync.record(FieldValue::SleepHours(7.0));
        advance(250).await;
        sync.record(FieldValue::SleepHours(8.0));
        advance(2000).await;

        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "user-1");
        assert_eq!(
            saves[0].1,
            ProfileFields::default().with(FieldValue::SleepHours(8.0))
        );
        assert_eq!(sync.saves_issued(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_during_window_never_saves() {
        let (sync, store, _) = setup(1500);
        sync.mark_loaded(baseline());

        sync.record(FieldValue::SleepHours(9.0));
        advance(200).await;
        sync.close();
        advance(10_000).await;

        assert!(store.saves().is_empty());
        assert_eq!(sync.saves_issued(), 0);
        assert!(sync.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn no_mutation_means_no_save() {
        let (sync, store, _) = setup(100);
        sync.mark_loaded(baseline());
        advance(5000).await;
        assert!(store.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn settles_before_load_are_dropped() {
        let (sync, store, _) = setup(100);
        sync.record(FieldValue::Email("early@uni.edu".into()));
        advance(500).await;
        sync.mark_loaded(baseline());
        advance(500).await;
        assert!(store.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_value_is_not_saved() {
        let (sync, store, _) = setup(100);
        sync.mark_loaded(baseline());
        sync.record(FieldValue::SleepHours(7.0));
        sync.record(FieldValue::SleepHours(6.0));
        advance(500).await;
        assert!(store.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn saved_value_is_not_resent() {
        let (sync, store, _) = setup(100);
        sync.mark_loaded(ProfileFields::default());

        sync.record(FieldValue::Name("Grace".into()));
        advance(500).await;
        sync.record(FieldValue::Name("Grace".into()));
        advance(500).await;

        assert_eq!(store.saves().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fields_in_separate_windows_save_separately() {
        let (sync, store, _) = setup(100);
        sync.mark_loaded(baseline());

        sync.record(FieldValue::Name("Grace".into()));
        advance(500).await;
        sync.record(FieldValue::SleepHours(7.5));
        advance(500).await;

        let saves = store.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].1.fields(), vec![ProfileField::Name]);
        assert_eq!(saves[1].1.fields(), vec![ProfileField::SleepHours]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_coalesces_pending_fields_into_one_save() {
        let (sync, store, _) = setup(1500);
        sync.mark_loaded(baseline());

        sync.record(FieldValue::Name("Grace".into()));
        sync.record(FieldValue::Email("grace@uni.edu".into()));
        assert_eq!(
            sync.pending_fields(),
            vec![ProfileField::Name, ProfileField::Email]
        );
        sync.flush().await;

        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(
            saves[0].1.fields(),
            vec![ProfileField::Name, ProfileField::Email]
        );
        assert!(sync.pending_fields().is_empty());

        advance(5000).await;
        assert_eq!(store.saves().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_notifies_and_retries_on_next_edit() {
        let (sync, store, notices) = setup(100);
        let mut rx = notices.subscribe();
        sync.mark_loaded(baseline());

        store.fail.store(true, Ordering::SeqCst);
        sync.record(FieldValue::SleepHours(8.0));
        advance(500).await;

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, SAVE_FAILED_NOTICE);

        store.fail.store(false, Ordering::SeqCst);
        sync.record(FieldValue::SleepHours(8.0));
        advance(500).await;

        assert_eq!(store.saves().len(), 2);
        assert_eq!(sync.saves_issued(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn record_after_close_is_ignored() {
        let (sync, store, _) = setup(100);
        sync.mark_loaded(baseline());
        sync.close();
        sync.record(FieldValue::SleepHours(10.0));
        sync.flush().await;
        advance(500).await;
        assert!(store.saves().is_empty());
        assert!(sync.pending_fields().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn flush_racing_timer_expiry_never_loses_an_edit() {
        let (sync, store, _) = setup(2);
        sync.mark_loaded(baseline());

        for round in 1..=20u32 {
            sync.record(FieldValue::SleepHours(f64::from(round) / 10.0));
            tokio::time::sleep(Duration::from_millis(2)).await;
            sync.flush().await;

            let saves = store.saves();
            assert_eq!(saves.len(), round as usize);
            assert_eq!(
                saves.last().unwrap().1,
                ProfileFields::default().with(FieldValue::SleepHours(f64::from(round) / 10.0))
            );
        }
    }
}
