//! An editing session: one itinerary, its undo history, and its autosave.
//!
//! [`EditorSession`] is the context object handed to whatever drives the
//! editing (the CLI today). Every change to the present itinerary, whether
//! an edit, an undo, or a redo, goes through here so history and autosave
//! never drift apart.

use std::num::NonZeroUsize;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::watch;
use tracing::debug;

use crate::autosave::{AutoSaveHandle, SaveStatus};
use crate::history::HistoryManager;
use crate::model::{Edit, EditError, Itinerary, Snapshot};

/// Edits one itinerary with undo/redo and autosave.
pub struct EditorSession {
    history: HistoryManager<Snapshot>,
    autosave: AutoSaveHandle<Snapshot>,
}

impl EditorSession {
    /// Starts a session on a loaded itinerary.
    ///
    /// The loaded itinerary becomes the present state and is reported to
    /// autosave as the initial hydration, so opening alone saves nothing.
    pub fn open(
        itinerary: Itinerary,
        autosave: AutoSaveHandle<Snapshot>,
        history_limit: Option<NonZeroUsize>,
    ) -> Self {
        let snapshot: Snapshot = Arc::new(itinerary);
        let mut history = HistoryManager::with_limit(history_limit);
        history.commit(Arc::clone(&snapshot));
        autosave.notify_change(snapshot);
        Self { history, autosave }
    }

    /// The itinerary as it stands now.
    pub fn current(&self) -> Option<&Snapshot> {
        self.history.present()
    }

    /// Applies an edit to the present itinerary and records it. A rejected
    /// edit changes nothing.
    pub fn apply(&mut self, edit: &Edit) -> Result<Snapshot, EditError> {
        let present = self.history.present().ok_or(EditError::NoDocument)?;
        let next: Snapshot = Arc::new(present.apply(edit, Timestamp::now())?);
        debug!(itinerary = %next.id, ?edit, "applied edit");
        self.history.commit(Arc::clone(&next));
        self.autosave.notify_change(Arc::clone(&next));
        Ok(next)
    }

    /// Steps back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(present) = self.history.undo() else {
            return false;
        };
        self.autosave.notify_change(Arc::clone(present));
        true
    }

    /// Steps forward one undone edit. Returns false when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let Some(present) = self.history.redo() else {
            return false;
        };
        self.autosave.notify_change(Arc::clone(present));
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of edits that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.past().len()
    }

    /// Number of undone edits that can be redone.
    pub fn redo_depth(&self) -> usize {
        self.history.future().len()
    }

    /// Requests an immediate save of the present itinerary.
    pub fn save_now(&self) {
        self.autosave.save_now();
    }

    pub fn status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.autosave.subscribe()
    }

    /// Ends the session, stopping autosave once any in-flight save has
    /// landed. Returns the final itinerary.
    pub async fn close(mut self) -> Option<Snapshot> {
        self.autosave.shutdown().await;
        let last = self.history.present().cloned();
        self.history.clear();
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use crate::autosave::{AutoSave, AutoSaveSettings, Persist, PersistError};

    #[derive(Default)]
    struct Recorder {
        titles: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn titles(&self) -> Vec<String> {
            self.titles.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Persist<Snapshot> for Recorder {
        async fn persist(&self, document: &Snapshot) -> Result<(), PersistError> {
            self.titles.lock().unwrap().push(document.title.clone());
            Ok(())
        }
    }

    /// Keeps only the last title written, after a write latency.
    struct SlowStore {
        stored: Mutex<Option<String>>,
        latency: Duration,
    }

    #[async_trait]
    impl Persist<Snapshot> for SlowStore {
        async fn persist(&self, document: &Snapshot) -> Result<(), PersistError> {
            sleep(self.latency).await;
            *self.stored.lock().unwrap() = Some(document.title.clone());
            Ok(())
        }
    }

    fn open(recorder: &Arc<Recorder>) -> EditorSession {
        let persist: Arc<dyn Persist<Snapshot>> = recorder.clone();
        let autosave = AutoSave::spawn(persist, AutoSaveSettings::default());
        EditorSession::open(Itinerary::new("Draft", Timestamp::now()), autosave, None)
    }

    fn retitle(title: &str) -> Edit {
        Edit::SetTitle {
            title: title.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn opening_does_not_save() {
        let recorder = Arc::new(Recorder::default());
        let session = open(&recorder);

        sleep(Duration::from_secs(10)).await;

        assert!(recorder.titles().is_empty());
        assert!(!session.can_undo());
        session.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn edits_are_undoable_and_autosaved() {
        let recorder = Arc::new(Recorder::default());
        let mut session = open(&recorder);

        session.apply(&retitle("Rome")).unwrap();
        session.apply(&retitle("Rome and Naples")).unwrap();
        assert!(session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.undo_depth(), 2);

        sleep(Duration::from_millis(2100)).await;
        assert_eq!(recorder.titles(), ["Rome and Naples"]);
        assert!(session.status().last_save_time.is_some());

        assert!(session.undo());
        assert_eq!(session.current().unwrap().title, "Rome");
        assert_eq!((session.undo_depth(), session.redo_depth()), (1, 1));
        sleep(Duration::from_millis(2100)).await;
        assert_eq!(recorder.titles(), ["Rome and Naples", "Rome"]);

        assert!(session.redo());
        assert_eq!(session.current().unwrap().title, "Rome and Naples");
        assert!(!session.redo());

        let last = session.close().await.unwrap();
        assert_eq!(last.title, "Rome and Naples");
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_edit_changes_nothing() {
        let recorder = Arc::new(Recorder::default());
        let mut session = open(&recorder);

        let err = session.apply(&Edit::RemoveDay { day: 1 }).unwrap_err();
        assert_eq!(err, EditError::NoSuchDay(1));
        assert!(!session.can_undo());

        sleep(Duration::from_secs(10)).await;
        assert!(recorder.titles().is_empty());
        session.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn undo_past_the_start_is_a_noop() {
        let recorder = Arc::new(Recorder::default());
        let mut session = open(&recorder);

        assert!(!session.undo());
        assert!(!session.redo());
        assert_eq!(session.current().unwrap().title, "Draft");
        session.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn final_write_after_close_is_not_overtaken_by_autosave() {
        let store = Arc::new(SlowStore {
            stored: Mutex::new(None),
            latency: Duration::from_millis(50),
        });
        let persist: Arc<dyn Persist<Snapshot>> = store.clone();
        let autosave = AutoSave::spawn(persist, AutoSaveSettings::default());
        let mut session =
            EditorSession::open(Itinerary::new("Draft", Timestamp::now()), autosave, None);

        session.apply(&retitle("v1")).unwrap();
        session.save_now();
        sleep(Duration::from_millis(1)).await;
        session.apply(&retitle("v2")).unwrap();

        // What `journee edit` does on quit: stop autosave, then write the
        // final state straight to the store.
        let last = session.close().await.unwrap();
        *store.stored.lock().unwrap() = Some(last.title.clone());
        sleep(Duration::from_millis(100)).await;

        assert_eq!(last.title, "v2");
        assert_eq!(store.stored.lock().unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_skips_the_debounce() {
        let recorder = Arc::new(Recorder::default());
        let mut session = open(&recorder);

        session.apply(&retitle("Oslo")).unwrap();
        session.save_now();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(recorder.titles(), ["Oslo"]);
        session.close().await;
    }
}
