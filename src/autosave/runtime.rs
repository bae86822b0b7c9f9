//! The tokio driver that runs a [`Scheduler`] against real timers.
//!
//! One task owns the scheduler, the debounce deadline, the backstop interval
//! and the in-flight save. Everything reaches it through a channel, so events
//! are handled strictly one at a time.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, warn};

use super::machine::{Effect, Event, SaveStatus, Scheduler};
use super::persist::{Persist, PersistError};

/// Timer settings for autosave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveSettings {
    /// Quiet period after the last change before saving.
    pub debounce: Duration,
    /// Backstop interval for saving regardless of edits.
    pub periodic: Duration,
}

impl AutoSaveSettings {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);
    pub const DEFAULT_PERIODIC: Duration = Duration::from_secs(5 * 60);
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            debounce: Self::DEFAULT_DEBOUNCE,
            periodic: Self::DEFAULT_PERIODIC,
        }
    }
}

enum Command<D> {
    Change(D),
    SaveNow,
    Shutdown,
}

struct InFlight {
    ticket: u64,
    handle: JoinHandle<Result<(), PersistError>>,
}

/// The autosave driver task.
pub struct AutoSave<D> {
    scheduler: Scheduler<D>,
    periodic: Duration,
    persist: Arc<dyn Persist<D>>,
    commands: mpsc::UnboundedReceiver<Command<D>>,
    status: watch::Sender<SaveStatus>,
    debounce: Option<(u64, Instant)>,
    in_flight: Option<InFlight>,
}

impl<D> AutoSave<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Starts a driver on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(persist: Arc<dyn Persist<D>>, settings: AutoSaveSettings) -> AutoSaveHandle<D> {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::default());
        let driver = Self {
            scheduler: Scheduler::new(settings.debounce),
            periodic: settings.periodic,
            persist,
            commands,
            status: status_tx,
            debounce: None,
            in_flight: None,
        };
        AutoSaveHandle {
            commands: commands_tx,
            status,
            driver: tokio::spawn(driver.run()),
        }
    }

    async fn run(mut self) {
        let mut periodic = interval_at(Instant::now() + self.periodic, self.periodic);
        periodic.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Change(document)) => Event::Changed(document),
                    Some(Command::SaveNow) => Event::SaveRequested,
                    Some(Command::Shutdown) | None => break,
                },
                generation = debounce_elapsed(self.debounce) => {
                    self.debounce = None;
                    Event::DebounceElapsed { generation }
                }
                _ = periodic.tick() => Event::PeriodicTick,
                (ticket, outcome) = join_save(&mut self.in_flight) => {
                    self.in_flight = None;
                    Event::SaveFinished { ticket, outcome }
                }
            };

            for effect in self.scheduler.handle(event) {
                self.apply(effect);
            }
            self.publish();
        }

        // No timer fires past this point. A save already in flight is allowed
        // to land first, so a write made after shutdown cannot be overtaken
        // by an older snapshot. Follow-up saves it would trigger are dropped.
        if self.in_flight.is_some() {
            let (ticket, outcome) = join_save(&mut self.in_flight).await;
            debug!(ticket, "waited for in-flight save before stopping");
            self.in_flight = None;
            let _ = self.scheduler.handle(Event::SaveFinished { ticket, outcome });
            self.publish();
        }
        debug!("autosave stopped");
    }

    fn apply(&mut self, effect: Effect<D>) {
        match effect {
            Effect::ArmDebounce { generation, delay } => {
                self.debounce = Some((generation, Instant::now() + delay));
            }
            Effect::Persist {
                ticket,
                trigger,
                document,
            } => {
                debug!(ticket, %trigger, "persisting document");
                let persist = Arc::clone(&self.persist);
                let handle = tokio::spawn(async move { persist.persist(&document).await });
                self.in_flight = Some(InFlight { ticket, handle });
            }
        }
    }

    fn publish(&self) {
        let current = self.scheduler.status();
        self.status.send_if_modified(|shown| {
            if *shown == *current {
                return false;
            }
            shown.clone_from(current);
            true
        });
    }
}

/// Resolves with the generation once the debounce deadline passes; never
/// resolves when no timer is armed.
async fn debounce_elapsed(debounce: Option<(u64, Instant)>) -> u64 {
    let Some((generation, deadline)) = debounce else {
        return pending().await;
    };
    sleep_until(deadline).await;
    generation
}

/// Waits for the in-flight save. A panicked or cancelled save counts as a
/// failure so the scheduler always leaves `Saving`.
async fn join_save(in_flight: &mut Option<InFlight>) -> (u64, Result<Timestamp, String>) {
    let Some(save) = in_flight else {
        return pending().await;
    };
    let outcome = match (&mut save.handle).await {
        Ok(Ok(())) => Ok(Timestamp::now()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => {
            warn!(ticket = save.ticket, error = %e, "save task did not complete");
            Err(PersistError::Task(e.to_string()).to_string())
        }
    };
    (save.ticket, outcome)
}

/// The owner's side of a running autosave driver.
///
/// Dropping the handle stops the driver, as does [`AutoSaveHandle::shutdown`].
pub struct AutoSaveHandle<D> {
    commands: mpsc::UnboundedSender<Command<D>>,
    status: watch::Receiver<SaveStatus>,
    driver: JoinHandle<()>,
}

impl<D> AutoSaveHandle<D> {
    /// Tells the scheduler the document changed. Never fails; after shutdown
    /// the change is dropped.
    pub fn notify_change(&self, document: D) {
        if self.commands.send(Command::Change(document)).is_err() {
            debug!("autosave stopped; dropping change notification");
        }
    }

    /// Asks for a save now. If one is in flight, another follows it.
    pub fn save_now(&self) {
        if self.commands.send(Command::SaveNow).is_err() {
            debug!("autosave stopped; dropping save request");
        }
    }

    /// The save indicator as of the last handled event.
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// A receiver that wakes whenever the save indicator changes.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Stops both timers and waits for the driver to exit, including any
    /// save that was already in flight.
    pub async fn shutdown(self) {
        // The driver may already be gone; joining below still succeeds.
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.driver.await {
            warn!(error = %e, "autosave driver did not exit cleanly");
        }
    }
}
