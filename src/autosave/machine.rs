//! The autosave state machine.
//!
//! [`Scheduler::handle`] is the single transition function. It never sleeps
//! or does I/O: timers are requested with [`Effect::ArmDebounce`] and saves
//! with [`Effect::Persist`], and their outcomes come back as events.
//!
//! At most one save is in flight at a time, whatever triggered it. A debounce
//! that fires during a save is deferred until the save finishes, and a
//! periodic tick during a save is skipped.

use std::time::Duration;

use jiff::Timestamp;
use tracing::{debug, info, warn};

/// What caused a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The document went quiet after a change.
    Debounce,
    /// The backstop interval elapsed.
    Periodic,
    /// Someone asked for a save explicitly.
    Manual,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Debounce => "debounce",
            Self::Periodic => "periodic",
            Self::Manual => "manual",
        })
    }
}

/// Where the scheduler is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending.
    Idle,

    /// A debounce timer is running. Only a firing with this generation
    /// counts; older timers were superseded.
    DebouncePending { generation: u64 },

    /// A save is in flight.
    Saving {
        ticket: u64,
        trigger: Trigger,
        /// A debounce timer restarted by changes made during the save.
        debounce: Option<u64>,
        /// Save again as soon as this one finishes, for this trigger.
        follow_up: Option<Trigger>,
    },
}

/// Input to the state machine.
#[derive(Debug, Clone)]
pub enum Event<D> {
    /// The document changed.
    Changed(D),
    /// A debounce timer elapsed.
    DebounceElapsed { generation: u64 },
    /// The backstop timer ticked.
    PeriodicTick,
    /// An explicit save was requested.
    SaveRequested,
    /// The save with `ticket` finished, at `saved_at` on success or with an
    /// error message on failure.
    SaveFinished {
        ticket: u64,
        outcome: Result<Timestamp, String>,
    },
}

/// Work the driver must do on behalf of the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<D> {
    /// Start (or restart) the debounce timer. Any earlier timer is void.
    ArmDebounce { generation: u64, delay: Duration },
    /// Hand `document` to the persistence collaborator.
    Persist {
        ticket: u64,
        trigger: Trigger,
        document: D,
    },
}

/// What the save indicator shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    pub is_saving: bool,
    /// Set only when a save is confirmed.
    pub last_save_time: Option<Timestamp>,
    /// The most recent failure, cleared by the next success.
    pub last_error: Option<String>,
}

/// Decides when the current document gets persisted.
#[derive(Debug)]
pub struct Scheduler<D> {
    debounce: Duration,
    phase: Phase,
    current: Option<D>,
    hydrated: bool,
    generation: u64,
    ticket: u64,
    status: SaveStatus,
}

impl<D: Clone> Scheduler<D> {
    /// Creates an idle scheduler with the given debounce delay.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            phase: Phase::Idle,
            current: None,
            hydrated: false,
            generation: 0,
            ticket: 0,
            status: SaveStatus::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// The latest document seen, if any.
    pub fn current(&self) -> Option<&D> {
        self.current.as_ref()
    }

    /// Applies one event and returns the effects it requires.
    pub fn handle(&mut self, event: Event<D>) -> Vec<Effect<D>> {
        match event {
            Event::Changed(document) => self.on_change(document),
            Event::DebounceElapsed { generation } => self.on_debounce(generation),
            Event::PeriodicTick => self.on_tick(),
            Event::SaveRequested => self.on_request(),
            Event::SaveFinished { ticket, outcome } => self.on_finished(ticket, outcome),
        }
    }

    fn on_change(&mut self, document: D) -> Vec<Effect<D>> {
        self.current = Some(document);
        if !self.hydrated {
            // The first notification is the initial load, not an edit.
            self.hydrated = true;
            debug!("initial document observed; not scheduling a save");
            return Vec::new();
        }

        self.generation += 1;
        let generation = self.generation;
        match &mut self.phase {
            Phase::Saving {
                debounce,
                follow_up,
                ..
            } => {
                // A fresh quiet period supersedes any deferred save.
                *debounce = Some(generation);
                *follow_up = None;
            }
            phase => *phase = Phase::DebouncePending { generation },
        }
        vec![Effect::ArmDebounce {
            generation,
            delay: self.debounce,
        }]
    }

    fn on_debounce(&mut self, generation: u64) -> Vec<Effect<D>> {
        match self.phase {
            Phase::DebouncePending { generation: pending } if pending == generation => {
                self.start_save(Trigger::Debounce, None)
            }
            Phase::Saving {
                ticket,
                trigger,
                debounce: Some(pending),
                ..
            } if pending == generation => {
                debug!(ticket, "save in flight; deferring debounced save");
                self.phase = Phase::Saving {
                    ticket,
                    trigger,
                    debounce: None,
                    follow_up: Some(Trigger::Debounce),
                };
                Vec::new()
            }
            _ => {
                debug!(generation, "ignoring superseded debounce timer");
                Vec::new()
            }
        }
    }

    fn on_tick(&mut self) -> Vec<Effect<D>> {
        match self.phase {
            Phase::Saving { ticket, .. } => {
                debug!(ticket, "save in flight; skipping periodic save");
                Vec::new()
            }
            Phase::DebouncePending { generation } => {
                self.start_save(Trigger::Periodic, Some(generation))
            }
            Phase::Idle => self.start_save(Trigger::Periodic, None),
        }
    }

    fn on_request(&mut self) -> Vec<Effect<D>> {
        match self.phase {
            Phase::Saving {
                ticket,
                trigger,
                debounce,
                ..
            } => {
                self.phase = Phase::Saving {
                    ticket,
                    trigger,
                    debounce,
                    follow_up: Some(Trigger::Manual),
                };
                Vec::new()
            }
            Phase::DebouncePending { generation } => {
                self.start_save(Trigger::Manual, Some(generation))
            }
            Phase::Idle => self.start_save(Trigger::Manual, None),
        }
    }

    fn on_finished(&mut self, ticket: u64, outcome: Result<Timestamp, String>) -> Vec<Effect<D>> {
        let Phase::Saving {
            ticket: in_flight,
            trigger,
            debounce,
            follow_up,
        } = self.phase
        else {
            debug!(ticket, "ignoring outcome of unknown save");
            return Vec::new();
        };
        if in_flight != ticket {
            debug!(ticket, in_flight, "ignoring outcome of stale save");
            return Vec::new();
        }

        self.status.is_saving = false;
        match outcome {
            Ok(saved_at) => {
                info!(ticket, %trigger, %saved_at, "autosave complete");
                self.status.last_save_time = Some(saved_at);
                self.status.last_error = None;
            }
            Err(error) => {
                warn!(ticket, %trigger, %error, "autosave failed");
                self.status.last_error = Some(error);
            }
        }

        self.phase = match debounce {
            Some(generation) => Phase::DebouncePending { generation },
            None => Phase::Idle,
        };
        if let Some(next) = follow_up {
            return self.start_save(next, debounce);
        }
        Vec::new()
    }

    /// Moves to `Saving` if there is a document to save. `debounce` is a
    /// pending debounce timer that keeps running across the save.
    fn start_save(&mut self, trigger: Trigger, debounce: Option<u64>) -> Vec<Effect<D>> {
        let Some(document) = self.current.clone() else {
            debug!(%trigger, "no current document; nothing to save");
            self.phase = match debounce {
                Some(generation) => Phase::DebouncePending { generation },
                None => Phase::Idle,
            };
            return Vec::new();
        };

        self.ticket += 1;
        let ticket = self.ticket;
        self.phase = Phase::Saving {
            ticket,
            trigger,
            debounce,
            follow_up: None,
        };
        self.status.is_saving = true;
        debug!(ticket, %trigger, "starting save");
        vec![Effect::Persist {
            ticket,
            trigger,
            document,
        }]
    }
}
