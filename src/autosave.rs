//! Autosave: deciding when to persist the document being edited.
//!
//! The decision logic lives in [`Scheduler`], a synchronous state machine
//! fed one [`Event`] at a time and answering with [`Effect`]s. The tokio
//! driver in [`runtime`] owns the real timers and the in-flight save, and
//! turns their completions back into events.
//!
//! ```text
//!            change                debounce fired
//!   Idle ───────────▶ DebouncePending ───────────▶ Saving
//!    ▲                   ▲    │ change (restart)     │
//!    │                   └────┘                      │
//!    └──────────────── save finished ◀───────────────┘
//! ```
//!
//! The periodic backstop moves Idle or DebouncePending straight to Saving
//! without touching a pending debounce.

mod machine;
mod persist;
mod runtime;

pub use machine::{Effect, Event, Phase, SaveStatus, Scheduler, Trigger};
pub use persist::{Persist, PersistError};
pub use runtime::{AutoSave, AutoSaveHandle, AutoSaveSettings};
