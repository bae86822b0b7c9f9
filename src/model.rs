//! Core data model for Journee.
//!
//! An itinerary is the document being edited: a titled trip made of days,
//! each holding an ordered list of spots. Every edit produces a new
//! [`Itinerary`] value; history and autosave share snapshots through
//! [`Snapshot`].

mod edit;
mod itinerary;

use std::sync::Arc;

pub use edit::{Edit, EditError};
pub use itinerary::{Day, Itinerary, ItineraryStatus, Spot, SpotCategory};

/// An immutable, cheaply shared point-in-time itinerary.
pub type Snapshot = Arc<Itinerary>;
