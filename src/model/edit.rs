//! Edits: the actions a user (or the planner) takes on an itinerary.
//!
//! Applying an edit never mutates the source itinerary. It returns a new
//! value so the previous one can live on in the undo history.

use jiff::Timestamp;
use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};

use super::{Day, Itinerary, ItineraryStatus, Spot, SpotCategory};

/// A single change to an itinerary.
///
/// Day numbers are 1-based; spot indices are 0-based within their day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "camelCase")]
pub enum Edit {
    SetTitle { title: String },
    SetDestination { destination: Option<String> },
    SetSummary { summary: Option<String> },
    SetStartDate { date: Option<Date> },
    SetStatus { status: ItineraryStatus },

    /// Appends a day to the end of the trip.
    AddDay { title: Option<String> },

    /// Removes a day; later days shift down by one.
    RemoveDay { day: usize },

    /// Appends a spot to a day.
    AddSpot {
        day: usize,
        name: String,
        time: Option<Time>,
        category: SpotCategory,
        estimated_cost: Option<u64>,
    },

    RemoveSpot { day: usize, index: usize },

    /// Moves a spot within its day.
    MoveSpot { day: usize, from: usize, to: usize },
}

/// Why an edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no day {0}")]
    NoSuchDay(usize),

    #[error("day {day} has no spot {index}")]
    NoSuchSpot { day: usize, index: usize },

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("no itinerary is open")]
    NoDocument,
}

impl Itinerary {
    /// Applies `edit`, returning the edited copy stamped with `at`.
    pub fn apply(&self, edit: &Edit, at: Timestamp) -> Result<Itinerary, EditError> {
        let mut next = self.clone();
        match edit {
            Edit::SetTitle { title } => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(EditError::EmptyTitle);
                }
                next.title = title.to_string();
            }
            Edit::SetDestination { destination } => next.destination.clone_from(destination),
            Edit::SetSummary { summary } => next.summary.clone_from(summary),
            Edit::SetStartDate { date } => next.start_date = *date,
            Edit::SetStatus { status } => next.status = *status,
            Edit::AddDay { title } => next.days.push(Day {
                title: title.clone(),
                spots: Vec::new(),
            }),
            Edit::RemoveDay { day } => {
                let i = day_index(&next, *day)?;
                next.days.remove(i);
            }
            Edit::AddSpot {
                day,
                name,
                time,
                category,
                estimated_cost,
            } => {
                let i = day_index(&next, *day)?;
                next.days[i].spots.push(Spot {
                    time: *time,
                    estimated_cost: *estimated_cost,
                    ..Spot::new(name.clone(), *category)
                });
            }
            Edit::RemoveSpot { day, index } => {
                let spots = spots_mut(&mut next, *day, *index)?;
                spots.remove(*index);
            }
            Edit::MoveSpot { day, from, to } => {
                let spots = spots_mut(&mut next, *day, *from)?;
                if *to >= spots.len() {
                    return Err(EditError::NoSuchSpot {
                        day: *day,
                        index: *to,
                    });
                }
                let spot = spots.remove(*from);
                spots.insert(*to, spot);
            }
        }
        next.updated_at = at;
        Ok(next)
    }
}

fn day_index(itinerary: &Itinerary, day: usize) -> Result<usize, EditError> {
    match day.checked_sub(1) {
        Some(i) if i < itinerary.days.len() => Ok(i),
        _ => Err(EditError::NoSuchDay(day)),
    }
}

/// The spots of `day`, checked to contain `index`.
fn spots_mut(
    itinerary: &mut Itinerary,
    day: usize,
    index: usize,
) -> Result<&mut Vec<Spot>, EditError> {
    let i = day_index(itinerary, day)?;
    let spots = &mut itinerary.days[i].spots;
    if index >= spots.len() {
        return Err(EditError::NoSuchSpot { day, index });
    }
    Ok(spots)
}
