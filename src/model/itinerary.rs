//! Itinerary types: the document a session edits.

use jiff::Timestamp;
use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A travel plan: a title, where it goes, and what happens each day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: Uuid,
    pub title: String,
    pub destination: Option<String>,
    pub start_date: Option<Date>,
    pub summary: Option<String>,
    pub status: ItineraryStatus,
    pub days: Vec<Day>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Itinerary {
    /// Creates an empty draft itinerary.
    pub fn new(title: impl Into<String>, at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            destination: None,
            start_date: None,
            summary: None,
            status: ItineraryStatus::Draft,
            days: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Returns the day with the given 1-based number.
    pub fn day(&self, number: usize) -> Option<&Day> {
        number.checked_sub(1).and_then(|i| self.days.get(i))
    }

    /// Calendar date of the given 1-based day, when the day exists and a
    /// start date is set.
    pub fn date_of(&self, number: usize) -> Option<Date> {
        self.day(number)?;
        let offset = i32::try_from(number - 1).ok()?;
        self.start_date
            .and_then(|start| start.checked_add(jiff::Span::new().days(offset)).ok())
    }

    /// Total number of spots across all days.
    pub fn spot_count(&self) -> usize {
        self.days.iter().map(|d| d.spots.len()).sum()
    }

    /// Sum of every spot's estimated cost, saturating at `u64::MAX`.
    pub fn estimated_total(&self) -> u64 {
        self.days
            .iter()
            .flat_map(|d| &d.spots)
            .filter_map(|s| s.estimated_cost)
            .fold(0, u64::saturating_add)
    }
}

/// Where an itinerary stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItineraryStatus {
    /// Still being planned.
    Draft,

    /// Planning is finished.
    Completed,
}

/// One day of the trip. Its number is its 1-based position in
/// [`Itinerary::days`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub title: Option<String>,
    pub spots: Vec<Spot>,
}

/// A place to visit or a thing to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: Uuid,
    pub name: String,
    pub time: Option<Time>,
    pub category: SpotCategory,
    pub estimated_cost: Option<u64>,
    pub notes: Option<String>,
}

impl Spot {
    pub fn new(name: impl Into<String>, category: SpotCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            time: None,
            category,
            estimated_cost: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpotCategory {
    #[default]
    Sightseeing,
    Food,
    Transport,
    Lodging,
    Activity,
    Other,
}

impl SpotCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sightseeing => "sightseeing",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Lodging => "lodging",
            Self::Activity => "activity",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for SpotCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sightseeing" => Ok(Self::Sightseeing),
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "lodging" => Ok(Self::Lodging),
            "activity" => Ok(Self::Activity),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown spot category: {other}")),
        }
    }
}
