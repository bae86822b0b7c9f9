//! Human-readable output for itineraries and save status.

use std::fmt::Write;

use uuid::Uuid;

use crate::autosave::SaveStatus;
use crate::model::{Itinerary, ItineraryStatus};

/// The first eight characters of an ID, enough to address it.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn status_label(status: ItineraryStatus) -> &'static str {
    match status {
        ItineraryStatus::Draft => "draft",
        ItineraryStatus::Completed => "completed",
    }
}

/// One line per itinerary for `journee list`.
pub fn summary_line(it: &Itinerary) -> String {
    let destination = it.destination.as_deref().unwrap_or("-");
    format!(
        "{}  [{}]  {}  ({destination}, {} days, {} spots)",
        short_id(it.id),
        status_label(it.status),
        it.title,
        it.days.len(),
        it.spot_count(),
    )
}

/// The full itinerary, day by day.
pub fn itinerary(it: &Itinerary) -> String {
    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", it.title, status_label(it.status));
    let _ = writeln!(out, "  id: {}", it.id);
    if let Some(destination) = &it.destination {
        let _ = writeln!(out, "  destination: {destination}");
    }
    if let Some(start) = it.start_date {
        let _ = writeln!(out, "  starts: {start}");
    }
    if let Some(summary) = &it.summary {
        let _ = writeln!(out, "  summary: {summary}");
    }

    if it.days.is_empty() {
        let _ = writeln!(out, "\nNo days planned yet");
    }
    for (i, day) in it.days.iter().enumerate() {
        let number = i + 1;
        let _ = write!(out, "\nDay {number}");
        if let Some(date) = it.date_of(number) {
            let _ = write!(out, " ({date})");
        }
        if let Some(title) = &day.title {
            let _ = write!(out, ": {title}");
        }
        out.push('\n');

        for (j, spot) in day.spots.iter().enumerate() {
            let time = spot
                .time
                .map_or_else(|| "--:--".to_string(), |t| t.strftime("%H:%M").to_string());
            let _ = write!(
                out,
                "  {}. {time}  {} [{}]",
                j + 1,
                spot.name,
                spot.category.label()
            );
            if let Some(cost) = spot.estimated_cost {
                let _ = write!(out, "  ~{cost}");
            }
            out.push('\n');
        }
    }

    let total = it.estimated_total();
    if total > 0 {
        let _ = writeln!(out, "\nEstimated cost: {total}");
    }
    out
}

/// The save indicator as one line.
pub fn save_status(status: &SaveStatus) -> String {
    let mut line = if status.is_saving {
        "saving...".to_string()
    } else {
        match status.last_save_time {
            Some(at) => format!("saved at {at}"),
            None => "not saved this session".to_string(),
        }
    };
    if let Some(error) = &status.last_error {
        let _ = write!(line, " (last attempt failed: {error})");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{Day, Spot, SpotCategory};

    fn sample() -> Itinerary {
        let mut it = Itinerary::new("Kyoto", Timestamp::UNIX_EPOCH);
        it.destination = Some("Japan".into());
        it.start_date = Some(jiff::civil::date(2026, 4, 1));
        it.days.push(Day {
            title: Some("Arrival".into()),
            spots: vec![Spot {
                time: Some(jiff::civil::time(9, 0, 0, 0)),
                estimated_cost: Some(500),
                ..Spot::new("Fushimi Inari", SpotCategory::Sightseeing)
            }],
        });
        it
    }

    #[test]
    fn itinerary_lists_days_and_spots() {
        let text = itinerary(&sample());
        assert!(text.starts_with("Kyoto  [draft]\n"));
        assert!(text.contains("Day 1 (2026-04-01): Arrival\n"));
        assert!(text.contains("  1. 09:00  Fushimi Inari [sightseeing]  ~500\n"));
        assert!(text.contains("Estimated cost: 500"));
    }

    #[test]
    fn summary_line_counts() {
        let line = summary_line(&sample());
        assert!(line.contains("[draft]  Kyoto  (Japan, 1 days, 1 spots)"));
    }

    #[test]
    fn save_status_lines() {
        assert_eq!(save_status(&SaveStatus::default()), "not saved this session");

        let saving = SaveStatus {
            is_saving: true,
            ..SaveStatus::default()
        };
        assert_eq!(save_status(&saving), "saving...");

        let failed = SaveStatus {
            last_save_time: Some(Timestamp::UNIX_EPOCH),
            last_error: Some("disk full".into()),
            ..SaveStatus::default()
        };
        assert_eq!(
            save_status(&failed),
            "saved at 1970-01-01T00:00:00Z (last attempt failed: disk full)"
        );
    }
}
