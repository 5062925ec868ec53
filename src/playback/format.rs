//! Builds the text shown in the presence client

use chrono::{DateTime, Duration, Utc};

use super::PlaybackEvent;

/// Actor lists longer than this are summarized by count
const MAX_LISTED_ACTORS: usize = 3;

/// Activity ready to be published to a presence session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayActivity {
    pub state: String,
    pub details: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Format an event using the current wall clock as the window start
pub fn format(event: &PlaybackEvent) -> DisplayActivity {
    format_at(event, Utc::now())
}

pub fn format_at(event: &PlaybackEvent, now: DateTime<Utc>) -> DisplayActivity {
    // Saturate instead of overflowing on absurd durations
    let seconds = i64::try_from(event.seconds_remaining).unwrap_or(i64::MAX);
    let end = Duration::try_seconds(seconds)
        .and_then(|remaining| now.checked_add_signed(remaining))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    DisplayActivity {
        state: state_line(event),
        details: details_line(event),
        start: now,
        end,
    }
}

fn state_line(event: &PlaybackEvent) -> String {
    let count = event.actors.len();
    if count == 0 {
        return String::new();
    }

    if count > MAX_LISTED_ACTORS {
        return format!("Starring {} actors", count);
    }

    let mut names: Vec<&str> = event.actor_names().take(MAX_LISTED_ACTORS).collect();
    names.sort_unstable();
    format!("Starring {}", names.join(", "))
}

fn details_line(event: &PlaybackEvent) -> String {
    if event.studio.is_empty() {
        event.title.clone()
    } else {
        format!("({}) {}", event.studio, event.title)
    }
}
