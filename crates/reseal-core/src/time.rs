//! Time and duration utilities.

use chrono::{DateTime, Duration, Utc};

/// Format a duration in human-readable form.
pub fn pretty_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let secs = millis / 1000;

    if secs < 1 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

/// Elapsed time since `start`.
pub fn elapsed_since(start: DateTime<Utc>) -> Duration {
    Utc::now().signed_duration_since(start)
}
