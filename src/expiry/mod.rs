// Expiry display for issued credentials
use chrono::{DateTime, Utc};

pub fn format_time_remaining(expires_at: &DateTime<Utc>) -> String {
    format_remaining_at(expires_at, Utc::now())
}

fn format_remaining_at(expires_at: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    if *expires_at <= now {
        return "EXPIRED".to_string();
    }

    let duration = (*expires_at - now).num_seconds();
    let hours = duration / 3600;
    let minutes = (duration % 3600) / 60;
    let seconds = duration % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// One-line expiry note, e.g. `expires at 2024-01-01 01:00:00 UTC (in 1h 0m)`
pub fn expiry_note(expires_at: &DateTime<Utc>) -> String {
    format!(
        "expires at {} (in {})",
        expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_time_remaining(expires_at)
    )
}
