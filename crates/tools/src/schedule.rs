//! Fire-and-forget deferred jobs.
//!
//! Submission returns immediately with a confirmation string; the `when`
//! timestamp is only validated inside the spawned task, so a malformed
//! timestamp surfaces when the job is due to run, not at submission.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use tracing::{info, warn};

pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Hand a deferred job to the runtime and return a confirmation string.
    /// The core holds no further state about the job after submission.
    pub fn submit(&self, title: &str, note: &str, when: &str) -> String {
        let confirmation = format!("Scheduled {title} at {when}");

        let title = title.to_string();
        let note = note.to_string();
        let when = when.to_string();

        tokio::spawn(async move {
            let Some(fire_at) = parse_when(&when) else {
                warn!(title = %title, when = %when, "Scheduled job rejected: unparseable time");
                return;
            };

            let delay = (fire_at - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(delay).await;

            info!(title = %title, "Scheduled job fired");
            println!("[TASK] {title}: {note}");
        });

        confirmation
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM[:SS]` local time.
fn parse_when(when: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(when) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(when, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    None
}
