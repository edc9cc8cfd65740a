//! Match schedule and the status derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Postponed,
    Cancelled,
}

/// Statuses an operator sets by hand; they are never derived from the clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualStatus {
    Postponed,
    Cancelled,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSchedule {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub manual_status: Option<ManualStatus>,
}

impl MatchSchedule {
    /// Status at `now`. A manual status wins, then a recorded result, then the clock:
    /// past `ended_at` is completed, past `started_at` (or `scheduled_at` when not started) is live.
    pub fn status_at(&self, now: DateTime<Utc>, has_result: bool) -> MatchStatus {
        match self.manual_status {
            Some(ManualStatus::Postponed) => return MatchStatus::Postponed,
            Some(ManualStatus::Cancelled) => return MatchStatus::Cancelled,
            None => {}
        }
        if has_result {
            return MatchStatus::Completed;
        }
        if self.ended_at.is_some_and(|end| end <= now) {
            return MatchStatus::Completed;
        }
        match self.started_at.or(self.scheduled_at) {
            Some(start) if start <= now => MatchStatus::Live,
            _ => MatchStatus::Scheduled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn manual_status_overrides_clock() {
        let now = Utc::now();
        let s = MatchSchedule {
            started_at: Some(now - Duration::hours(1)),
            manual_status: Some(ManualStatus::Postponed),
            ..Default::default()
        };
        assert_eq!(s.status_at(now, false), MatchStatus::Postponed);
    }

    #[test]
    fn clock_drives_scheduled_live_completed() {
        let now = Utc::now();
        let mut s = MatchSchedule {
            scheduled_at: Some(now + Duration::minutes(30)),
            ..Default::default()
        };
        assert_eq!(s.status_at(now, false), MatchStatus::Scheduled);
        s.scheduled_at = Some(now - Duration::minutes(1));
        assert_eq!(s.status_at(now, false), MatchStatus::Live);
        s.ended_at = Some(now - Duration::seconds(5));
        assert_eq!(s.status_at(now, false), MatchStatus::Completed);
    }

    #[test]
    fn result_completes_unscheduled_match() {
        let s = MatchSchedule::default();
        assert_eq!(s.status_at(Utc::now(), true), MatchStatus::Completed);
    }
}
