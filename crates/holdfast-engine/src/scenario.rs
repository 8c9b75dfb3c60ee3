//! Scenario Content Generator.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;

/// Millisecond resolution: one clock tick is 1 ms.
const BASE_ID_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const RECORD_ID_FORMAT: &str = "%H%M%S";

/// Unique strings for one workflow run.
///
/// Every value derives from a single timestamp, so two scenarios created
/// at least one tick apart never share an identifier and no counter has
/// to be coordinated between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioContent {
    base_id: String,
    record_id: String,
}

impl ScenarioContent {
    pub fn new_scenario() -> Self {
        let now = Utc::now();
        Self::at_instant(now, now.with_timezone(&Local).naive_local())
    }

    /// Content for a fixed wall-clock time, with the base id taken from
    /// the same reading.
    pub fn at(now: NaiveDateTime) -> Self {
        Self::at_instant(now.and_utc(), now)
    }

    /// The base id follows UTC, which never repeats when local clocks fall
    /// back. The record id keeps the local time the target displays.
    pub fn at_instant(utc: DateTime<Utc>, local: NaiveDateTime) -> Self {
        Self {
            base_id: utc.format(BASE_ID_FORMAT).to_string(),
            record_id: local.format(RECORD_ID_FORMAT).to_string(),
        }
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    /// Six-digit `HHMMSS` id, the shape the target's record id field accepts.
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{} {}", prefix, self.base_id)
    }

    pub fn post_message(&self) -> String {
        self.with_prefix("Automated buzz post")
    }

    pub fn updated_post_message(&self) -> String {
        self.with_prefix("Updated buzz post")
    }

    pub fn comment(&self) -> String {
        self.with_prefix("Automated comment")
    }

    pub fn updated_comment(&self) -> String {
        self.with_prefix("Updated comment")
    }

    pub fn report_name(&self) -> String {
        self.with_prefix("Auto PIM Report")
    }

    /// `prefix` followed by the minutes and seconds of the record id.
    pub fn first_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, &self.record_id[2..])
    }

    pub fn username(&self) -> String {
        format!("auto.user.{}", self.base_id)
    }

    pub fn candidate_email(&self) -> String {
        format!("candidate.{}@example.com", self.base_id)
    }
}
