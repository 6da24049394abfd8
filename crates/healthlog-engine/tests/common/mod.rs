#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use healthlog_core::model::{LogEntry, MedicationToken, Ratings, UserId};
use healthlog_core::ops::{FixedClock, LogStore};
use healthlog_engine::{MessageOutcome, Orchestrator};
use healthlog_core_types::RequestContext;

pub const USER: &str = "+15550100";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

pub fn noon() -> NaiveDateTime {
    today().and_hms_opt(12, 0, 0).unwrap()
}

pub fn user() -> UserId {
    UserId::new(USER)
}

pub fn orchestrator(store: Arc<dyn LogStore>) -> Orchestrator {
    Orchestrator::new(store, Arc::new(FixedClock(noon())))
}

pub fn entry(date: NaiveDate, ratings: [u32; 5], meds: &[&str], note: &str) -> LogEntry {
    LogEntry {
        date,
        ratings: Ratings::from(ratings),
        meds: meds.iter().map(|m| MedicationToken::from(*m)).collect(),
        note: note.to_string(),
    }
}

pub fn send(o: &Orchestrator, text: &str) -> MessageOutcome {
    o.handle_message(&RequestContext::new(), &user(), text)
}
