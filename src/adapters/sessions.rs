//! Mindfulness session adapter
//!
//! Sessions have no required keys: a row missing its endpoints still counts
//! as a session, it just has no duration.

use crate::error::IngestError;
use crate::types::{Domain, MindfulSession, Mood, SessionKind};

use super::{get_day, get_encoded, get_str, get_timestamp, Attributes, ExportAdapter};

impl ExportAdapter for MindfulSession {
    const DOMAIN: Domain = Domain::Session;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        let start_datetime = get_timestamp(attrs, "start_datetime");
        let day = get_day(attrs, "day").or_else(|| start_datetime.as_ref().map(|t| t.date()));

        Ok(Self {
            id: get_str(attrs, "id"),
            day,
            start_datetime,
            end_datetime: get_timestamp(attrs, "end_datetime"),
            kind: get_str(attrs, "type").map(|s| SessionKind::parse(&s)),
            mood: get_str(attrs, "mood").map(|s| Mood::parse(&s)),
            heart_rate: get_encoded(attrs, "heart_rate"),
        })
    }
}
