//! # Agreement Events
//!
//! Observers and indexers consume these. Each successful terminal
//! transition appends exactly one record to the agreement's event log and
//! emits it as a structured `tracing` event.

use serde::{Deserialize, Serialize};

use crid_core::{Identity, Timestamp};

/// An event emitted by a successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgreementEvent {
    /// The student redeemed a coordinator-signed course list.
    EnrollmentFinalized {
        /// The enrolled student.
        student: Identity,
        /// The authorized courses, in signed order.
        courses: Vec<String>,
    },
    /// The coordinator cancelled after the deadline passed unredeemed.
    EnrollmentCancelled,
}

impl AgreementEvent {
    /// Event name as observers see it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnrollmentFinalized { .. } => "EnrollmentFinalized",
            Self::EnrollmentCancelled => "EnrollmentCancelled",
        }
    }
}

/// An event with the time of the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementEventRecord {
    /// The event.
    pub event: AgreementEvent,
    /// The `now` supplied to the transition.
    pub timestamp: Timestamp,
}
