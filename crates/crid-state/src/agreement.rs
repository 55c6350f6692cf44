//! # Enrollment Agreement State Machine
//!
//! A coordinator pre-authorizes an ordered course list for one student by
//! signature. The student redeems it before the deadline, or the
//! coordinator cancels once the deadline has passed.
//!
//! ## States
//!
//! ```text
//! Pending ──enroll(valid)──────────▶ Enrolled   [EnrollmentFinalized]
//!    │
//!    └─────cancel_by_timeout(valid)─▶ Cancelled [EnrollmentCancelled]
//!
//! Enrolled | Cancelled ──(any)──▶ AlreadyEnrolled
//! ```
//!
//! ## Check Order
//!
//! `enroll`: caller is student → `now <= deadline` → not finalized →
//! signature recovers to the coordinator.
//!
//! `cancel_by_timeout`: caller is coordinator → `now > deadline` → not
//! finalized.
//!
//! The first failing check determines the error. Signature recovery runs
//! last, after every cheap field comparison has passed.
//!
//! ## Atomicity
//!
//! Each operation runs all of its checks before touching any field. A
//! rejected call leaves the agreement byte-for-byte unchanged.
//!
//! ## Clock
//!
//! Every operation takes `now` from the caller. The agreement never reads
//! the wall clock.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crid_core::{AgreementId, Identity, Timestamp};
use crid_crypto::{course_list_hash, recover_signer, signed_message_digest};

use crate::error::{AgreementError, CancelError, CreateError, EnrollError};
use crate::event::{AgreementEvent, AgreementEventRecord};

// ─── Agreement Status ────────────────────────────────────────────────

/// The lifecycle state of an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgreementStatus {
    /// Awaiting redemption or cancellation.
    Pending,
    /// The student redeemed the authorization (terminal).
    Enrolled,
    /// The coordinator cancelled after the deadline (terminal).
    Cancelled,
}

impl AgreementStatus {
    /// Whether this state is terminal (the agreement is finalized).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Enrolled | Self::Cancelled)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Enrolled => "ENROLLED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Agreement ───────────────────────────────────────────────────────

/// A single enrollment agreement between one coordinator and one student.
///
/// Identities, creation time, and deadline are fixed at construction and
/// exposed only through accessors. Persisted agreements are re-validated on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AgreementRecord", into = "AgreementRecord")]
pub struct Agreement {
    id: AgreementId,
    coordinator: Identity,
    student: Identity,
    created_at: Timestamp,
    enrollment_deadline: Timestamp,
    status: AgreementStatus,
    enrolled_courses: Vec<String>,
    events: Vec<AgreementEventRecord>,
}

impl Agreement {
    /// Create a pending agreement whose deadline is `now + duration_secs`.
    ///
    /// A zero duration is allowed: the student may still enroll at exactly
    /// `now`, and the window is closed one second later.
    pub fn create(
        coordinator: Identity,
        student: Identity,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<Self, CreateError> {
        let enrollment_deadline = now
            .checked_add_secs(duration_secs)
            .ok_or(CreateError::Overflow { duration_secs })?;

        if coordinator == student {
            warn!(%coordinator, "coordinator and student are the same identity");
        }

        let agreement = Self {
            id: AgreementId::new(),
            coordinator,
            student,
            created_at: now,
            enrollment_deadline,
            status: AgreementStatus::Pending,
            enrolled_courses: Vec::new(),
            events: Vec::new(),
        };
        info!(
            agreement = %agreement.id,
            %coordinator,
            %student,
            deadline = %enrollment_deadline,
            "agreement created"
        );
        Ok(agreement)
    }

    /// Redeem a coordinator-signed course list.
    ///
    /// `signature` is the encoded enrollment signature produced by
    /// [`crid_crypto::sign_enrollment`]. On success the courses are stored
    /// in the given order and `EnrollmentFinalized` is emitted.
    pub fn enroll(
        &mut self,
        caller: &Identity,
        courses: &[String],
        signature: &[u8],
        now: Timestamp,
    ) -> Result<(), EnrollError> {
        if let Err(err) = self.authorize_enrollment(caller, courses, signature, now) {
            debug!(agreement = %self.id, %caller, code = err.code(), "enroll rejected: {err}");
            return Err(err);
        }

        self.enrolled_courses = courses.to_vec();
        self.status = AgreementStatus::Enrolled;
        self.emit(
            AgreementEvent::EnrollmentFinalized {
                student: self.student,
                courses: courses.to_vec(),
            },
            now,
        );
        Ok(())
    }

    /// Cancel an unredeemed agreement after its deadline.
    ///
    /// The course list stays empty and `EnrollmentCancelled` is emitted.
    pub fn cancel_by_timeout(&mut self, caller: &Identity, now: Timestamp) -> Result<(), CancelError> {
        if let Err(err) = self.authorize_cancellation(caller, now) {
            debug!(agreement = %self.id, %caller, code = err.code(), "cancel rejected: {err}");
            return Err(err);
        }

        self.status = AgreementStatus::Cancelled;
        self.emit(AgreementEvent::EnrollmentCancelled, now);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The agreement handle.
    pub fn id(&self) -> AgreementId {
        self.id
    }

    /// The identity allowed to sign course lists and to cancel.
    pub fn coordinator(&self) -> &Identity {
        &self.coordinator
    }

    /// The identity allowed to redeem.
    pub fn student(&self) -> &Identity {
        &self.student
    }

    /// The creation-time clock reading.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last instant at which `enroll` is accepted.
    pub fn enrollment_deadline(&self) -> Timestamp {
        self.enrollment_deadline
    }

    /// Three-state lifecycle status.
    pub fn status(&self) -> AgreementStatus {
        self.status
    }

    /// Whether either terminal operation has succeeded.
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }

    /// `true` once the agreement is finalized, including after a timeout
    /// cancellation. Use [`status()`](Self::status) to tell the two apart.
    pub fn is_enrolled(&self) -> bool {
        self.is_finalized()
    }

    /// The enrolled courses in signed order; empty until a successful enroll.
    pub fn enrolled_courses(&self) -> &[String] {
        &self.enrolled_courses
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[AgreementEventRecord] {
        &self.events
    }

    /// Seconds until the deadline; 0 at or after it.
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        now.secs_until(&self.enrollment_deadline)
    }

    /// Whether a valid `enroll` by the student would be accepted at `now`.
    pub fn is_enrollment_open(&self, now: Timestamp) -> bool {
        !self.is_finalized() && now <= self.enrollment_deadline
    }

    /// Whether `cancel_by_timeout` by the coordinator would be accepted at `now`.
    pub fn is_cancellable(&self, now: Timestamp) -> bool {
        !self.is_finalized() && now > self.enrollment_deadline
    }

    // ── Internals ────────────────────────────────────────────────────

    fn authorize_enrollment(
        &self,
        caller: &Identity,
        courses: &[String],
        signature: &[u8],
        now: Timestamp,
    ) -> Result<(), EnrollError> {
        if *caller != self.student {
            return Err(EnrollError::NotTheStudent);
        }
        if now > self.enrollment_deadline {
            return Err(EnrollError::DeadlineExpired);
        }
        if self.is_finalized() {
            return Err(EnrollError::AlreadyEnrolled);
        }

        let digest = signed_message_digest(&course_list_hash(courses));
        let signer = recover_signer(&digest, signature).map_err(|e| EnrollError::InvalidSignature {
            reason: e.to_string(),
        })?;
        if signer != self.coordinator {
            return Err(EnrollError::InvalidSignature {
                reason: format!("signed by {signer}, not the coordinator"),
            });
        }
        Ok(())
    }

    fn authorize_cancellation(&self, caller: &Identity, now: Timestamp) -> Result<(), CancelError> {
        if *caller != self.coordinator {
            return Err(CancelError::NotTheCoordinator);
        }
        if now <= self.enrollment_deadline {
            return Err(CancelError::DeadlineNotReached);
        }
        if self.is_finalized() {
            return Err(CancelError::AlreadyEnrolled);
        }
        Ok(())
    }

    fn emit(&mut self, event: AgreementEvent, now: Timestamp) {
        match &event {
            AgreementEvent::EnrollmentFinalized { student, courses } => info!(
                agreement = %self.id,
                event = event.name(),
                %student,
                ?courses,
                "enrollment finalized"
            ),
            AgreementEvent::EnrollmentCancelled => info!(
                agreement = %self.id,
                event = event.name(),
                "enrollment cancelled"
            ),
        }
        self.events.push(AgreementEventRecord {
            event,
            timestamp: now,
        });
    }
}

// ─── Persistence Shape ───────────────────────────────────────────────

/// Serialized form of an [`Agreement`]; converted back with invariant checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AgreementRecord {
    id: AgreementId,
    coordinator: Identity,
    student: Identity,
    created_at: Timestamp,
    enrollment_deadline: Timestamp,
    status: AgreementStatus,
    #[serde(default)]
    enrolled_courses: Vec<String>,
    #[serde(default)]
    events: Vec<AgreementEventRecord>,
}

impl From<Agreement> for AgreementRecord {
    fn from(a: Agreement) -> Self {
        Self {
            id: a.id,
            coordinator: a.coordinator,
            student: a.student,
            created_at: a.created_at,
            enrollment_deadline: a.enrollment_deadline,
            status: a.status,
            enrolled_courses: a.enrolled_courses,
            events: a.events,
        }
    }
}

impl TryFrom<AgreementRecord> for Agreement {
    type Error = AgreementError;

    fn try_from(r: AgreementRecord) -> Result<Self, Self::Error> {
        if r.enrollment_deadline < r.created_at {
            return Err(AgreementError::Corrupt(format!(
                "deadline {} precedes creation {}",
                r.enrollment_deadline, r.created_at
            )));
        }
        if r.status != AgreementStatus::Enrolled && !r.enrolled_courses.is_empty() {
            return Err(AgreementError::Corrupt(format!(
                "{} agreement carries an enrolled course list",
                r.status
            )));
        }
        let expected_event = match r.status {
            AgreementStatus::Pending => None,
            AgreementStatus::Enrolled => Some("EnrollmentFinalized"),
            AgreementStatus::Cancelled => Some("EnrollmentCancelled"),
        };
        let actual_events: Vec<&str> = r.events.iter().map(|e| e.event.name()).collect();
        if actual_events != expected_event.into_iter().collect::<Vec<_>>() {
            return Err(AgreementError::Corrupt(format!(
                "{} agreement has event log {actual_events:?}",
                r.status
            )));
        }
        if let Some(record) = r.events.first() {
            check_event_record(&r, record)?;
        }
        Ok(Self {
            id: r.id,
            coordinator: r.coordinator,
            student: r.student,
            created_at: r.created_at,
            enrollment_deadline: r.enrollment_deadline,
            status: r.status,
            enrolled_courses: r.enrolled_courses,
            events: r.events,
        })
    }
}

/// The terminal event must describe the record it belongs to.
fn check_event_record(
    r: &AgreementRecord,
    record: &AgreementEventRecord,
) -> Result<(), AgreementError> {
    if record.timestamp < r.created_at {
        return Err(AgreementError::Corrupt(format!(
            "event at {} precedes creation {}",
            record.timestamp, r.created_at
        )));
    }
    match &record.event {
        AgreementEvent::EnrollmentFinalized { student, courses } => {
            if *student != r.student {
                return Err(AgreementError::Corrupt(format!(
                    "enrollment event names {student}, not the student {}",
                    r.student
                )));
            }
            if *courses != r.enrolled_courses {
                return Err(AgreementError::Corrupt(
                    "enrollment event courses differ from the enrolled course list".to_string(),
                ));
            }
            if record.timestamp > r.enrollment_deadline {
                return Err(AgreementError::Corrupt(format!(
                    "enrollment at {} is after the deadline {}",
                    record.timestamp, r.enrollment_deadline
                )));
            }
        }
        AgreementEvent::EnrollmentCancelled => {
            if record.timestamp <= r.enrollment_deadline {
                return Err(AgreementError::Corrupt(format!(
                    "cancellation at {} is not after the deadline {}",
                    record.timestamp, r.enrollment_deadline
                )));
            }
        }
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crid_crypto::{sign_enrollment, Ed25519KeyPair};

    const DURATION: u64 = 2 * 24 * 60 * 60;
    const T0: i64 = 1_767_225_600;

    fn at(offset: i64) -> Timestamp {
        Timestamp::from_epoch_secs(T0 + offset).unwrap()
    }

    fn courses() -> Vec<String> {
        vec!["CS101".into(), "MA211".into(), "PH301".into()]
    }

    struct Parties {
        coordinator: Ed25519KeyPair,
        student: Ed25519KeyPair,
        other: Ed25519KeyPair,
    }

    fn parties() -> Parties {
        Parties {
            coordinator: Ed25519KeyPair::from_seed(&[1u8; 32]),
            student: Ed25519KeyPair::from_seed(&[2u8; 32]),
            other: Ed25519KeyPair::from_seed(&[3u8; 32]),
        }
    }

    fn make_agreement(p: &Parties) -> Agreement {
        Agreement::create(p.coordinator.identity(), p.student.identity(), DURATION, at(0)).unwrap()
    }

    fn coordinator_signature(p: &Parties, c: &[String]) -> Vec<u8> {
        sign_enrollment(&p.coordinator, c).to_bytes().to_vec()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_create_sets_parties_and_deadline() {
        let p = parties();
        let a = make_agreement(&p);
        assert_eq!(a.coordinator(), &p.coordinator.identity());
        assert_eq!(a.student(), &p.student.identity());
        assert_eq!(a.created_at(), at(0));
        assert_eq!(a.enrollment_deadline(), at(DURATION as i64));
        assert_eq!(a.status(), AgreementStatus::Pending);
        assert!(!a.is_enrolled());
        assert!(a.enrolled_courses().is_empty());
        assert!(a.events().is_empty());
    }

    #[test]
    fn test_create_overflow() {
        let p = parties();
        let err = Agreement::create(p.coordinator.identity(), p.student.identity(), u64::MAX, at(0))
            .unwrap_err();
        assert_eq!(err, CreateError::Overflow { duration_secs: u64::MAX });
    }

    #[test]
    fn test_zero_duration_allows_enroll_at_creation_instant_only() {
        let p = parties();
        let mut a =
            Agreement::create(p.coordinator.identity(), p.student.identity(), 0, at(0)).unwrap();
        assert_eq!(a.enrollment_deadline(), at(0));
        let sig = coordinator_signature(&p, &courses());

        let mut late = a.clone();
        assert_eq!(
            late.enroll(&p.student.identity(), &courses(), &sig, at(1)),
            Err(EnrollError::DeadlineExpired)
        );
        a.enroll(&p.student.identity(), &courses(), &sig, at(0)).unwrap();
        assert_eq!(a.status(), AgreementStatus::Enrolled);
    }

    // ── Enrollment ───────────────────────────────────────────────────

    #[test]
    fn test_enroll_happy_path() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(10)).unwrap();

        assert!(a.is_enrolled());
        assert_eq!(a.status(), AgreementStatus::Enrolled);
        assert_eq!(a.enrolled_courses(), courses().as_slice());
        assert_eq!(a.events().len(), 1);
        assert_eq!(
            a.events()[0].event,
            AgreementEvent::EnrollmentFinalized {
                student: p.student.identity(),
                courses: courses(),
            }
        );
        assert_eq!(a.events()[0].timestamp, at(10));
    }

    #[test]
    fn test_enroll_at_exact_deadline_accepted() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(DURATION as i64))
            .unwrap();
    }

    #[test]
    fn test_enroll_by_non_student() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        for caller in [p.other.identity(), p.coordinator.identity()] {
            assert_eq!(
                a.enroll(&caller, &courses(), &sig, at(10)),
                Err(EnrollError::NotTheStudent)
            );
        }
        assert_eq!(a.status(), AgreementStatus::Pending);
    }

    #[test]
    fn test_enroll_signed_by_other() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = sign_enrollment(&p.other, &courses()).to_bytes();
        assert!(matches!(
            a.enroll(&p.student.identity(), &courses(), &sig, at(10)),
            Err(EnrollError::InvalidSignature { .. })
        ));
        assert!(!a.is_finalized());
        assert!(a.enrolled_courses().is_empty());
    }

    #[test]
    fn test_enroll_signature_self_signed_by_student() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = sign_enrollment(&p.student, &courses()).to_bytes();
        assert!(matches!(
            a.enroll(&p.student.identity(), &courses(), &sig, at(10)),
            Err(EnrollError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_enroll_after_deadline() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        assert_eq!(
            a.enroll(&p.student.identity(), &courses(), &sig, at(DURATION as i64 + 1)),
            Err(EnrollError::DeadlineExpired)
        );
    }

    #[test]
    fn test_enroll_twice() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(10)).unwrap();
        assert_eq!(
            a.enroll(&p.student.identity(), &courses(), &sig, at(11)),
            Err(EnrollError::AlreadyEnrolled)
        );
        assert_eq!(a.events().len(), 1);
    }

    #[test]
    fn test_enroll_reordered_courses_rejected() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        let mut reordered = courses();
        reordered.swap(0, 2);
        assert!(matches!(
            a.enroll(&p.student.identity(), &reordered, &sig, at(10)),
            Err(EnrollError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_enroll_malformed_signature() {
        let p = parties();
        let mut a = make_agreement(&p);
        for sig in [vec![], vec![0u8; 65], vec![0xffu8; 96]] {
            assert!(matches!(
                a.enroll(&p.student.identity(), &courses(), &sig, at(10)),
                Err(EnrollError::InvalidSignature { .. })
            ));
        }
    }

    #[test]
    fn test_enroll_check_order() {
        let p = parties();
        let mut a = make_agreement(&p);
        let bad_sig = [0u8; 3];
        // Wrong caller beats expired deadline and bad signature.
        assert_eq!(
            a.enroll(&p.other.identity(), &courses(), &bad_sig, at(DURATION as i64 + 5)),
            Err(EnrollError::NotTheStudent)
        );
        // Expired deadline beats bad signature.
        assert_eq!(
            a.enroll(&p.student.identity(), &courses(), &bad_sig, at(DURATION as i64 + 5)),
            Err(EnrollError::DeadlineExpired)
        );
        // Finalized beats bad signature.
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(1)).unwrap();
        assert_eq!(
            a.enroll(&p.student.identity(), &courses(), &bad_sig, at(2)),
            Err(EnrollError::AlreadyEnrolled)
        );
    }

    // ── Cancellation ─────────────────────────────────────────────────

    #[test]
    fn test_cancel_after_deadline() {
        let p = parties();
        let mut a = make_agreement(&p);
        a.cancel_by_timeout(&p.coordinator.identity(), at(DURATION as i64 + 1))
            .unwrap();
        assert_eq!(a.status(), AgreementStatus::Cancelled);
        assert!(a.is_enrolled());
        assert!(a.enrolled_courses().is_empty());
        assert_eq!(a.events()[0].event, AgreementEvent::EnrollmentCancelled);
    }

    #[test]
    fn test_cancel_before_or_at_deadline() {
        let p = parties();
        let mut a = make_agreement(&p);
        for offset in [0, 10, DURATION as i64] {
            assert_eq!(
                a.cancel_by_timeout(&p.coordinator.identity(), at(offset)),
                Err(CancelError::DeadlineNotReached)
            );
        }
        assert!(!a.is_finalized());
    }

    #[test]
    fn test_cancel_by_non_coordinator() {
        let p = parties();
        let mut a = make_agreement(&p);
        assert_eq!(
            a.cancel_by_timeout(&p.student.identity(), at(DURATION as i64 + 1)),
            Err(CancelError::NotTheCoordinator)
        );
    }

    #[test]
    fn test_cancel_after_enrollment() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(10)).unwrap();
        assert_eq!(
            a.cancel_by_timeout(&p.coordinator.identity(), at(DURATION as i64 + 1)),
            Err(CancelError::AlreadyEnrolled)
        );
        assert_eq!(a.status(), AgreementStatus::Enrolled);
    }

    #[test]
    fn test_enroll_after_cancellation() {
        let p = parties();
        let mut a = make_agreement(&p);
        a.cancel_by_timeout(&p.coordinator.identity(), at(DURATION as i64 + 1))
            .unwrap();
        let sig = coordinator_signature(&p, &courses());
        // The deadline check fires first; the agreement is closed either way.
        assert_eq!(
            a.enroll(&p.student.identity(), &courses(), &sig, at(DURATION as i64 + 2)),
            Err(EnrollError::DeadlineExpired)
        );
        assert_eq!(
            a.cancel_by_timeout(&p.coordinator.identity(), at(DURATION as i64 + 2)),
            Err(CancelError::AlreadyEnrolled)
        );
    }

    // ── Queries ──────────────────────────────────────────────────────

    #[test]
    fn test_window_queries() {
        let p = parties();
        let a = make_agreement(&p);
        assert_eq!(a.remaining_secs(at(0)), DURATION);
        assert_eq!(a.remaining_secs(at(DURATION as i64 + 100)), 0);
        assert!(a.is_enrollment_open(at(DURATION as i64)));
        assert!(!a.is_cancellable(at(DURATION as i64)));
        assert!(!a.is_enrollment_open(at(DURATION as i64 + 1)));
        assert!(a.is_cancellable(at(DURATION as i64 + 1)));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AgreementStatus::Pending.to_string(), "PENDING");
        assert_eq!(AgreementStatus::Enrolled.to_string(), "ENROLLED");
        assert_eq!(AgreementStatus::Cancelled.to_string(), "CANCELLED");
        assert!(!AgreementStatus::Pending.is_terminal());
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_agreement_json_roundtrip_after_enroll() {
        let p = parties();
        let mut a = make_agreement(&p);
        let sig = coordinator_signature(&p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(10)).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        let parsed: Agreement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn test_deserialize_rejects_courses_on_pending() {
        let p = parties();
        let a = make_agreement(&p);
        let mut value = serde_json::to_value(&a).unwrap();
        value["enrolled_courses"] = serde_json::json!(["CS101"]);
        let err = serde_json::from_value::<Agreement>(value).unwrap_err();
        assert!(err.to_string().contains("corrupt agreement record"));
    }

    #[test]
    fn test_deserialize_rejects_status_without_event() {
        let p = parties();
        let a = make_agreement(&p);
        let mut value = serde_json::to_value(&a).unwrap();
        value["status"] = serde_json::json!("Cancelled");
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }

    fn enrolled_record(p: &Parties) -> serde_json::Value {
        let mut a = make_agreement(p);
        let sig = coordinator_signature(p, &courses());
        a.enroll(&p.student.identity(), &courses(), &sig, at(10)).unwrap();
        serde_json::to_value(&a).unwrap()
    }

    #[test]
    fn test_deserialize_rejects_event_courses_mismatch() {
        let p = parties();
        let mut value = enrolled_record(&p);
        value["events"][0]["event"]["courses"] = serde_json::json!(["XX999"]);
        let err = serde_json::from_value::<Agreement>(value).unwrap_err();
        assert!(err.to_string().contains("corrupt agreement record"));
    }

    #[test]
    fn test_deserialize_rejects_event_student_mismatch() {
        let p = parties();
        let mut value = enrolled_record(&p);
        value["events"][0]["event"]["student"] =
            serde_json::to_value(p.coordinator.identity()).unwrap();
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }

    #[test]
    fn test_deserialize_rejects_enrollment_after_deadline() {
        let p = parties();
        let mut value = enrolled_record(&p);
        value["events"][0]["timestamp"] = serde_json::to_value(at(DURATION as i64 + 1)).unwrap();
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }

    #[test]
    fn test_deserialize_rejects_event_before_creation() {
        let p = parties();
        let mut value = enrolled_record(&p);
        value["events"][0]["timestamp"] = serde_json::to_value(at(-1)).unwrap();
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }

    #[test]
    fn test_deserialize_rejects_cancellation_before_deadline() {
        let p = parties();
        let mut a = make_agreement(&p);
        a.cancel_by_timeout(&p.coordinator.identity(), at(DURATION as i64 + 1))
            .unwrap();
        let good = serde_json::to_value(&a).unwrap();
        assert_eq!(serde_json::from_value::<Agreement>(good.clone()).unwrap(), a);

        let mut value = good;
        value["events"][0]["timestamp"] = serde_json::to_value(at(DURATION as i64)).unwrap();
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }

    #[test]
    fn test_deserialize_rejects_deadline_before_creation() {
        let p = parties();
        let a = make_agreement(&p);
        let mut value = serde_json::to_value(&a).unwrap();
        value["enrollment_deadline"] = serde_json::to_value(at(-1)).unwrap();
        assert!(serde_json::from_value::<Agreement>(value).is_err());
    }
}
