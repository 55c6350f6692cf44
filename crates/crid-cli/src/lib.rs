//! # crid-cli: Command-Line Tooling for CRID Agreements
//!
//! Thin wrappers around `crid-state` and `crid-crypto`. No authorization
//! logic lives here: every check is made by the agreement itself.
//!
//! ## Subcommands
//!
//! - `crid keygen`: generate an Ed25519 key pair and print its identity.
//! - `crid deploy`: create an agreement; the deploying key is the coordinator.
//! - `crid hash`: print the message hash of a course list.
//! - `crid sign`: coordinator signs a course list.
//! - `crid enroll`: student redeems a signature.
//! - `crid cancel`: coordinator cancels after the deadline.
//! - `crid status`: show an agreement.
//!
//! ## Key Material
//!
//! Commands that act as a participant take `--key <file>` (hex seed) or read
//! the `CRID_PRIVATE_KEY` environment variable.

pub mod agreement;
pub mod config;
pub mod keys;
pub mod signing;
pub mod store;

use anyhow::Result;

use crid_core::Timestamp;
use crid_state::AgreementError;

use crate::config::CliConfig;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    /// Loaded configuration.
    pub config: CliConfig,
    /// Clock override from `--now`.
    pub now_override: Option<Timestamp>,
}

impl CliContext {
    /// Build a context from the global flags.
    pub fn new(config: CliConfig, now_epoch_secs: Option<i64>) -> Result<Self> {
        let now_override = now_epoch_secs.map(Timestamp::from_epoch_secs).transpose()?;
        Ok(Self {
            config,
            now_override,
        })
    }

    /// The time to hand to the agreement: the override if set, else the wall clock.
    pub fn now(&self) -> Timestamp {
        self.now_override.unwrap_or_else(Timestamp::now)
    }
}

/// An actionable message for a protocol error.
pub fn describe(err: &AgreementError) -> &'static str {
    match err.code() {
        "NotTheStudent" => "this key is not the agreement's student; enroll with the student's key",
        "NotTheCoordinator" => "only the coordinator who deployed the agreement may cancel it",
        "DeadlineExpired" => "the enrollment window has closed; the coordinator may now cancel",
        "DeadlineNotReached" => {
            "the enrollment window is still open; cancellation is possible only after the deadline"
        }
        "AlreadyEnrolled" => "the agreement is already finalized; run `crid status` to inspect it",
        "InvalidSignature" => {
            "the signature was not made by the coordinator over exactly these courses in this order"
        }
        "Overflow" => "the requested duration pushes the deadline out of range; use a shorter one",
        _ => "the agreement file is not a valid agreement record",
    }
}
