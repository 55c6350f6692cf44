//! # Agreement Subcommands
//!
//! `deploy`, `enroll`, `cancel`, and `status`. Each loads the agreement file,
//! applies one operation with the acting key's identity as caller, and
//! writes the file back only on success.
//!
//! Protocol rejections are returned as [`AgreementError`] inside the
//! `anyhow` chain so `main` can render an actionable message for them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;

use crid_core::{hex, Identity};
use crid_state::{Agreement, AgreementError};

use crate::keys::load_key;
use crate::store::{load_agreement, save_agreement};
use crate::CliContext;

/// Arguments for `crid deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Student address (`0x` + 40 hex characters).
    #[arg(long)]
    pub student: Identity,
    /// Enrollment window in seconds. Defaults to the configured window.
    #[arg(long)]
    pub duration: Option<u64>,
    /// Coordinator private key file. Falls back to `CRID_PRIVATE_KEY`.
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// Agreement file to write.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Replace an existing agreement file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `crid enroll`.
#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// Agreement file.
    #[arg(long)]
    pub agreement: Option<PathBuf>,
    /// Student private key file. Falls back to `CRID_PRIVATE_KEY`.
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// One course per flag, in the order the coordinator signed them.
    #[arg(long = "course", required = true)]
    pub courses: Vec<String>,
    /// Hex-encoded enrollment signature from `crid sign`.
    #[arg(long)]
    pub signature: String,
}

/// Arguments for `crid cancel`.
#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Agreement file.
    #[arg(long)]
    pub agreement: Option<PathBuf>,
    /// Coordinator private key file. Falls back to `CRID_PRIVATE_KEY`.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Arguments for `crid status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Agreement file.
    #[arg(long)]
    pub agreement: Option<PathBuf>,
    /// Print the full record as JSON.
    #[arg(long)]
    pub json: bool,
}

fn agreement_path<'a>(explicit: Option<&'a Path>, ctx: &'a CliContext) -> &'a Path {
    explicit.unwrap_or(ctx.config.agreement_path.as_path())
}

/// Create an agreement with the acting key as coordinator.
pub fn run_deploy(args: &DeployArgs, ctx: &CliContext) -> Result<u8> {
    let path = agreement_path(args.out.as_deref(), ctx);
    if path.exists() && !args.force {
        bail!(
            "agreement file already exists: {} (pass --force to replace it)",
            path.display()
        );
    }

    let key = load_key(args.key.as_deref())?;
    let duration = args.duration.unwrap_or(ctx.config.default_duration_secs);
    let agreement = Agreement::create(key.identity(), args.student, duration, ctx.now())
        .map_err(AgreementError::from)?;
    save_agreement(path, &agreement)?;

    println!("OK: deployed {}", agreement.id());
    println!("  Coordinator: {}", agreement.coordinator());
    println!("  Student:     {}", agreement.student());
    println!("  Deadline:    {}", agreement.enrollment_deadline());
    println!("  File:        {}", path.display());
    Ok(0)
}

/// Redeem a signature as the student.
pub fn run_enroll(args: &EnrollArgs, ctx: &CliContext) -> Result<u8> {
    let path = agreement_path(args.agreement.as_deref(), ctx);
    let mut agreement = load_agreement(path)?;
    let key = load_key(args.key.as_deref())?;

    // Undecodable hex is passed through as an empty signature so the
    // agreement still reports caller and deadline failures first.
    let signature = hex::decode(&args.signature).unwrap_or_else(|e| {
        tracing::warn!("signature is not valid hex: {e}");
        Vec::new()
    });

    agreement
        .enroll(&key.identity(), &args.courses, &signature, ctx.now())
        .map_err(AgreementError::from)?;
    save_agreement(path, &agreement)?;

    println!("OK: enrolled in {} course(s)", agreement.enrolled_courses().len());
    for course in agreement.enrolled_courses() {
        println!("  {course}");
    }
    Ok(0)
}

/// Cancel an expired agreement as the coordinator.
pub fn run_cancel(args: &CancelArgs, ctx: &CliContext) -> Result<u8> {
    let path = agreement_path(args.agreement.as_deref(), ctx);
    let mut agreement = load_agreement(path)?;
    let key = load_key(args.key.as_deref())?;

    agreement
        .cancel_by_timeout(&key.identity(), ctx.now())
        .map_err(AgreementError::from)?;
    save_agreement(path, &agreement)?;

    println!("OK: cancelled {}", agreement.id());
    Ok(0)
}

/// Print an agreement.
pub fn run_status(args: &StatusArgs, ctx: &CliContext) -> Result<u8> {
    let path = agreement_path(args.agreement.as_deref(), ctx);
    let agreement = load_agreement(path)?;
    let now = ctx.now();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&agreement)?);
        return Ok(0);
    }

    println!("{}", agreement.id());
    println!("  Status:      {}", agreement.status());
    println!("  Coordinator: {}", agreement.coordinator());
    println!("  Student:     {}", agreement.student());
    println!("  Created:     {}", agreement.created_at());
    println!("  Deadline:    {}", agreement.enrollment_deadline());
    if agreement.is_enrollment_open(now) {
        println!("  Remaining:   {}s", agreement.remaining_secs(now));
    } else if agreement.is_cancellable(now) {
        println!("  Deadline passed; the coordinator may cancel");
    }
    if !agreement.enrolled_courses().is_empty() {
        println!("  Courses:     {}", agreement.enrolled_courses().join(", "));
    }
    for record in agreement.events() {
        println!("  [{}] {}", record.timestamp, record.event.name());
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::signing::signature_for;
    use crid_crypto::Ed25519KeyPair;
    use crid_state::AgreementStatus;

    const T0: i64 = 1_767_225_600;

    struct Fixture {
        dir: tempfile::TempDir,
        coordinator_key: PathBuf,
        student_key: PathBuf,
        student: Identity,
        coordinator: Ed25519KeyPair,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let student = Ed25519KeyPair::from_seed(&[2u8; 32]);
        let coordinator_key = dir.path().join("coordinator.key");
        let student_key = dir.path().join("student.key");
        std::fs::write(&coordinator_key, coordinator.to_seed_hex()).unwrap();
        std::fs::write(&student_key, student.to_seed_hex()).unwrap();
        Fixture {
            student: student.identity(),
            dir,
            coordinator_key,
            student_key,
            coordinator,
        }
    }

    fn ctx_at(fx: &Fixture, secs: i64) -> CliContext {
        let config = CliConfig {
            default_duration_secs: 100,
            agreement_path: fx.dir.path().join("agreement.json"),
        };
        CliContext::new(config, Some(secs)).unwrap()
    }

    fn deploy(fx: &Fixture) {
        let args = DeployArgs {
            student: fx.student,
            duration: None,
            key: Some(fx.coordinator_key.clone()),
            out: None,
            force: false,
        };
        run_deploy(&args, &ctx_at(fx, T0)).unwrap();
    }

    fn protocol_code(err: &anyhow::Error) -> &'static str {
        err.downcast_ref::<AgreementError>().unwrap().code()
    }

    #[test]
    fn test_deploy_uses_configured_duration() {
        let fx = fixture();
        deploy(&fx);
        let a = load_agreement(&fx.dir.path().join("agreement.json")).unwrap();
        assert_eq!(a.enrollment_deadline().epoch_secs(), T0 + 100);
        assert_eq!(a.coordinator(), &fx.coordinator.identity());
        assert_eq!(a.student(), &fx.student);
    }

    #[test]
    fn test_deploy_refuses_overwrite() {
        let fx = fixture();
        deploy(&fx);
        let args = DeployArgs {
            student: fx.student,
            duration: Some(5),
            key: Some(fx.coordinator_key.clone()),
            out: None,
            force: false,
        };
        assert!(run_deploy(&args, &ctx_at(&fx, T0)).is_err());
        let forced = DeployArgs { force: true, ..args };
        run_deploy(&forced, &ctx_at(&fx, T0)).unwrap();
        let a = load_agreement(&fx.dir.path().join("agreement.json")).unwrap();
        assert_eq!(a.enrollment_deadline().epoch_secs(), T0 + 5);
    }

    #[test]
    fn test_enroll_then_cancel_rejected() {
        let fx = fixture();
        deploy(&fx);
        let courses = vec!["CS101".to_string(), "MA211".to_string()];
        let enroll = EnrollArgs {
            agreement: None,
            key: Some(fx.student_key.clone()),
            signature: signature_for(&fx.coordinator, &courses),
            courses,
        };
        run_enroll(&enroll, &ctx_at(&fx, T0 + 100)).unwrap();

        let a = load_agreement(&fx.dir.path().join("agreement.json")).unwrap();
        assert_eq!(a.status(), AgreementStatus::Enrolled);
        assert_eq!(a.enrolled_courses(), ["CS101", "MA211"]);

        let cancel = CancelArgs {
            agreement: None,
            key: Some(fx.coordinator_key.clone()),
        };
        let err = run_cancel(&cancel, &ctx_at(&fx, T0 + 101)).unwrap_err();
        assert_eq!(protocol_code(&err), "AlreadyEnrolled");
    }

    #[test]
    fn test_failed_enroll_leaves_file_untouched() {
        let fx = fixture();
        deploy(&fx);
        let path = fx.dir.path().join("agreement.json");
        let before = std::fs::read_to_string(&path).unwrap();

        let enroll = EnrollArgs {
            agreement: None,
            key: Some(fx.student_key.clone()),
            courses: vec!["CS101".to_string()],
            signature: "zz-not-hex".to_string(),
        };
        let err = run_enroll(&enroll, &ctx_at(&fx, T0 + 1)).unwrap_err();
        assert_eq!(protocol_code(&err), "InvalidSignature");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_bad_hex_still_reports_deadline_first() {
        let fx = fixture();
        deploy(&fx);
        let enroll = EnrollArgs {
            agreement: None,
            key: Some(fx.student_key.clone()),
            courses: vec!["CS101".to_string()],
            signature: "zz".to_string(),
        };
        let err = run_enroll(&enroll, &ctx_at(&fx, T0 + 101)).unwrap_err();
        assert_eq!(protocol_code(&err), "DeadlineExpired");
    }

    #[test]
    fn test_cancel_after_deadline() {
        let fx = fixture();
        deploy(&fx);
        let cancel = CancelArgs {
            agreement: None,
            key: Some(fx.coordinator_key.clone()),
        };
        let err = run_cancel(&cancel, &ctx_at(&fx, T0 + 100)).unwrap_err();
        assert_eq!(protocol_code(&err), "DeadlineNotReached");

        run_cancel(&cancel, &ctx_at(&fx, T0 + 101)).unwrap();
        let a = load_agreement(&fx.dir.path().join("agreement.json")).unwrap();
        assert_eq!(a.status(), AgreementStatus::Cancelled);
        assert!(a.enrolled_courses().is_empty());
    }

    #[test]
    fn test_student_cannot_cancel() {
        let fx = fixture();
        deploy(&fx);
        let cancel = CancelArgs {
            agreement: None,
            key: Some(fx.student_key.clone()),
        };
        let err = run_cancel(&cancel, &ctx_at(&fx, T0 + 500)).unwrap_err();
        assert_eq!(protocol_code(&err), "NotTheCoordinator");
    }

    #[test]
    fn test_status_runs() {
        let fx = fixture();
        deploy(&fx);
        for json in [false, true] {
            let args = StatusArgs {
                agreement: None,
                json,
            };
            assert_eq!(run_status(&args, &ctx_at(&fx, T0 + 10)).unwrap(), 0);
        }
    }
}
