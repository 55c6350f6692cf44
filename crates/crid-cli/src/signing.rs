//! # Hash and Sign Subcommands
//!
//! Off-chain half of the protocol: the coordinator hashes the student's
//! ordered course list and signs it. The signature is handed to the student
//! out of band and redeemed with `crid enroll`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crid_crypto::{course_list_hash, sign_enrollment, signed_message_digest, Ed25519KeyPair};

use crate::keys::load_key;

/// Arguments for `crid hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// One course per flag, in enrollment order. Values are taken verbatim,
    /// commas included.
    #[arg(long = "course", required = true)]
    pub courses: Vec<String>,
}

/// Arguments for `crid sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// One course per flag, in enrollment order. Values are taken verbatim,
    /// commas included.
    #[arg(long = "course", required = true)]
    pub courses: Vec<String>,
    /// Coordinator private key file. Falls back to `CRID_PRIVATE_KEY`.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Print the course-list hash and the digest a coordinator signs.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let hash = course_list_hash(&args.courses);
    let signed = signed_message_digest(&hash);
    println!("courses:        {:?}", args.courses);
    println!("message hash:   {hash}");
    println!("signed digest:  {}", signed.digest());
    Ok(0)
}

/// Sign a course list and print the encoded enrollment signature.
pub fn run_sign(args: &SignArgs) -> Result<u8> {
    let key = load_key(args.key.as_deref())?;
    let signature = signature_for(&key, &args.courses);
    tracing::info!(
        signer = %key.identity(),
        courses = args.courses.len(),
        "signed course list"
    );
    println!("{signature}");
    Ok(0)
}

/// Encode a signature over `courses`.
pub fn signature_for(key: &Ed25519KeyPair, courses: &[String]) -> String {
    sign_enrollment(key, courses).to_hex()
}
