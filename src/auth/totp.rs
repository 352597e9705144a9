//! TOTP secret generation and code verification (RFC 6238).
//!
//! Codes are 6 digits over SHA-1 with a 30-second step. Verification
//! accepts the current step plus one step of drift on either side; that
//! window is a policy decision and must not widen.

use anyhow::{anyhow, Result};
use totp_rs::{Algorithm, Secret, TOTP};

/// Digits per code.
pub const DIGITS: usize = 6;

/// Accepted clock drift, in time steps, on either side of now.
pub const SKEW: u8 = 1;

/// Time step in seconds.
pub const STEP: u64 = 30;

/// Artifacts produced when a fresh secret is bound to an account.
///
/// The QR image is the provisioning URI rendered as a PNG data URL, ready
/// for an authenticator app to scan.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub secret_base32: String,
    pub provisioning_uri: String,
    pub qr_png_base64: String,
}

/// Generate a fresh 160-bit secret for `account` and build its enrollment
/// artifacts. The secret comes from the OS CSPRNG, never a seeded generator.
///
/// # Errors
/// Returns an error if secret encoding, URI construction, or QR rendering
/// fails.
pub fn generate(issuer: &str, account: &str) -> Result<Enrollment> {
    let secret = Secret::generate_secret();
    let secret_bytes = secret
        .to_bytes()
        .map_err(|e| anyhow!("secret generation error: {e:?}"))?;

    let totp = TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        secret_bytes,
        Some(issuer.to_string()),
        account.to_string(),
    )
    .map_err(|e| anyhow!("TOTP init error: {e}"))?;

    let qr = totp
        .get_qr_base64()
        .map_err(|e| anyhow!("QR generation error: {e}"))?;

    Ok(Enrollment {
        secret_base32: totp.get_secret_base32(),
        provisioning_uri: totp.get_url(),
        qr_png_base64: format!("data:image/png;base64,{qr}"),
    })
}

/// Check `code` against `secret_base32` at the current time.
///
/// Returns `false` for malformed secrets or codes, never an error.
#[must_use]
pub fn verify(secret_base32: &str, code: &str) -> bool {
    let Ok(now) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
        return false;
    };
    verify_at(secret_base32, code, now.as_secs())
}

/// Check `code` against `secret_base32` at `timestamp` (seconds since the
/// Unix epoch). Accepts the code for the step containing `timestamp` and
/// the steps immediately before and after it.
#[must_use]
pub fn verify_at(secret_base32: &str, code: &str, timestamp: u64) -> bool {
    let code = code.trim();
    if code.len() != DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let Ok(secret_bytes) = Secret::Encoded(secret_base32.to_string()).to_bytes() else {
        return false;
    };

    let Ok(totp) = TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        secret_bytes,
        None,
        String::new(),
    ) else {
        return false;
    };

    totp.check(code, timestamp)
}
