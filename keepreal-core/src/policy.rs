//! Reality verification policy.
//!
//! Best-effort liveness signaling applied before a mint attempt: a capture
//! must be fresh and come from a plausible live-capture environment. This is
//! advisory, not cryptographic proof — a motivated client can fabricate the
//! capture context, and no rule here should be treated as a security
//! boundary.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{KeepRealError, Result};

/// Maximum capture age accepted at mint time, in seconds. Matches the
/// ledger program's own time-drift window.
pub const MAX_CAPTURE_AGE_SECS: i64 = 10 * 60;

/// Facts about the capture environment, reported by the capture front-end.
#[derive(Debug, Clone)]
pub struct CaptureContext {
    /// When the frame was captured.
    pub captured_at: DateTime<Utc>,
    /// Whether camera hardware was available in the runtime context.
    pub camera_present: bool,
    /// Whether the runtime is a mobile-class device.
    pub mobile_device: bool,
}

/// Freshness and plausibility rules, evaluated in order. The first failing
/// rule aborts the attempt.
#[derive(Debug, Clone)]
pub struct RealityPolicy {
    max_capture_age: Duration,
    enforce_device_class: bool,
}

impl Default for RealityPolicy {
    /// Ten-minute freshness window; device-class enforcement only in
    /// release builds.
    fn default() -> Self {
        Self {
            max_capture_age: Duration::seconds(MAX_CAPTURE_AGE_SECS),
            enforce_device_class: !cfg!(debug_assertions),
        }
    }
}

impl RealityPolicy {
    pub fn new(max_capture_age: Duration, enforce_device_class: bool) -> Self {
        Self {
            max_capture_age,
            enforce_device_class,
        }
    }

    /// Production rules regardless of build profile.
    pub fn strict() -> Self {
        Self::new(Duration::seconds(MAX_CAPTURE_AGE_SECS), true)
    }

    /// Validate a capture context against the policy.
    ///
    /// Rule order: freshness, then camera hardware, then device class.
    pub fn verify(&self, capture: &CaptureContext) -> Result<()> {
        let age_secs = (Utc::now() - capture.captured_at).num_seconds().abs();
        if age_secs > self.max_capture_age.num_seconds() {
            return Err(KeepRealError::StaleCapture {
                age_secs,
                limit_secs: self.max_capture_age.num_seconds(),
            });
        }

        if !capture.camera_present {
            return Err(KeepRealError::NoCameraHardware);
        }

        if self.enforce_device_class && !capture.mobile_device {
            return Err(KeepRealError::DeviceMismatch);
        }

        debug!(age_secs, "Capture passed reality policy");
        Ok(())
    }
}
