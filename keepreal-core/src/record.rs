//! The proof-of-capture record model.

use serde::{Deserialize, Serialize};

/// Longest caption accepted by the pipeline.
pub const MAX_CAPTION_LEN: usize = 100;

/// Optional capture coordinates, omittable by user preference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Confirmation lifecycle of a record.
///
/// A record is created `Pending` at capture-confirmation time, becomes
/// `Confirmed` on successful ledger submission, or `Unconfirmed` when the
/// submission fails. Submission failure is not destructive: the local copy
/// stays in the cache either way. Ledger-sourced records are always already
/// `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    Pending,
    Confirmed,
    Unconfirmed,
}

/// A proof-of-capture entry linking an owner, a content hash and pinned
/// content. Persisted both locally (cache) and on-ledger (`RealityProof`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Ledger record address, base58. Known before submission because the
    /// address derives from (owner, content_hash), so local and
    /// ledger-sourced records share one identifier space.
    pub id: String,
    /// Owner public key, base58.
    pub owner: String,
    /// SHA-256 digest of the original image bytes.
    #[serde(with = "serde_hex")]
    pub content_hash: [u8; 32],
    /// Content identifier of the pinned image.
    pub content_id: String,
    /// Content identifier of the pinned metadata document, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_content_id: Option<String>,
    pub caption: String,
    /// Capture time in Unix milliseconds; `None` when the user opted out of
    /// embedding time.
    pub timestamp: Option<i64>,
    pub location: Option<LocationData>,
    pub state: ConfirmationState,
    /// Cosmetic gallery tilt, not semantically meaningful.
    pub display_rotation: f32,
}

impl Record {
    pub fn is_confirmed(&self) -> bool {
        self.state == ConfirmationState::Confirmed
    }
}

/// Gallery tilt jitter in (-5.0, 5.0) degrees.
pub fn display_jitter() -> f32 {
    (rand::random::<f32>() - 0.5) * 10.0
}

/// Serde adapter storing 32-byte digests as hex strings.
pub(crate) mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::custom(format!("expected 32 bytes, got {}", v.len()))
        })
    }
}
