//! Uploaded resource handle
//!
//! An upload is opaque to the rule catalog: rules only check whether an
//! attribute holds one and pass it through untouched.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An uploaded resource (binary payload plus content type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(with = "payload_base64")]
    payload: Vec<u8>,
    content_type: String,
    checksum: String,
}

impl Upload {
    /// Wrap a payload, computing its checksum
    pub fn new(payload: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        let payload = payload.into();
        let checksum = Self::calculate_checksum(&payload);
        Self {
            payload,
            content_type: content_type.into(),
            checksum,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Hex-encoded SHA-256 of the payload
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// True when the stored checksum still matches the payload
    pub fn verify(&self) -> bool {
        Self::calculate_checksum(&self.payload) == self.checksum
    }

    fn calculate_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }
}

mod payload_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
