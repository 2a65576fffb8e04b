// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Entry envelope
//!
//! An [`Envelope`] pairs a cached payload with its expiry instant. The
//! durable encoding carries a magic number, a version byte and a trailing
//! CRC32 so a damaged record is detected on decode instead of producing a
//! garbage value.
//!
//! Presence is signaled by the envelope itself, never by the payload bytes:
//! a computation that legitimately produced "no value" is recorded as a
//! vacant envelope, which later reads as a hit, distinguishable from an
//! absent entry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

const ENVELOPE_MAGIC: u32 = 0x4D45_4D4F;
const ENVELOPE_VERSION: u8 = 1;

const FLAG_VACANT: u8 = 0b0000_0001;
const FLAG_HAS_EXPIRY: u8 = 0b0000_0010;

/// Smallest possible encoding: magic, version, flags, payload length, CRC.
const MIN_ENCODED_LEN: usize = 4 + 1 + 1 + 4 + 4;

/// Error type for envelope decoding.
#[derive(Error, Debug, Clone)]
pub enum EnvelopeError {
    #[error("Corrupted envelope: {0}")]
    Corrupted(String),
}

/// A cached value and its expiry instant.
///
/// Envelopes are immutable; a re-store supersedes the previous envelope
/// rather than mutating it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    payload: Vec<u8>,
    /// Absolute expiry as epoch milliseconds. `None` means never expires.
    expires_at: Option<u64>,
    vacant: bool,
}

impl Envelope {
    /// Envelope holding an encoded payload, stamped at `now_ms`.
    pub fn new(payload: Vec<u8>, ttl: Option<Duration>, now_ms: u64) -> Self {
        Envelope {
            payload,
            expires_at: expiry(ttl, now_ms),
            vacant: false,
        }
    }

    /// Envelope recording an explicit "no value" result.
    pub fn vacant(ttl: Option<Duration>, now_ms: u64) -> Self {
        Envelope {
            payload: Vec::new(),
            expires_at: expiry(ttl, now_ms),
            vacant: true,
        }
    }

    /// True iff the envelope is still eligible to serve a hit at `now_ms`.
    /// Envelopes without an expiry are live forever, subject only to
    /// explicit resets.
    pub fn is_live(&self, now_ms: u64) -> bool {
        self.expires_at.map_or(true, |at| now_ms < at)
    }

    /// Payload bytes, or `None` for a vacant envelope.
    pub fn payload(&self) -> Option<&[u8]> {
        if self.vacant {
            None
        } else {
            Some(&self.payload)
        }
    }

    /// Consume the envelope, yielding its payload bytes if any.
    pub fn into_payload(self) -> Option<Vec<u8>> {
        if self.vacant {
            None
        } else {
            Some(self.payload)
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.vacant
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Serialize for the durable tier.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(MIN_ENCODED_LEN + 8 + self.payload.len());
        buffer.extend_from_slice(&ENVELOPE_MAGIC.to_le_bytes());
        buffer.push(ENVELOPE_VERSION);

        let mut flags = 0u8;
        if self.vacant {
            flags |= FLAG_VACANT;
        }
        if self.expires_at.is_some() {
            flags |= FLAG_HAS_EXPIRY;
        }
        buffer.push(flags);

        if let Some(at) = self.expires_at {
            buffer.extend_from_slice(&at.to_le_bytes());
        }

        buffer.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&self.payload);

        let checksum = crc32fast::hash(&buffer);
        buffer.extend_from_slice(&checksum.to_le_bytes());
        buffer
    }

    /// Deserialize from the durable tier. Any structural mismatch is an
    /// [`EnvelopeError::Corrupted`], never a panic.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EnvelopeError> {
        if data.len() < MIN_ENCODED_LEN {
            return Err(EnvelopeError::Corrupted("envelope too small".to_string()));
        }

        // Verify the checksum before trusting any field.
        let body_len = data.len() - 4;
        let expected = u32::from_le_bytes([
            data[body_len],
            data[body_len + 1],
            data[body_len + 2],
            data[body_len + 3],
        ]);
        let actual = crc32fast::hash(&data[..body_len]);
        if expected != actual {
            return Err(EnvelopeError::Corrupted("checksum mismatch".to_string()));
        }

        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if magic != ENVELOPE_MAGIC {
            return Err(EnvelopeError::Corrupted("invalid magic number".to_string()));
        }

        let version = data[4];
        if version != ENVELOPE_VERSION {
            return Err(EnvelopeError::Corrupted(format!(
                "unsupported version {}",
                version
            )));
        }

        let flags = data[5];
        let vacant = flags & FLAG_VACANT != 0;
        let mut offset = 6;

        let expires_at = if flags & FLAG_HAS_EXPIRY != 0 {
            if offset + 8 > body_len {
                return Err(EnvelopeError::Corrupted("truncated expiry".to_string()));
            }
            let at = u64::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]);
            offset += 8;
            Some(at)
        } else {
            None
        };

        if offset + 4 > body_len {
            return Err(EnvelopeError::Corrupted(
                "truncated payload length".to_string(),
            ));
        }
        let payload_len = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        offset += 4;

        if offset + payload_len != body_len {
            return Err(EnvelopeError::Corrupted(
                "payload length mismatch".to_string(),
            ));
        }
        let payload = data[offset..offset + payload_len].to_vec();

        if vacant && !payload.is_empty() {
            return Err(EnvelopeError::Corrupted(
                "vacant envelope carries a payload".to_string(),
            ));
        }

        Ok(Envelope {
            payload,
            expires_at,
            vacant,
        })
    }
}

fn expiry(ttl: Option<Duration>, now_ms: u64) -> Option<u64> {
    // A zero TTL means "never expires", same as no TTL at all.
    ttl.filter(|d| !d.is_zero())
        .map(|d| now_ms.saturating_add(d.as_millis() as u64))
}

/// Wall-clock milliseconds since the epoch. Wall time rather than a
/// monotonic instant so durable expiries hold across process restarts.
pub(crate) fn now_epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
