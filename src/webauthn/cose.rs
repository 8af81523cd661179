//! COSE public key encoding
//!
//! Converts a P-256 public key into the `COSE_Key` map embedded in attested
//! credential data, and into the DER `SubjectPublicKeyInfo` reported as
//! `publicKey` in the registration response.

use super::cbor::{self, CborValue};
use super::errors::WebAuthnError;
use super::types::COSE_ALG_ES256;

const COSE_KEY_TYPE: i64 = 1;
const COSE_KEY_ALG: i64 = 3;
const COSE_EC2_CRV: i64 = -1;
const COSE_EC2_X: i64 = -2;
const COSE_EC2_Y: i64 = -3;

const COSE_KTY_EC2: i64 = 2;
const COSE_CRV_P256: i64 = 1;

/// DER prefix of a P-256 `SubjectPublicKeyInfo`, up to the uncompressed point tag
const P256_SPKI_PREFIX: [u8; 27] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00, 0x04,
];

/// EC2 public key on P-256
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseEc2Key {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl CoseEc2Key {
    /// Build from an uncompressed SEC1 point (`0x04 || x || y`)
    ///
    /// # Errors
    /// Returns `WebAuthnError::EncodingError` if the point is not 65 bytes
    /// starting with `0x04`.
    pub fn from_uncompressed_point(point: &[u8]) -> Result<Self, WebAuthnError> {
        if point.len() != 65 || point[0] != 0x04 {
            return Err(WebAuthnError::EncodingError(format!(
                "Expected 65-byte uncompressed P-256 point, got {} bytes",
                point.len()
            )));
        }
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&point[1..33]);
        y.copy_from_slice(&point[33..65]);
        Ok(Self { x, y })
    }

    /// `COSE_Key` map in CTAP2 canonical key order: 1, 3, -1, -2, -3
    #[must_use]
    pub fn to_cbor_value(&self) -> CborValue {
        CborValue::map([
            (CborValue::Integer(COSE_KEY_TYPE), CborValue::Integer(COSE_KTY_EC2)),
            (CborValue::Integer(COSE_KEY_ALG), CborValue::Integer(COSE_ALG_ES256)),
            (CborValue::Integer(COSE_EC2_CRV), CborValue::Integer(COSE_CRV_P256)),
            (CborValue::Integer(COSE_EC2_X), CborValue::Bytes(self.x.to_vec())),
            (CborValue::Integer(COSE_EC2_Y), CborValue::Bytes(self.y.to_vec())),
        ])
    }

    /// CBOR-encoded `COSE_Key`
    ///
    /// # Errors
    /// Propagates CBOR encoding errors.
    pub fn encode(&self) -> Result<Vec<u8>, WebAuthnError> {
        cbor::encode(&self.to_cbor_value())
    }

    /// DER `SubjectPublicKeyInfo` for this key
    #[must_use]
    pub fn to_spki(&self) -> Vec<u8> {
        let mut spki = Vec::with_capacity(P256_SPKI_PREFIX.len() + 64);
        spki.extend_from_slice(&P256_SPKI_PREFIX);
        spki.extend_from_slice(&self.x);
        spki.extend_from_slice(&self.y);
        spki
    }
}
