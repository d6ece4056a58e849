//! Cryptographic primitives (spec §4.1): Ristretto255 group, Fiat-Shamir
//! transcript, Chaum-Pedersen and encrypted-share proofs, hash-to-scalar, and
//! the canonical card encoding table.

pub mod cards;
pub mod chaum_pedersen;
pub mod enc_share;
pub mod group;
pub mod hash_to_scalar;
pub mod transcript;

use thiserror::Error;

pub use cards::{card_id_from_point, card_point};
pub use chaum_pedersen::ChaumPedersenProof;
pub use enc_share::EncShareProof;
pub use group::{Point, Scalar};
pub use hash_to_scalar::{hand_key_scalar, hash_to_scalar};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("non-canonical group element encoding")]
    NonCanonicalPoint,
    #[error("non-canonical scalar encoding (>= group order)")]
    NonCanonicalScalar,
    #[error("proof has the wrong byte length for its kind")]
    MalformedProof,
    #[error("proof equations do not hold")]
    ProofVerificationFailed,
}

/// An ElGamal ciphertext under some public key `pk`: `(c1, c2) = (r*G, m + r*pk)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    #[serde(with = "point_serde")]
    pub c1: Point,
    #[serde(with = "point_serde")]
    pub c2: Point,
}

impl Ciphertext {
    pub const ENCODED_LEN: usize = 64;

    /// The re-encryption identity ciphertext for card `card_id`: `(0, (card_id+1)*G)`.
    /// Re-encryptable by any holder of `pk` since `c1 = 0` carries no secret.
    pub fn identity_for_card(card_id: u8) -> Option<Self> {
        card_point(card_id).map(|m| Ciphertext {
            c1: Point::identity(),
            c2: m,
        })
    }

    pub fn re_encrypt(self, pk: Point, rho: Scalar) -> Self {
        Ciphertext {
            c1: self.c1 + Point::generator() * rho,
            c2: self.c2 + pk * rho,
        }
    }

    pub fn to_bytes(self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..32].copy_from_slice(&self.c1.to_bytes());
        out[32..64].copy_from_slice(&self.c2.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(Error::MalformedProof);
        }
        Ok(Ciphertext {
            c1: Point::from_canonical_bytes(bytes[0..32].try_into().unwrap())?,
            c2: Point::from_canonical_bytes(bytes[32..64].try_into().unwrap())?,
        })
    }
}

mod point_serde {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        point.to_bytes().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let bytes: [u8; 32] = Deserialize::deserialize(deserializer)?;
        Point::from_canonical_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
