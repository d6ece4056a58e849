//! Ristretto255 scalar and group element newtypes with canonical encode/decode.
//!
//! `curve25519_dalek`'s `CompressedRistretto::decompress` already rejects
//! malformed encodings, and `Scalar` decode below rejects non-canonical
//! (>= group order) byte strings, matching spec §4.1.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar as DalekScalar;
use curve25519_dalek::traits::Identity;
use rand_core::{CryptoRng, RngCore};
use std::ops::{Add, Mul, Neg, Sub};

use crate::crypto::Error;

/// A scalar mod the Ristretto255 group order `q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scalar(pub(crate) DalekScalar);

impl Scalar {
    pub const ZERO: Scalar = Scalar(DalekScalar::ZERO);

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Scalar(DalekScalar::random(rng))
    }

    /// Decodes a canonical little-endian 32-byte scalar; rejects `s >= q`.
    pub fn from_canonical_bytes(bytes: &[u8; 32]) -> Result<Self, Error> {
        Option::<DalekScalar>::from(DalekScalar::from_canonical_bytes(*bytes))
            .map(Scalar)
            .ok_or(Error::NonCanonicalScalar)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Reduces a 64-byte wide value (e.g. a SHA-512 digest) mod `q`.
    pub fn from_bytes_mod_order_wide(bytes: &[u8; 64]) -> Self {
        Scalar(DalekScalar::from_bytes_mod_order_wide(bytes))
    }

    pub fn invert(self) -> Scalar {
        Scalar(self.0.invert())
    }

    /// Lifts a small integer (e.g. a committee index) into the scalar field.
    pub fn from_u64(v: u64) -> Self {
        Scalar(DalekScalar::from(v))
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar(-self.0)
    }
}

/// A group element of the Ristretto255 prime-order group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point(pub(crate) RistrettoPoint);

impl Point {
    pub fn identity() -> Self {
        Point(RistrettoPoint::identity())
    }

    pub fn generator() -> Self {
        Point(RISTRETTO_BASEPOINT_POINT)
    }

    /// Decodes a canonical 32-byte Ristretto255 encoding; rejects malformed input.
    pub fn from_canonical_bytes(bytes: &[u8; 32]) -> Result<Self, Error> {
        CompressedRistretto(*bytes)
            .decompress()
            .map(Point)
            .ok_or(Error::NonCanonicalPoint)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point(self.0 - rhs.0)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0)
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;
    fn mul(self, rhs: Scalar) -> Point {
        Point(self.0 * rhs.0)
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;
    fn mul(self, rhs: Point) -> Point {
        Point(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn scalar_round_trips_canonical_bytes() {
        let mut rng = OsRng;
        let s = Scalar::random(&mut rng);
        let bytes = s.to_bytes();
        let back = Scalar::from_canonical_bytes(&bytes).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn non_canonical_scalar_is_rejected() {
        // 2^255 - 19 + 2 exceeds the group order for the low limb; use all-0xff
        // bytes, which is far above the order and must fail canonical decode.
        let bytes = [0xffu8; 32];
        assert!(Scalar::from_canonical_bytes(&bytes).is_err());
    }

    #[test]
    fn point_round_trips_canonical_bytes() {
        let mut rng = OsRng;
        let s = Scalar::random(&mut rng);
        let p = Point::generator() * s;
        let bytes = p.to_bytes();
        let back = Point::from_canonical_bytes(&bytes).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn malformed_point_encoding_is_rejected() {
        // All-ones is not a valid Ristretto255 compressed encoding.
        let bytes = [0xffu8; 32];
        assert!(Point::from_canonical_bytes(&bytes).is_err());
    }
}
