//! Encrypted decryption-share proof (spec §4.1, §4.5.6): DLEQ + DLOG coupling.
//!
//! A committee member with per-hand secret share `x = sk_j_hand` holds a
//! committed public share `y = x*G`. For a hole-card deck position with
//! ciphertext `(c1, c2)`, the member publishes an encrypted share
//! `(U = r*G, V = d + r*pkPlayer)` where `d = x*c1`, so only `pkPlayer`'s
//! holder can recover `d` (and hence the plaintext card, once all threshold
//! shares are combined) from `V`.
//!
//! The proof binds all five points `(y, c1, d, U, V)` and establishes two
//! facts under one transcript: a DLEQ proof that `d` was derived from the
//! same secret `x` committed to by `y` (reusing the `y = x*G`, `d = x*c1`
//! relation), and a DLOG-coupling proof that `(U, V - d)` were derived from
//! the same random `r` relative to bases `(G, pkPlayer)`. Both sub-proofs
//! share one Fiat-Shamir challenge so neither can be swapped independently.

use rand_core::{CryptoRng, RngCore};

use crate::crypto::group::{Point, Scalar};
use crate::crypto::transcript::Transcript;

const DOMAIN_SEP: &[u8] = b"ocp/v1/enc-share";

/// 192-byte encoding: `Ax(32) || Bx(32) || Ar(32) || Br(32) || zx(32) || zr(32)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncShareProof {
    a_x: Point,
    b_x: Point,
    a_r: Point,
    b_r: Point,
    z_x: Scalar,
    z_r: Scalar,
}

impl EncShareProof {
    pub const ENCODED_LEN: usize = 192;

    pub fn to_bytes(self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..32].copy_from_slice(&self.a_x.to_bytes());
        out[32..64].copy_from_slice(&self.b_x.to_bytes());
        out[64..96].copy_from_slice(&self.a_r.to_bytes());
        out[96..128].copy_from_slice(&self.b_r.to_bytes());
        out[128..160].copy_from_slice(&self.z_x.to_bytes());
        out[160..192].copy_from_slice(&self.z_r.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::Error> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(crate::crypto::Error::MalformedProof);
        }
        let pt = |range: std::ops::Range<usize>| -> Result<Point, crate::crypto::Error> {
            Point::from_canonical_bytes(bytes[range].try_into().unwrap())
        };
        let sc = |range: std::ops::Range<usize>| -> Result<Scalar, crate::crypto::Error> {
            Scalar::from_canonical_bytes(bytes[range].try_into().unwrap())
                .map_err(|_| crate::crypto::Error::NonCanonicalScalar)
        };
        Ok(EncShareProof {
            a_x: pt(0..32)?,
            b_x: pt(32..64)?,
            a_r: pt(64..96)?,
            b_r: pt(96..128)?,
            z_x: sc(128..160)?,
            z_r: sc(160..192)?,
        })
    }

    fn challenge(
        transcript: &mut Transcript,
        pk_player: Point,
        c1: Point,
        y: Point,
        d: Point,
        u: Point,
        v: Point,
        a_x: Point,
        b_x: Point,
        a_r: Point,
        b_r: Point,
    ) -> Scalar {
        transcript.append_point(b"pk_player", pk_player);
        transcript.append_point(b"c1", c1);
        transcript.append_point(b"y", y);
        transcript.append_point(b"d", d);
        transcript.append_point(b"u", u);
        transcript.append_point(b"v", v);
        transcript.append_point(b"a_x", a_x);
        transcript.append_point(b"b_x", b_x);
        transcript.append_point(b"a_r", a_r);
        transcript.append_point(b"b_r", b_r);
        transcript.challenge_scalar(b"e")
    }

    /// `x` is the prover's per-hand secret share; `r` is a freshly sampled
    /// encryption randomizer. `d = c1*x` and `(u, v)` must already be computed
    /// by the caller (`dealer::hole_cards`) so the proof and the public values
    /// it is built over never diverge.
    #[allow(clippy::too_many_arguments)]
    pub fn prove<R: RngCore + CryptoRng>(
        pk_player: Point,
        c1: Point,
        y: Point,
        d: Point,
        u: Point,
        v: Point,
        x: Scalar,
        r: Scalar,
        rng: &mut R,
    ) -> Self {
        let w_x = Scalar::random(rng);
        let w_r = Scalar::random(rng);
        let a_x = Point::generator() * w_x;
        let b_x = c1 * w_x;
        let a_r = Point::generator() * w_r;
        let b_r = pk_player * w_r;
        let mut transcript = Transcript::new(DOMAIN_SEP);
        let e = Self::challenge(&mut transcript, pk_player, c1, y, d, u, v, a_x, b_x, a_r, b_r);
        let z_x = w_x + e * x;
        let z_r = w_r + e * r;
        EncShareProof { a_x, b_x, a_r, b_r, z_x, z_r }
    }

    pub fn verify(&self, pk_player: Point, c1: Point, y: Point, d: Point, u: Point, v: Point) -> bool {
        let mut transcript = Transcript::new(DOMAIN_SEP);
        let e = Self::challenge(
            &mut transcript,
            pk_player,
            c1,
            y,
            d,
            u,
            v,
            self.a_x,
            self.b_x,
            self.a_r,
            self.b_r,
        );
        let dleq_ok =
            Point::generator() * self.z_x == self.a_x + y * e && c1 * self.z_x == self.b_x + d * e;
        let v_minus_d = v - d;
        let dlog_ok =
            Point::generator() * self.z_r == self.a_r + u * e && pk_player * self.z_r == self.b_r + v_minus_d * e;
        dleq_ok && dlog_ok
    }
}
