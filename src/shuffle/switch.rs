//! A single 2x2 switch of the shuffle network: a 2-branch OR proof over
//! ElGamal re-encryptions (spec §4.2). Branch 0 proves the outputs are
//! re-encryptions of the inputs in order; branch 1 proves they are swapped.
//! Each branch is two coupled Chaum-Pedersen re-encryption proofs. Challenge
//! splitting follows the standard construction: the verifier's challenge
//! `e = e0 + e1 mod q`; the prover proves the true branch honestly and
//! simulates the false one.

use rand_core::{CryptoRng, RngCore};

use crate::crypto::chaum_pedersen::ChaumPedersenProof;
use crate::crypto::group::{Point, Scalar};
use crate::crypto::transcript::Transcript;
use crate::crypto::Ciphertext;

const DOMAIN_SEP: &[u8] = b"ocp/v1/shuffle-switch";

/// 416-byte encoding: `e0(32) || branch0.0(96) || branch0.1(96) || branch1.0(96) || branch1.1(96)`.
#[derive(Clone, Copy, Debug)]
pub struct SwitchProof {
    e0: Scalar,
    branch0: (ChaumPedersenProof, ChaumPedersenProof),
    branch1: (ChaumPedersenProof, ChaumPedersenProof),
}

impl SwitchProof {
    pub const ENCODED_LEN: usize = 416;

    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..32].copy_from_slice(&self.e0.to_bytes());
        out[32..128].copy_from_slice(&self.branch0.0.to_bytes());
        out[128..224].copy_from_slice(&self.branch0.1.to_bytes());
        out[224..320].copy_from_slice(&self.branch1.0.to_bytes());
        out[320..416].copy_from_slice(&self.branch1.1.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::Error> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(crate::crypto::Error::MalformedProof);
        }
        let e0 = Scalar::from_canonical_bytes(bytes[0..32].try_into().unwrap())
            .map_err(|_| crate::crypto::Error::NonCanonicalScalar)?;
        Ok(SwitchProof {
            e0,
            branch0: (
                ChaumPedersenProof::from_bytes(&bytes[32..128])?,
                ChaumPedersenProof::from_bytes(&bytes[128..224])?,
            ),
            branch1: (
                ChaumPedersenProof::from_bytes(&bytes[224..320])?,
                ChaumPedersenProof::from_bytes(&bytes[320..416])?,
            ),
        })
    }
}

/// Which input feeds which output for the true branch of this switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Identity,
    Swapped,
}

fn reenc_relation(input: Ciphertext, output: Ciphertext, pk_hand: Point) -> (Point, Point, Point, Point) {
    // Proves knowledge of rho s.t. output = ReEnc(input; rho):
    //   y = output.c1 - input.c1 = rho*G
    //   d = output.c2 - input.c2 = rho*pkHand
    (Point::generator(), pk_hand, output.c1 - input.c1, output.c2 - input.c2)
}

fn simulate_cp(e: Scalar, y: Point, d: Point, g: Point, h: Point, rng: &mut impl RngCore) -> (ChaumPedersenProof, Scalar) {
    let z = Scalar::random(rng);
    let a = g * z - y * e;
    let b = h * z - d * e;
    (ChaumPedersenProof { a, b, s: z }, e)
}

/// Prover-side witness for a true-branch Chaum-Pedersen commitment, produced
/// before the overall challenge is known.
struct Commitment {
    w: Scalar,
    a: Point,
    b: Point,
}

fn honest_commitment<R: RngCore + CryptoRng>(g: Point, h: Point, rng: &mut R) -> Commitment {
    let w = Scalar::random(rng);
    Commitment { w, a: g * w, b: h * w }
}

fn finish_honest(commitment: Commitment, e: Scalar, secret: Scalar) -> ChaumPedersenProof {
    ChaumPedersenProof {
        a: commitment.a,
        b: commitment.b,
        s: commitment.w + e * secret,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn prove_switch<R: RngCore + CryptoRng>(
    in0: Ciphertext,
    in1: Ciphertext,
    pk_hand: Point,
    true_branch: Branch,
    rho_out0: Scalar,
    rho_out1: Scalar,
    rng: &mut R,
) -> (Ciphertext, Ciphertext, SwitchProof) {
    // The permutation is determined by which input maps to which output.
    let (src_for_out0, src_for_out1) = match true_branch {
        Branch::Identity => (in0, in1),
        Branch::Swapped => (in1, in0),
    };
    let out0 = src_for_out0.re_encrypt(pk_hand, rho_out0);
    let out1 = src_for_out1.re_encrypt(pk_hand, rho_out1);

    let (_, _, y0_id, d0_id) = reenc_relation(in0, out0, pk_hand);
    let (_, _, y1_id, d1_id) = reenc_relation(in1, out1, pk_hand);
    let (_, _, y0_sw, d0_sw) = reenc_relation(in1, out0, pk_hand);
    let (_, _, y1_sw, d1_sw) = reenc_relation(in0, out1, pk_hand);

    let g = Point::generator();

    let (identity_commitments, swapped_commitments, e_false, true_is_identity);
    let (sim0, sim1, e_other);
    match true_branch {
        Branch::Identity => {
            true_is_identity = true;
            identity_commitments = Some((honest_commitment(g, pk_hand, rng), honest_commitment(g, pk_hand, rng)));
            swapped_commitments = None;
            e_false = Scalar::random(rng);
            let (proof0, _) = simulate_cp(e_false, y0_sw, d0_sw, g, pk_hand, rng);
            let (proof1, _) = simulate_cp(e_false, y1_sw, d1_sw, g, pk_hand, rng);
            sim0 = proof0;
            sim1 = proof1;
            e_other = e_false;
        }
        Branch::Swapped => {
            true_is_identity = false;
            swapped_commitments = Some((honest_commitment(g, pk_hand, rng), honest_commitment(g, pk_hand, rng)));
            identity_commitments = None;
            e_false = Scalar::random(rng);
            let (proof0, _) = simulate_cp(e_false, y0_id, d0_id, g, pk_hand, rng);
            let (proof1, _) = simulate_cp(e_false, y1_id, d1_id, g, pk_hand, rng);
            sim0 = proof0;
            sim1 = proof1;
            e_other = e_false;
        }
    }

    let (a0, b0, a1, b1) = if true_is_identity {
        let ic = identity_commitments.as_ref().unwrap();
        (ic.0.a, ic.0.b, ic.1.a, ic.1.b)
    } else {
        let sc = swapped_commitments.as_ref().unwrap();
        (sc.0.a, sc.0.b, sc.1.a, sc.1.b)
    };

    let mut transcript = Transcript::new(DOMAIN_SEP);
    append_switch_transcript(
        &mut transcript,
        in0,
        in1,
        out0,
        out1,
        if true_is_identity { (a0, b0) } else { (sim0.a, sim0.b) },
        if true_is_identity { (a1, b1) } else { (sim1.a, sim1.b) },
        if true_is_identity { (sim0.a, sim0.b) } else { (a0, b0) },
        if true_is_identity { (sim1.a, sim1.b) } else { (a1, b1) },
    );
    let e = transcript.challenge_scalar(b"e");
    let e_true = e - e_other;

    let (branch0, branch1) = match true_branch {
        Branch::Identity => {
            let ic = identity_commitments.unwrap();
            let honest0 = finish_honest(ic.0, e_true, rho_out0);
            let honest1 = finish_honest(ic.1, e_true, rho_out1);
            (
                (honest0, honest1),
                (
                    ChaumPedersenProof { a: sim0.a, b: sim0.b, s: sim0.s },
                    ChaumPedersenProof { a: sim1.a, b: sim1.b, s: sim1.s },
                ),
            )
        }
        Branch::Swapped => {
            let sc = swapped_commitments.unwrap();
            let honest0 = finish_honest(sc.0, e_true, rho_out0);
            let honest1 = finish_honest(sc.1, e_true, rho_out1);
            (
                (
                    ChaumPedersenProof { a: sim0.a, b: sim0.b, s: sim0.s },
                    ChaumPedersenProof { a: sim1.a, b: sim1.b, s: sim1.s },
                ),
                (honest0, honest1),
            )
        }
    };

    let e0 = if true_is_identity { e_true } else { e_other };
    (out0, out1, SwitchProof { e0, branch0, branch1 })
}

#[allow(clippy::too_many_arguments)]
fn append_switch_transcript(
    transcript: &mut Transcript,
    in0: Ciphertext,
    in1: Ciphertext,
    out0: Ciphertext,
    out1: Ciphertext,
    branch0_ab0: (Point, Point),
    branch0_ab1: (Point, Point),
    branch1_ab0: (Point, Point),
    branch1_ab1: (Point, Point),
) {
    transcript.append_message(b"in0", &in0.to_bytes());
    transcript.append_message(b"in1", &in1.to_bytes());
    transcript.append_message(b"out0", &out0.to_bytes());
    transcript.append_message(b"out1", &out1.to_bytes());
    transcript.append_point(b"b0a0", branch0_ab0.0);
    transcript.append_point(b"b0b0", branch0_ab0.1);
    transcript.append_point(b"b0a1", branch0_ab1.0);
    transcript.append_point(b"b0b1", branch0_ab1.1);
    transcript.append_point(b"b1a0", branch1_ab0.0);
    transcript.append_point(b"b1b0", branch1_ab0.1);
    transcript.append_point(b"b1a1", branch1_ab1.0);
    transcript.append_point(b"b1b1", branch1_ab1.1);
}

pub fn verify_switch(in0: Ciphertext, in1: Ciphertext, out0: Ciphertext, out1: Ciphertext, pk_hand: Point, proof: &SwitchProof) -> bool {
    let mut transcript = Transcript::new(DOMAIN_SEP);
    append_switch_transcript(
        &mut transcript,
        in0,
        in1,
        out0,
        out1,
        (proof.branch0.0.a, proof.branch0.0.b),
        (proof.branch0.1.a, proof.branch0.1.b),
        (proof.branch1.0.a, proof.branch1.0.b),
        (proof.branch1.1.a, proof.branch1.1.b),
    );
    let e = transcript.challenge_scalar(b"e");
    let e1 = e - proof.e0;

    let g = Point::generator();
    let (_, _, y0_id, d0_id) = reenc_relation(in0, out0, pk_hand);
    let (_, _, y1_id, d1_id) = reenc_relation(in1, out1, pk_hand);
    let (_, _, y0_sw, d0_sw) = reenc_relation(in1, out0, pk_hand);
    let (_, _, y1_sw, d1_sw) = reenc_relation(in0, out1, pk_hand);

    let check = |proof: &ChaumPedersenProof, e: Scalar, y: Point, d: Point| {
        g * proof.s == proof.a + y * e && pk_hand * proof.s == proof.b + d * e
    };

    let branch0_ok = check(&proof.branch0.0, proof.e0, y0_id, d0_id) && check(&proof.branch0.1, proof.e0, y1_id, d1_id);
    let branch1_ok = check(&proof.branch1.0, e1, y0_sw, d0_sw) && check(&proof.branch1.1, e1, y1_sw, d1_sw);

    branch0_ok && branch1_ok && !is_zero_rerandomization(in0, in1, out0, out1)
}

fn is_zero_rerandomization(in0: Ciphertext, in1: Ciphertext, out0: Ciphertext, out1: Ciphertext) -> bool {
    out0 == in0 || out1 == in1 || out0 == in1 || out1 == in0
}

/// Proof for an odd round's two unpaired positions (0 and 51): a plain
/// re-encryption, not a switch, so a single 96-byte `ChaumPedersenProof`
/// suffices with bases `(G, pkHand)` and values `(out.c1-in.c1, out.c2-in.c2)`
/// for secret `rho`.
pub fn prove_single<R: RngCore + CryptoRng>(input: Ciphertext, pk_hand: Point, rho: Scalar, rng: &mut R) -> (Ciphertext, ChaumPedersenProof) {
    let output = input.re_encrypt(pk_hand, rho);
    let (g, h, y, d) = reenc_relation(input, output, pk_hand);
    (output, ChaumPedersenProof::prove(g, h, y, d, rho, rng))
}

pub fn verify_single(input: Ciphertext, output: Ciphertext, pk_hand: Point, proof: &ChaumPedersenProof) -> bool {
    if output == input {
        return false;
    }
    let (g, h, y, d) = reenc_relation(input, output, pk_hand);
    proof.verify(g, h, y, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn setup() -> (Point, Ciphertext, Ciphertext) {
        let mut rng = OsRng;
        let pk_hand = Point::generator() * Scalar::random(&mut rng);
        let in0 = Ciphertext::identity_for_card(3).unwrap();
        let in1 = Ciphertext::identity_for_card(7).unwrap();
        (pk_hand, in0, in1)
    }

    #[test]
    fn identity_branch_verifies() {
        let mut rng = OsRng;
        let (pk_hand, in0, in1) = setup();
        let (out0, out1, proof) = prove_switch(
            in0,
            in1,
            pk_hand,
            Branch::Identity,
            Scalar::random(&mut rng),
            Scalar::random(&mut rng),
            &mut rng,
        );
        assert!(verify_switch(in0, in1, out0, out1, pk_hand, &proof));
    }

    #[test]
    fn swapped_branch_verifies() {
        let mut rng = OsRng;
        let (pk_hand, in0, in1) = setup();
        let (out0, out1, proof) = prove_switch(
            in0,
            in1,
            pk_hand,
            Branch::Swapped,
            Scalar::random(&mut rng),
            Scalar::random(&mut rng),
            &mut rng,
        );
        assert!(verify_switch(in0, in1, out0, out1, pk_hand, &proof));
    }

    #[test]
    fn tampered_output_fails() {
        let mut rng = OsRng;
        let (pk_hand, in0, in1) = setup();
        let (out0, out1, proof) = prove_switch(
            in0,
            in1,
            pk_hand,
            Branch::Identity,
            Scalar::random(&mut rng),
            Scalar::random(&mut rng),
            &mut rng,
        );
        let bad_out0 = out0.re_encrypt(pk_hand, Scalar::random(&mut rng));
        assert!(!verify_switch(in0, in1, bad_out0, out1, pk_hand, &proof));
    }

    #[test]
    fn single_proof_verifies_and_rejects_zero_rerandomization() {
        let mut rng = OsRng;
        let (pk_hand, in0, _) = setup();
        let (out0, proof) = prove_single(in0, pk_hand, Scalar::random(&mut rng), &mut rng);
        assert!(verify_single(in0, out0, pk_hand, &proof));
        assert!(!verify_single(in0, in0, pk_hand, &proof));
    }

    #[test]
    fn proof_round_trips_bytes() {
        let mut rng = OsRng;
        let (pk_hand, in0, in1) = setup();
        let (out0, out1, proof) = prove_switch(
            in0,
            in1,
            pk_hand,
            Branch::Identity,
            Scalar::random(&mut rng),
            Scalar::random(&mut rng),
            &mut rng,
        );
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), SwitchProof::ENCODED_LEN);
        let decoded = SwitchProof::from_bytes(&bytes).unwrap();
        assert!(verify_switch(in0, in1, out0, out1, pk_hand, &decoded));
    }
}
