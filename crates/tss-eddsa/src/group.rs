//! Ed25519 group helpers
//!
//! curve25519-dalek does the point arithmetic. It does not expose affine
//! coordinates, and nonce commitments in this protocol are made over `(x, y)`,
//! so the conversion between the two lives here. Coordinates are encoded as
//! 32-byte little-endian field elements, as in RFC 8032.

use curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT, edwards::CompressedEdwardsY, traits::IsIdentity,
    EdwardsPoint, Scalar,
};
use num_bigint::BigUint;
use std::sync::OnceLock;

/// Group generator `G`
pub const GENERATOR: EdwardsPoint = ED25519_BASEPOINT_POINT;

/// Length of an encoded point, scalar or coordinate
pub const ENCODED_LEN: usize = 32;

/// Affine `(x, y)` coordinates of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineCoordinates {
    pub x: [u8; ENCODED_LEN],
    pub y: [u8; ENCODED_LEN],
}

impl AffineCoordinates {
    /// Coordinates as the value list committed to in round 1
    pub fn to_values(&self) -> Vec<Vec<u8>> {
        vec![self.x.to_vec(), self.y.to_vec()]
    }
}

struct FieldParams {
    p: BigUint,
    d: BigUint,
    sqrt_m1: BigUint,
}

fn field() -> &'static FieldParams {
    static PARAMS: OnceLock<FieldParams> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let one = BigUint::from(1u8);
        let p = (BigUint::from(1u8) << 255u32) - BigUint::from(19u8);
        let p_minus_two = &p - BigUint::from(2u8);

        // d = -121665 / 121666
        let inv = BigUint::from(121666u32).modpow(&p_minus_two, &p);
        let d = (&p - BigUint::from(121665u32)) * inv % &p;

        // sqrt(-1) = 2^((p - 1) / 4)
        let sqrt_m1 = BigUint::from(2u8).modpow(&((&p - &one) >> 2u32), &p);

        FieldParams { p, d, sqrt_m1 }
    })
}

fn parity(v: &BigUint) -> u8 {
    v.to_bytes_le()[0] & 1
}

fn to_le_bytes(v: &BigUint) -> [u8; ENCODED_LEN] {
    let bytes = v.to_bytes_le();
    let mut out = [0u8; ENCODED_LEN];
    out[..bytes.len()].copy_from_slice(&bytes);
    out
}

/// Solve the curve equation for `x` given `y` and the sign bit of `x`
fn recover_x(y: &BigUint, sign: u8) -> Option<BigUint> {
    let f = field();
    let one = BigUint::from(1u8);
    if y >= &f.p {
        return None;
    }

    let y2 = y * y % &f.p;
    let u = (&y2 + &f.p - &one) % &f.p;
    let v = (&f.d * &y2 + &one) % &f.p;
    let v_inv = v.modpow(&(&f.p - BigUint::from(2u8)), &f.p);
    let x2 = u * v_inv % &f.p;

    let mut x = x2.modpow(&((&f.p + BigUint::from(3u8)) >> 3u32), &f.p);
    if &x * &x % &f.p != x2 {
        x = x * &f.sqrt_m1 % &f.p;
        if &x * &x % &f.p != x2 {
            return None;
        }
    }

    let is_zero = x == BigUint::default();
    if is_zero && sign == 1 {
        return None;
    }
    if !is_zero && parity(&x) != sign {
        x = &f.p - x;
    }
    Some(x)
}

/// Affine coordinates of `point`
///
/// Returns `None` only if the compressed encoding produced by the curve
/// library does not decode, which does not happen for a valid point.
pub fn to_affine(point: &EdwardsPoint) -> Option<AffineCoordinates> {
    let mut y_bytes = point.compress().to_bytes();
    let sign = y_bytes[31] >> 7;
    y_bytes[31] &= 0x7f;

    let x = recover_x(&BigUint::from_bytes_le(&y_bytes), sign)?;
    Some(AffineCoordinates {
        x: to_le_bytes(&x),
        y: y_bytes,
    })
}

/// Rebuild a point from revealed affine coordinates
///
/// Both coordinates must be canonical (less than `p`) and satisfy
/// `-x^2 + y^2 = 1 + d*x^2*y^2`.
pub fn from_affine(x: &[u8], y: &[u8]) -> Option<EdwardsPoint> {
    if x.len() != ENCODED_LEN || y.len() != ENCODED_LEN {
        return None;
    }
    let f = field();
    let one = BigUint::from(1u8);
    let x_int = BigUint::from_bytes_le(x);
    let y_int = BigUint::from_bytes_le(y);
    if x_int >= f.p || y_int >= f.p {
        return None;
    }

    let x2 = &x_int * &x_int % &f.p;
    let y2 = &y_int * &y_int % &f.p;
    let lhs = (&y2 + &f.p - &x2) % &f.p;
    let rhs = (&one + &f.d * &x2 % &f.p * &y2) % &f.p;
    if lhs != rhs {
        return None;
    }

    let mut compressed = to_le_bytes(&y_int);
    compressed[31] |= parity(&x_int) << 7;
    CompressedEdwardsY(compressed).decompress()
}

/// Project out the small-order component: `8^-1 * (8 * P)`
pub fn clear_cofactor(point: &EdwardsPoint) -> EdwardsPoint {
    let eight_inv = Scalar::from(8u8).invert();
    point.mul_by_cofactor() * eight_inv
}

/// A point is usable if it is not the identity and lies in the prime-order subgroup
pub fn is_valid(point: &EdwardsPoint) -> bool {
    !point.is_identity() && point.is_torsion_free()
}

/// Canonical 32-byte encoding of a point
pub fn encode_point(point: &EdwardsPoint) -> [u8; ENCODED_LEN] {
    point.compress().to_bytes()
}

/// Decode a compressed point
pub fn decode_point(bytes: &[u8]) -> Option<EdwardsPoint> {
    CompressedEdwardsY::from_slice(bytes).ok()?.decompress()
}

/// Decode a canonical scalar
pub fn decode_scalar(bytes: &[u8]) -> Option<Scalar> {
    let array: [u8; ENCODED_LEN] = bytes.try_into().ok()?;
    Option::from(Scalar::from_canonical_bytes(array))
}

/// The point `(0, -1)` of order two
#[cfg(test)]
pub(crate) fn order_two_point() -> EdwardsPoint {
    let y = to_le_bytes(&(&field().p - BigUint::from(1u8)));
    from_affine(&[0u8; 32], &y).expect("(0, -1) is on the curve")
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::traits::Identity;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_basepoint_coordinates() {
        let coords = to_affine(&GENERATOR).unwrap();
        let x = BigUint::parse_bytes(
            b"15112221349535400772501151409588531511454012693041857206046113283949847762202",
            10,
        )
        .unwrap();
        let y = BigUint::parse_bytes(
            b"46316835694926478169428394003475163141307993866256225615783033603165251855960",
            10,
        )
        .unwrap();

        assert_eq!(BigUint::from_bytes_le(&coords.x), x);
        assert_eq!(BigUint::from_bytes_le(&coords.y), y);
    }

    #[test]
    fn test_affine_round_trip() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..16 {
            let point = EdwardsPoint::mul_base(&Scalar::random(&mut rng));
            let coords = to_affine(&point).unwrap();
            assert_eq!(from_affine(&coords.x, &coords.y), Some(point));
        }
    }

    #[test]
    fn test_from_affine_rejects_off_curve() {
        let coords = to_affine(&GENERATOR).unwrap();
        let mut y = coords.y;
        y[0] ^= 1;
        assert!(from_affine(&coords.x, &y).is_none());

        // wrong length
        assert!(from_affine(&coords.x[..31], &coords.y).is_none());

        // y = p is not canonical
        let p = to_le_bytes(&field().p);
        assert!(from_affine(&[0u8; 32], &p).is_none());
    }

    #[test]
    fn test_clear_cofactor_removes_torsion() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let point = EdwardsPoint::mul_base(&Scalar::random(&mut rng));
        let torsion = order_two_point();

        assert!(!is_valid(&torsion));
        assert!(!is_valid(&(point + torsion)));
        assert_eq!(clear_cofactor(&(point + torsion)), point);
        assert_eq!(clear_cofactor(&torsion), EdwardsPoint::identity());
    }

    #[test]
    fn test_point_and_scalar_codecs() {
        let point = GENERATOR * Scalar::from(42u8);
        assert_eq!(decode_point(&encode_point(&point)), Some(point));
        assert!(decode_point(&[1u8; 31]).is_none());

        let scalar = Scalar::from(1234u32);
        assert_eq!(decode_scalar(scalar.as_bytes()), Some(scalar));
        assert!(decode_scalar(&[0xff; 32]).is_none());
    }
}
