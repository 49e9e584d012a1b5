//! Poseidon sponge over the BN254 scalar field

use super::ChallengeHash;
use crate::{Error, Result};
use ark_bn254::Fr;
use light_poseidon::{Poseidon as Permutation, PoseidonBytesHasher, PoseidonError};

/// Message bytes per field element; 31 bytes always fit below the modulus
const CHUNK: usize = 31;

/// Field elements per permutation call
const FRAME: usize = 12;

/// Poseidon (circom parameters) as the signature challenge hash
///
/// The input is cut into 31-byte big-endian chunks, the last one padded with
/// zeros on the right. Chunks fill a frame of 12 field elements; every full
/// frame is hashed and its digest becomes element 0 of the next frame. The
/// digest of the last frame, big-endian with leading zeros dropped, opens
/// the 64-byte challenge pre-image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poseidon;

impl Poseidon {
    /// 32-byte big-endian field element digest of `input`
    pub fn digest(input: &[u8]) -> Result<[u8; 32]> {
        let mut hasher = Permutation::<Fr>::new_circom(FRAME).map_err(hash_error)?;
        let mut frame = [[0u8; 32]; FRAME];
        let mut k = 0;
        let mut pending = input.is_empty();

        for chunk in input.chunks(CHUNK) {
            frame[k] = [0u8; 32];
            frame[k][1..1 + chunk.len()].copy_from_slice(chunk);
            pending = true;

            if k == FRAME - 1 {
                let digest = hash_frame(&mut hasher, &frame)?;
                frame = [[0u8; 32]; FRAME];
                frame[0] = digest;
                k = 1;
                pending = false;
            } else {
                k += 1;
            }
        }

        if pending {
            hash_frame(&mut hasher, &frame)
        } else {
            Ok(frame[0])
        }
    }
}

fn hash_frame(hasher: &mut Permutation<Fr>, frame: &[[u8; 32]; FRAME]) -> Result<[u8; 32]> {
    let inputs: Vec<&[u8]> = frame.iter().map(|element| element.as_slice()).collect();
    hasher.hash_bytes_be(&inputs).map_err(hash_error)
}

fn hash_error(e: PoseidonError) -> Error {
    Error::Hash(format!("poseidon: {e}"))
}

impl ChallengeHash for Poseidon {
    fn challenge_preimage(input: &[u8]) -> Result<[u8; 64]> {
        let digest = Self::digest(input)?;
        let start = digest.iter().position(|b| *b != 0).unwrap_or(digest.len());
        let minimal = &digest[start..];

        let mut out = [0u8; 64];
        out[..minimal.len()].copy_from_slice(minimal);
        Ok(out)
    }
}
