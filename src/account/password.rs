//! Salted password hashes.
//!
//! Hashes are stored as `sha256$<iterations>$<salt>$<digest>`, where the
//! salt and digest are hex-encoded. The iteration count travels with the
//! hash, so it can be raised later without invalidating stored passwords.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const ALGORITHM: &str = "sha256";

const SALT_LEN: usize = 16;

#[cfg(not(test))]
const ITERATIONS: u32 = 120_000;

// Keeps the test suite fast; stored hashes record their own count.
#[cfg(test)]
const ITERATIONS: u32 = 64;

/// Hashes `password` with a freshly generated random salt.
pub fn hash(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let digest = digest(password, &salt, ITERATIONS);
    format!(
        "{ALGORITHM}${ITERATIONS}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// True if `password` produces the `stored` hash.
///
/// A hash that cannot be parsed never matches.
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((iterations, salt, expected)) = parse(stored) else {
        return false;
    };
    let actual = digest(password, &salt, iterations);
    bool::from(actual.as_slice().ct_eq(expected.as_slice()))
}

fn parse(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    let (algorithm, iterations, salt, digest) =
        (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
    if algorithm != ALGORITHM || parts.next().is_some() {
        return None;
    }
    let iterations = iterations.parse().ok().filter(|n| *n > 0)?;
    let salt = hex::decode(salt).ok()?;
    let digest = hex::decode(digest).ok()?;
    Some((iterations, salt, digest))
}

fn digest(password: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut output = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..iterations {
        output = Sha256::new()
            .chain_update(salt)
            .chain_update(output)
            .finalize();
    }
    output.to_vec()
}
