use sha3::{Digest, Sha3_256};

/// `H(x) = SHA3-256(x)`, returned as raw bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `H(x)` as lowercase hex, the on-the-wire / on-disk representation used
/// everywhere a hash is stored or compared (spec §6 compatibility-critical
/// encodings: "Hash hex is lowercase 64-char").
pub fn hash_hex(data: &[u8]) -> String {
    hex_encode(&hash_bytes(data))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Pair-hash two already-hashed node digests (as lowercase hex), sorting
/// operands lexicographically first so the result is independent of
/// argument order. Order is reintroduced by the proof's `directions[]`.
pub fn pair_hash_hex(a: &str, b: &str) -> String {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut combined = String::with_capacity(left.len() + right.len());
    combined.push_str(left);
    combined.push_str(right);
    hash_hex(combined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_matches_known_sha3_256_vector() {
        assert_eq!(
            hash_hex(b"hello"),
            "3338be694f50c5f338814986cdf0686453a888b84f424d792af4b9202398f392"
        );
    }

    #[test]
    fn pair_hash_is_commutative() {
        let a = hash_hex(b"a");
        let b = hash_hex(b"b");
        assert_eq!(pair_hash_hex(&a, &b), pair_hash_hex(&b, &a));
    }
}
