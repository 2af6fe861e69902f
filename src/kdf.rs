//! Generic key derivation function of 3GPP TS 33.501 Annex B.2.0.
//!
//! The input string is `S = FC ‖ P0 ‖ L0 ‖ P1 ‖ L1 ‖ …` where each `Li` is
//! the 2-byte big-endian length of `Pi`; the derived key is
//! `HMAC-SHA-256(key, S)`. Every 5G derivation in this crate (RES*, KAUSF,
//! KSEAF, KAMF) is an instance of this shape with a distinct FC octet.

use crate::helpers::hmac_sha256;

// FC octets allocated by TS 33.501 Annex A to the derivations in this crate.
pub(crate) const FC_KAUSF: u8 = 0x6A;
pub(crate) const FC_RES_STAR: u8 = 0x6B;
pub(crate) const FC_KSEAF: u8 = 0x6C;
pub(crate) const FC_KAMF: u8 = 0x6D;

// Largest input string assembled by any caller: RES* (FC 0x6B) packs
// 1 + (32 + 2) + (16 + 2) + (8 + 2) = 63 bytes.
const MAX_S_LEN: usize = 64;


/// Assembles the input string for the given FC and parameters and returns
/// the full 32-byte HMAC-SHA-256. Callers truncate where the derived value
/// is shorter than the MAC.
pub(crate) fn derive(key: &[u8], fc: u8, params: &[&[u8]]) -> [u8; 32] {
    let mut s = [0u8; MAX_S_LEN];
    s[0] = fc;
    let mut len = 1;
    for p in params {
        debug_assert!(len + p.len() + 2 <= MAX_S_LEN, "KDF: input string overflow");
        s[len..len + p.len()].copy_from_slice(p);
        len += p.len();
        let l = u16::try_from(p.len()).expect("kdf param len fail");
        s[len..len + 2].copy_from_slice(&l.to_be_bytes());
        len += 2;
    }
    hmac_sha256(key, &[&s[..len]])
}


#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use crate::helpers::hmac_sha256;
    use crate::kdf::derive;

    #[test]
    fn test_input_string_layout() {
        let key = hex!("b379874b3d183d2a21291d439e7761e1f4706f66629cf7ddf881d80025bf1255");

        // Two parameters, lengths 3 and 6: S must be FC ‖ P0 ‖ L0 ‖ P1 ‖ L1.
        let actual = derive(&key, 0x6A, &[b"abc", &[1, 2, 3, 4, 5, 6]]);
        let expected = hmac_sha256(
            &key,
            &[&[0x6A], b"abc", &[0x00, 0x03], &[1, 2, 3, 4, 5, 6], &[0x00, 0x06]],
        );
        assert_eq!(actual, expected);
    }

    // The KAMF input string must end with ABBA = 0x0000 followed by its
    // literal length octets 0x00 0x02.
    #[test]
    fn test_abba_trailing_length() {
        let key = [0x42u8; 32];
        let supi = b"001010123456789";

        let actual = derive(&key, 0x6D, &[supi, &[0x00, 0x00]]);
        let expected = hmac_sha256(
            &key,
            &[&[0x6D], supi.as_slice(), &[0x00, 0x0F], &[0x00, 0x00], &[0x00, 0x02]],
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_no_params_is_fc_only() {
        let key = [0u8; 32];
        assert_eq!(derive(&key, 0x6C, &[]), hmac_sha256(&key, &[&[0x6C]]));
    }
}
