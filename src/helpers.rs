use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::AkaError;


/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// Element-wise XOR of two fixed-width buffers.
///
/// Operand widths are forced equal by the const parameter, so the historical
/// which-length-wins question cannot arise at any call site.
pub(crate) fn xor<const N: usize>(a: &[u8; N], b: &[u8; N]) -> [u8; N] {
    core::array::from_fn(|i| a[i] ^ b[i])
}


/// AES-128 encryption of a single 16-byte block: raw single-block ECB, no
/// padding, no chaining, no IV.
///
/// The key is taken as a slice so a rejection by the cipher surfaces as
/// `CipherInit`; after construction-time width checks this cannot trigger.
pub(crate) fn aes128_encrypt(key: &[u8; 16], block: &[u8; 16]) -> Result<[u8; 16], AkaError> {
    let cipher = Aes128::new_from_slice(key).map_err(|_| AkaError::CipherInit)?;
    let mut buf = GenericArray::from(*block);
    cipher.encrypt_block(&mut buf);
    Ok(buf.into())
}


/// HMAC-SHA-256 over the concatenation of the given fragments.
pub(crate) fn hmac_sha256(key: &[u8], fragments: &[&[u8]]) -> [u8; 32] {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).expect("hmac key fail");
    fragments.iter().for_each(|f| mac.update(f));
    mac.finalize().into_bytes().into()
}


/// SHA-256 over the concatenation of the given fragments.
pub(crate) fn sha256(fragments: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    fragments.iter().for_each(|f| Digest::update(&mut hasher, f));
    hasher.finalize().into()
}
