#![no_std]
#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]


// Implements the 5G-AKA derivation chain of 3GPP TS 33.501 over the
// MILENAGE function set of TS 35.205/35.206.
//
// Functionality map
//
// TS 35.206 4.1 OPc derivation                      --> milenage.rs
// TS 35.206 4.1 f1 / f1* (MAC-A / MAC-S)            --> milenage.rs
// TS 35.206 4.1 f2, f3, f4, f5 (RES, CK, IK, AK)    --> milenage.rs
// TS 35.206 4.1 f5* (resync anonymity key)          --> milenage.rs
// TS 33.102 6.3 AUTN / AUTS token layout            --> milenage.rs
// TS 33.501 A.4 RES* derivation (FC 0x6B)           --> milenage.rs
// TS 33.501 A.2 KAUSF derivation (FC 0x6A)          --> aka.rs
// TS 33.501 A.6 KSEAF derivation (FC 0x6C)          --> aka.rs
// TS 33.501 A.7 KAMF derivation (FC 0x6D)           --> aka.rs
// TS 33.501 Annex C HXRES* digest                   --> aka.rs
// TS 33.501 B.2.0 generic KDF over HMAC-SHA-256     --> kdf.rs
// AES-128 single block, fixed-width XOR, hashes     --> helpers.rs

use core::fmt;

mod helpers;
mod kdf;

pub mod aka;
pub mod milenage;

pub use aka::{Aka, Snn};
pub use milenage::{compute_opc, AuthVector, Milenage, OperatorField};

/// Subscriber key K length (in bytes)
pub const K_LEN: usize = 16;
/// Operator variant field OP length (in bytes)
pub const OP_LEN: usize = 16;
/// Derived operator field OPc length (in bytes)
pub const OPC_LEN: usize = 16;
/// Random challenge RAND length (in bytes)
pub const RAND_LEN: usize = 16;
/// Sequence number SQN length (in bytes, the low-order 48 bits big-endian)
pub const SQN_LEN: usize = 6;
/// Authentication management field AMF length (in bytes)
pub const AMF_LEN: usize = 2;
/// MAC-A / MAC-S length (in bytes)
pub const MAC_LEN: usize = 8;
/// Expected response RES length (in bytes)
pub const RES_LEN: usize = 8;
/// Confidentiality key CK length (in bytes)
pub const CK_LEN: usize = 16;
/// Integrity key IK length (in bytes)
pub const IK_LEN: usize = 16;
/// Anonymity key AK / AK-S length (in bytes)
pub const AK_LEN: usize = 6;
/// 5G-augmented response RES* length (in bytes)
pub const RES_STAR_LEN: usize = 16;
/// Authentication token AUTN length (in bytes)
pub const AUTN_LEN: usize = 16;
/// Resynchronisation token AUTS length (in bytes)
pub const AUTS_LEN: usize = 14;
/// Serving network name length (in bytes, exact)
pub const SNN_LEN: usize = 32;
/// Maximum SUPI length accepted by the key schedule (in bytes)
pub const SUPI_MAX_LEN: usize = 15;
/// KAUSF length (in bytes)
pub const KAUSF_LEN: usize = 32;
/// KSEAF anchor key length (in bytes)
pub const KSEAF_LEN: usize = 32;
/// KAMF length (in bytes)
pub const KAMF_LEN: usize = 32;
/// HXRES* verifier length (in bytes)
pub const HXRES_STAR_LEN: usize = 16;


/// Errors surfaced by every fallible operation in this crate.
///
/// All failures are synchronous and caller-facing; there are no retries and
/// no partial results. A value that produced an error should be discarded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AkaError {
    /// A fixed-width field arrived with the wrong number of bytes.
    LengthMismatch {
        /// Name of the offending field, e.g. `"K"` or `"RAND"`.
        field: &'static str,
        /// Width the field must have, in bytes.
        expected: usize,
        /// Width that was actually supplied.
        actual: usize,
    },
    /// MCC/MNC/assembled-name validation failed while building the serving
    /// network name.
    MalformedSnn(&'static str),
    /// The underlying AES implementation rejected the cipher key. Unreachable
    /// once the length checks at construction have passed.
    CipherInit,
}

impl fmt::Display for AkaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AkaError::LengthMismatch { field, expected, actual } => {
                write!(f, "{field} must be {expected} bytes, got {actual}")
            }
            AkaError::MalformedSnn(msg) => write!(f, "malformed serving network name: {msg}"),
            AkaError::CipherInit => write!(f, "AES-128 rejected the cipher key"),
        }
    }
}
