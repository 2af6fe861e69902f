//! 5G key schedule of 3GPP TS 33.501: KAUSF, KSEAF and KAMF plus the HXRES*
//! verification digest, over a completed authentication vector. The serving
//! network name construction lives here too since every derivation in the
//! hierarchy is bound to it.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::helpers::{ensure, sha256, xor};
use crate::kdf;
use crate::milenage::{AuthVector, Milenage};
use crate::{
    AkaError, AK_LEN, CK_LEN, HXRES_STAR_LEN, IK_LEN, KAMF_LEN, KAUSF_LEN, KSEAF_LEN, RAND_LEN,
    RES_STAR_LEN, SNN_LEN, SQN_LEN, SUPI_MAX_LEN,
};

// ABBA initial-set value, TS 33.501 Annex A.7.1.
const ABBA: [u8; 2] = [0x00, 0x00];


/// Serving network name: the exact 32-byte ASCII string
/// `5G:mnc<MNC3>.mcc<MCC3>.3gppnetwork.org` of TS 33.501 clause 6.1.1.4.
#[derive(Clone, Debug)]
pub struct Snn([u8; SNN_LEN]);

impl Snn {
    /// Builds the name for the given mobile country and network codes. MCC
    /// must be exactly 3 ASCII digits; MNC must be 2 or 3 digits and is
    /// zero-padded to 3.
    ///
    /// # Errors
    /// `MalformedSnn` when either code fails validation or the assembled
    /// name is not exactly 32 bytes.
    pub fn new(mcc: &str, mnc: &str) -> Result<Self, AkaError> {
        ensure!(
            mcc.len() == 3 && mcc.bytes().all(|b| b.is_ascii_digit()),
            AkaError::MalformedSnn("MCC must be exactly 3 decimal digits")
        );
        ensure!(
            (mnc.len() == 2 || mnc.len() == 3) && mnc.bytes().all(|b| b.is_ascii_digit()),
            AkaError::MalformedSnn("MNC must be 2 or 3 decimal digits")
        );

        let mut name = [0u8; SNN_LEN];
        let mut at = 0;
        for part in [
            b"5G:mnc".as_slice(),
            if mnc.len() == 2 { b"0".as_slice() } else { b"".as_slice() },
            mnc.as_bytes(),
            b".mcc".as_slice(),
            mcc.as_bytes(),
            b".3gppnetwork.org".as_slice(),
        ] {
            name[at..at + part.len()].copy_from_slice(part);
            at += part.len();
        }
        ensure!(at == SNN_LEN, AkaError::MalformedSnn("assembled name is not 32 bytes"));
        Ok(Snn(name))
    }

    /// The name as raw ASCII bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SNN_LEN] { &self.0 }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { core::str::from_utf8(&self.0).expect("snn ascii fail") }
}


/// The AKA key schedule for one authentication round.
///
/// Built from a by-value [`AuthVector`] snapshot plus the serving network
/// name and SUPI; later mutation of the originating engine cannot reach it.
/// KAUSF is derived once and cached; KSEAF and KAMF derive it on demand, so
/// no call order can observe a missing prerequisite. HXRES* is independent
/// of the key chain.
///
/// Single-writer like the engine; distinct instances are independent.
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct Aka {
    ck: [u8; CK_LEN],
    ik: [u8; IK_LEN],
    sqn: [u8; SQN_LEN],
    ak: [u8; AK_LEN],
    rand: [u8; RAND_LEN],
    res_star: [u8; RES_STAR_LEN],
    #[zeroize(skip)]
    snn: Snn,
    supi: [u8; SUPI_MAX_LEN],
    supi_len: usize,
    kausf: Option<[u8; KAUSF_LEN]>,
}

impl Aka {
    /// Creates the schedule from a vector snapshot, serving network name and
    /// SUPI (the IMSI here; at most 15 bytes of ASCII).
    ///
    /// # Errors
    /// `LengthMismatch` when the SUPI exceeds 15 bytes.
    pub fn new(av: &AuthVector, snn: &Snn, supi: &str) -> Result<Self, AkaError> {
        ensure!(
            supi.len() <= SUPI_MAX_LEN,
            AkaError::LengthMismatch {
                field: "SUPI",
                expected: SUPI_MAX_LEN,
                actual: supi.len()
            }
        );
        let mut supi_buf = [0u8; SUPI_MAX_LEN];
        supi_buf[..supi.len()].copy_from_slice(supi.as_bytes());
        Ok(Aka {
            ck: av.ck,
            ik: av.ik,
            sqn: av.sqn,
            ak: av.ak,
            rand: av.rand,
            res_star: av.xres_star,
            snn: snn.clone(),
            supi: supi_buf,
            supi_len: supi.len(),
            kausf: None,
        })
    }

    /// Runs the engine to completion and snapshots the result in one step.
    ///
    /// # Errors
    /// Propagates engine errors plus the SUPI length check.
    pub fn from_milenage(engine: &mut Milenage, snn: &Snn, supi: &str) -> Result<Self, AkaError> {
        let av = engine.derive_auth_vector(snn)?;
        Aka::new(&av, snn, supi)
    }

    /// KAUSF per TS 33.501 Annex A.2: FC 0x6A keyed with `CK ‖ IK` over the
    /// serving network name and `SQN ⊕ AK`. Derived once and cached; the
    /// downstream keys hang off this value.
    pub fn compute_kausf(&mut self) -> [u8; KAUSF_LEN] {
        if let Some(kausf) = self.kausf {
            return kausf;
        }
        let mut key = [0u8; CK_LEN + IK_LEN];
        key[..CK_LEN].copy_from_slice(&self.ck);
        key[CK_LEN..].copy_from_slice(&self.ik);
        let kausf = kdf::derive(
            &key,
            kdf::FC_KAUSF,
            &[self.snn.as_bytes(), &xor(&self.sqn, &self.ak)],
        );
        self.kausf = Some(kausf);
        kausf
    }

    /// KSEAF anchor key per Annex A.6: FC 0x6C keyed with KAUSF over the
    /// serving network name.
    pub fn compute_kseaf(&mut self) -> [u8; KSEAF_LEN] {
        let kausf = self.compute_kausf();
        kdf::derive(&kausf, kdf::FC_KSEAF, &[self.snn.as_bytes()])
    }

    /// KAMF per Annex A.7: FC 0x6D keyed with KAUSF over the SUPI and the
    /// ABBA parameter. ABBA carries its initial-set value `0x0000`, followed
    /// in the input string by its literal length octets `0x00 0x02`.
    pub fn compute_kamf(&mut self) -> [u8; KAMF_LEN] {
        let kausf = self.compute_kausf();
        kdf::derive(&kausf, kdf::FC_KAMF, &[&self.supi[..self.supi_len], &ABBA])
    }

    /// HXRES*: the last 16 bytes of `SHA-256(RAND ‖ RES*)`, the low-entropy
    /// verifier the SEAF stores in place of RES* itself.
    #[must_use]
    pub fn compute_hxres_star(&self) -> [u8; HXRES_STAR_LEN] {
        let digest = sha256(&[&self.rand, &self.res_star]);
        digest[16..32].try_into().expect("hxres* width fail")
    }

    /// Compares a UE-returned RES* against the expected value in constant
    /// time.
    #[must_use]
    pub fn verify_res_star(&self, res_star: &[u8; RES_STAR_LEN]) -> bool {
        self.res_star.ct_eq(res_star).into()
    }
}
