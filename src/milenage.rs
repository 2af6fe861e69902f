//! MILENAGE function set per 3GPP TS 35.205/35.206: f1, f1*, f2, f3, f4, f5
//! and f5* over AES-128, the OPc derivation, the AUTN/AUTS token layouts of
//! TS 33.102, and the RES* derivation of TS 33.501 Annex A.4.
//!
//! Every byte position, rotation offset and constant below is
//! interoperability-critical; the values come straight from TS 35.206 4.1.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aka::Snn;
use crate::helpers::{aes128_encrypt, ensure, xor};
use crate::kdf;
use crate::{
    AkaError, AK_LEN, AMF_LEN, AUTN_LEN, AUTS_LEN, CK_LEN, IK_LEN, K_LEN, MAC_LEN, OPC_LEN,
    OP_LEN, RAND_LEN, RES_LEN, RES_STAR_LEN, SQN_LEN,
};

// Rotation amounts from TS 35.206 4.1, reduced from bits to bytes: r1 = 64,
// r3 = 32, r4 = 64, r5 = 96. r2 = 0 and c1 = 0 have no representation here.
const R1: usize = 8;
const R3: usize = 4;
const R4: usize = 8;
const R5: usize = 12;

// Additive constants c2..c5; each flips a single bit of the last input byte.
const C2: u8 = 0x01;
const C3: u8 = 0x02;
const C4: u8 = 0x04;
const C5: u8 = 0x08;

// Dummy AMF for MAC-S, TS 33.102 6.3.3.
const AMF_RESYNC: [u8; AMF_LEN] = [0x00, 0x00];


/// Cyclic left rotation of a block by `n` bytes.
fn rot(x: &[u8; 16], n: usize) -> [u8; 16] {
    core::array::from_fn(|i| x[(i + n) % 16])
}

/// The low-order 48 bits of `sqn`, big-endian.
fn sqn_bytes(sqn: u64) -> [u8; SQN_LEN] {
    let be = sqn.to_be_bytes();
    be[2..8].try_into().expect("sqn width fail")
}


/// The operator variant field: either the per-operator OP, normalized to the
/// K-specific OPc on first use, or a pre-computed OPc supplied directly.
#[derive(Clone, Debug)]
pub enum OperatorField {
    /// Raw operator field OP; OPc is derived from it lazily.
    Op([u8; OP_LEN]),
    /// Pre-computed K-specific operator field OPc.
    Opc([u8; OPC_LEN]),
}

impl OperatorField {
    /// Wraps a raw 16-byte OP value.
    ///
    /// # Errors
    /// `LengthMismatch` if `bytes` is not 16 bytes.
    pub fn op(bytes: &[u8]) -> Result<Self, AkaError> {
        ensure!(
            bytes.len() == OP_LEN,
            AkaError::LengthMismatch { field: "OP", expected: OP_LEN, actual: bytes.len() }
        );
        Ok(OperatorField::Op(bytes.try_into().expect("op width fail")))
    }

    /// Wraps a pre-computed 16-byte OPc value.
    ///
    /// # Errors
    /// `LengthMismatch` if `bytes` is not 16 bytes.
    pub fn opc(bytes: &[u8]) -> Result<Self, AkaError> {
        ensure!(
            bytes.len() == OPC_LEN,
            AkaError::LengthMismatch { field: "OPc", expected: OPC_LEN, actual: bytes.len() }
        );
        Ok(OperatorField::Opc(bytes.try_into().expect("opc width fail")))
    }
}

impl Zeroize for OperatorField {
    fn zeroize(&mut self) {
        match self {
            OperatorField::Op(b) | OperatorField::Opc(b) => b.zeroize(),
        }
    }
}


/// Derives the K-specific operator field `OPc = AES-128(K, OP) ⊕ OP` per
/// TS 35.206 4.1. Deterministic; exposed for provisioning flows that store
/// OPc rather than OP.
///
/// # Errors
/// `LengthMismatch` if `k` or `op` is not 16 bytes.
pub fn compute_opc(k: &[u8], op: &[u8]) -> Result<[u8; OPC_LEN], AkaError> {
    ensure!(
        k.len() == K_LEN,
        AkaError::LengthMismatch { field: "K", expected: K_LEN, actual: k.len() }
    );
    ensure!(
        op.len() == OP_LEN,
        AkaError::LengthMismatch { field: "OP", expected: OP_LEN, actual: op.len() }
    );
    let k: [u8; K_LEN] = k.try_into().expect("k width fail");
    let op: [u8; OP_LEN] = op.try_into().expect("op width fail");
    Ok(xor(&aes128_encrypt(&k, &op)?, &op))
}


/// MILENAGE engine for one subscriber and one authentication round.
///
/// Holds the inputs (K, OP or OPc, RAND, SQN, AMF); each derivation is a pure
/// function of them, so identical inputs always produce identical outputs.
/// The only internal mutation is the one-time OP → OPc normalization.
///
/// An instance is not safe for concurrent use; two distinct instances are
/// fully independent.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct Milenage {
    k: [u8; K_LEN],
    operator: OperatorField,
    rand: [u8; RAND_LEN],
    sqn: [u8; SQN_LEN],
    amf: [u8; AMF_LEN],
}

impl Milenage {
    /// Creates an engine from subscriber credentials and the round inputs.
    /// `sqn` is stored as its low-order 6 bytes big-endian, `amf` as 2 bytes
    /// big-endian.
    ///
    /// # Errors
    /// `LengthMismatch` if `k` or `rand` is not 16 bytes.
    pub fn try_new(
        k: &[u8], operator: OperatorField, rand: &[u8], sqn: u64, amf: u16,
    ) -> Result<Self, AkaError> {
        ensure!(
            k.len() == K_LEN,
            AkaError::LengthMismatch { field: "K", expected: K_LEN, actual: k.len() }
        );
        ensure!(
            rand.len() == RAND_LEN,
            AkaError::LengthMismatch { field: "RAND", expected: RAND_LEN, actual: rand.len() }
        );
        Ok(Milenage {
            k: k.try_into().expect("k width fail"),
            operator,
            rand: rand.try_into().expect("rand width fail"),
            sqn: sqn_bytes(sqn),
            amf: amf.to_be_bytes(),
        })
    }

    /// Returns the K-specific operator field, deriving and caching it when
    /// the engine was constructed with OP. Subsequent derivations reuse the
    /// cached value.
    ///
    /// # Errors
    /// `CipherInit` if the block cipher rejects K (unreachable after
    /// construction).
    pub fn opc(&mut self) -> Result<[u8; OPC_LEN], AkaError> {
        let opc = match &self.operator {
            OperatorField::Op(op) => compute_opc(&self.k, op)?,
            OperatorField::Opc(opc) => return Ok(*opc),
        };
        self.operator = OperatorField::Opc(opc);
        Ok(opc)
    }

    // Shared kernel of f1 and f1*: OUT1 per TS 35.206 4.1.
    //
    // TEMP = E[RAND ⊕ OPc]K
    // IN1  = SQN ‖ AMF ‖ SQN ‖ AMF
    // OUT1 = E[TEMP ⊕ rot(IN1 ⊕ OPc, r1) ⊕ c1]K ⊕ OPc    (c1 = 0)
    fn f1base(
        &mut self, sqn: &[u8; SQN_LEN], amf: &[u8; AMF_LEN],
    ) -> Result<[u8; 16], AkaError> {
        let opc = self.opc()?;
        let temp = aes128_encrypt(&self.k, &xor(&self.rand, &opc))?;

        let mut in1 = [0u8; 16];
        in1[0..6].copy_from_slice(sqn);
        in1[6..8].copy_from_slice(amf);
        in1[8..14].copy_from_slice(sqn);
        in1[14..16].copy_from_slice(amf);

        let rotated = rot(&xor(&in1, &opc), R1);
        Ok(xor(&aes128_encrypt(&self.k, &xor(&rotated, &temp))?, &opc))
    }

    /// Network authentication function f1: MAC-A over this round's SQN and
    /// AMF, the first half of OUT1.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn f1(&mut self) -> Result<[u8; MAC_LEN], AkaError> {
        let (sqn, amf) = (self.sqn, self.amf);
        let out1 = self.f1base(&sqn, &amf)?;
        Ok(out1[..MAC_LEN].try_into().expect("mac-a width fail"))
    }

    /// Resynchronisation authentication function f1*: MAC-S over a caller
    /// supplied SQN/AMF pair, the second half of OUT1.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn f1_star(&mut self, sqn: u64, amf: u16) -> Result<[u8; MAC_LEN], AkaError> {
        let out1 = self.f1base(&sqn_bytes(sqn), &amf.to_be_bytes())?;
        Ok(out1[MAC_LEN..].try_into().expect("mac-s width fail"))
    }

    /// Functions f2–f5 in one pass over the shared TEMP block: returns
    /// `(RES, CK, IK, AK)`.
    ///
    /// OUT2 = E[(TEMP ⊕ OPc) ⊕ c2]K ⊕ OPc with AK = OUT2\[0..6\] and
    /// RES = OUT2\[8..16\]; OUT3 (CK) and OUT4 (IK) apply the r3/c3 and
    /// r4/c4 parameters to the same TEMP ⊕ OPc block.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn f2345(
        &mut self,
    ) -> Result<([u8; RES_LEN], [u8; CK_LEN], [u8; IK_LEN], [u8; AK_LEN]), AkaError> {
        let opc = self.opc()?;
        let temp = aes128_encrypt(&self.k, &xor(&self.rand, &opc))?;
        let tx = xor(&temp, &opc);

        let mut r = tx;
        r[15] ^= C2;
        let out2 = xor(&aes128_encrypt(&self.k, &r)?, &opc);

        let mut r = rot(&tx, R3);
        r[15] ^= C3;
        let ck = xor(&aes128_encrypt(&self.k, &r)?, &opc);

        let mut r = rot(&tx, R4);
        r[15] ^= C4;
        let ik = xor(&aes128_encrypt(&self.k, &r)?, &opc);

        let res = out2[8..16].try_into().expect("res width fail");
        let ak = out2[0..6].try_into().expect("ak width fail");
        Ok((res, ck, ik, ak))
    }

    /// Resynchronisation anonymity key function f5*: AK-S via the r5/c5
    /// parameters.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn f5_star(&mut self) -> Result<[u8; AK_LEN], AkaError> {
        let opc = self.opc()?;
        let temp = aes128_encrypt(&self.k, &xor(&self.rand, &opc))?;
        let mut r = rot(&xor(&temp, &opc), R5);
        r[15] ^= C5;
        let out5 = xor(&aes128_encrypt(&self.k, &r)?, &opc);
        Ok(out5[..AK_LEN].try_into().expect("ak-s width fail"))
    }

    /// Builds the authentication token `AUTN = (SQN ⊕ AK) ‖ AMF ‖ MAC-A`.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn generate_autn(&mut self) -> Result<[u8; AUTN_LEN], AkaError> {
        let mac_a = self.f1()?;
        let (_, _, _, ak) = self.f2345()?;
        let mut autn = [0u8; AUTN_LEN];
        autn[0..6].copy_from_slice(&xor(&self.sqn, &ak));
        autn[6..8].copy_from_slice(&self.amf);
        autn[8..16].copy_from_slice(&mac_a);
        Ok(autn)
    }

    /// Builds the resynchronisation token `AUTS = (SQN ⊕ AK-S) ‖ MAC-S`.
    ///
    /// MAC-S is computed over this round's SQN with the dummy AMF value
    /// `0x0000` as TS 33.102 6.3.3 requires; nothing else about the engine
    /// changes.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn generate_auts(&mut self) -> Result<[u8; AUTS_LEN], AkaError> {
        let sqn = self.sqn;
        let out1 = self.f1base(&sqn, &AMF_RESYNC)?;
        let mac_s: [u8; MAC_LEN] = out1[MAC_LEN..].try_into().expect("mac-s width fail");
        let ak_s = self.f5_star()?;

        let mut auts = [0u8; AUTS_LEN];
        auts[0..6].copy_from_slice(&xor(&self.sqn, &ak_s));
        auts[6..14].copy_from_slice(&mac_s);
        Ok(auts)
    }

    /// Derives the 5G-augmented response RES* (TS 33.501 Annex A.4) for the
    /// serving network identified by `mcc`/`mnc`.
    ///
    /// # Errors
    /// `MalformedSnn` on invalid MCC/MNC; otherwise propagates `CipherInit`.
    pub fn compute_res_star(
        &mut self, mcc: &str, mnc: &str,
    ) -> Result<[u8; RES_STAR_LEN], AkaError> {
        let snn = Snn::new(mcc, mnc)?;
        self.res_star(&snn)
    }

    /// RES* against an already-built serving network name: the last 16 bytes
    /// of `HMAC-SHA-256(CK ‖ IK, 0x6B ‖ SNN ‖ L ‖ RAND ‖ L ‖ RES ‖ L)`.
    ///
    /// # Errors
    /// Propagates `CipherInit` from the block cipher.
    pub fn res_star(&mut self, snn: &Snn) -> Result<[u8; RES_STAR_LEN], AkaError> {
        let (res, ck, ik, _) = self.f2345()?;
        let mut key = [0u8; CK_LEN + IK_LEN];
        key[..CK_LEN].copy_from_slice(&ck);
        key[CK_LEN..].copy_from_slice(&ik);
        let t = kdf::derive(&key, kdf::FC_RES_STAR, &[snn.as_bytes(), &self.rand, &res]);
        Ok(t[16..32].try_into().expect("res* width fail"))
    }

    /// Runs the complete derivation for this round and returns the by-value
    /// vector snapshot consumed by the AKA key schedule. Later mutation of
    /// the engine cannot alias into the snapshot.
    ///
    /// # Errors
    /// Propagates any error from the underlying derivations.
    pub fn derive_auth_vector(&mut self, snn: &Snn) -> Result<AuthVector, AkaError> {
        let (xres, ck, ik, ak) = self.f2345()?;
        let autn = self.generate_autn()?;
        let xres_star = self.res_star(snn)?;
        Ok(AuthVector {
            rand: self.rand,
            sqn: self.sqn,
            autn,
            xres,
            xres_star,
            ck,
            ik,
            ak,
        })
    }
}


/// A complete 5G authentication vector for one round, passed by value into
/// the AKA key schedule.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthVector {
    /// Random challenge the vector was derived from.
    pub rand: [u8; RAND_LEN],
    /// Sequence number of this round, 6 bytes big-endian.
    pub sqn: [u8; SQN_LEN],
    /// Authentication token for the UE.
    pub autn: [u8; AUTN_LEN],
    /// Expected response xRES.
    pub xres: [u8; RES_LEN],
    /// 5G-augmented expected response xRES*.
    pub xres_star: [u8; RES_STAR_LEN],
    /// Confidentiality key.
    pub ck: [u8; CK_LEN],
    /// Integrity key.
    pub ik: [u8; IK_LEN],
    /// Anonymity key.
    pub ak: [u8; AK_LEN],
}


#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use crate::milenage::{compute_opc, rot, Milenage, OperatorField};

    #[test]
    fn test_rot_offsets() {
        let x: [u8; 16] = core::array::from_fn(|i| u8::try_from(i).unwrap());
        assert_eq!(rot(&x, 0), x);
        assert_eq!(rot(&x, 4)[0], 4);
        assert_eq!(rot(&x, 12)[15], 11);
        assert_eq!(rot(&rot(&x, 8), 8), x);
    }

    #[test]
    fn test_opc_test_set_1() {
        // TS 35.208 test set 1
        let opc = compute_opc(
            &hex!("465b5ce8b199b49faa5f0a2ee238a6bc"),
            &hex!("cdc202d5123e20f62b6d676ac72cb318"),
        )
        .unwrap();
        assert_eq!(opc, hex!("cd63cb71954a9f4e48a5994e37a02baf"));
    }

    #[test]
    fn test_op_and_opc_paths_agree() {
        let k = hex!("00112233445566778899aabbccddeeff");
        let op = hex!("00112233445566778899aabbccddeeff");
        let rand = hex!("00112233445566778899aabbccddeeff");
        let opc = compute_opc(&k, &op).unwrap();

        let mut via_op =
            Milenage::try_new(&k, OperatorField::op(&op).unwrap(), &rand, 1, 0x8000).unwrap();
        let mut via_opc =
            Milenage::try_new(&k, OperatorField::opc(&opc).unwrap(), &rand, 1, 0x8000).unwrap();

        assert_eq!(via_op.opc().unwrap(), opc);
        assert_eq!(via_op.f1().unwrap(), via_opc.f1().unwrap());
        assert_eq!(via_op.f2345().unwrap(), via_opc.f2345().unwrap());
        assert_eq!(via_op.f5_star().unwrap(), via_opc.f5_star().unwrap());
        assert_eq!(via_op.generate_autn().unwrap(), via_opc.generate_autn().unwrap());
    }

    #[test]
    fn test_autn_layout() {
        let k = hex!("465b5ce8b199b49faa5f0a2ee238a6bc");
        let op = hex!("cdc202d5123e20f62b6d676ac72cb318");
        let mut m = Milenage::try_new(
            &k,
            OperatorField::op(&op).unwrap(),
            &hex!("23553cbe9637a89d218ae64dae47bf35"),
            0xff9b_b4d0_b607,
            0xb9b9,
        )
        .unwrap();

        let autn = m.generate_autn().unwrap();
        let mac_a = m.f1().unwrap();
        let (_, _, _, ak) = m.f2345().unwrap();

        let sqn: [u8; 6] = core::array::from_fn(|i| autn[i] ^ ak[i]);
        assert_eq!(sqn, hex!("ff9bb4d0b607"));
        assert_eq!(autn[6..8], hex!("b9b9"));
        assert_eq!(autn[8..16], mac_a);
    }

    #[test]
    fn test_auts_layout() {
        let k = hex!("465b5ce8b199b49faa5f0a2ee238a6bc");
        let op = hex!("cdc202d5123e20f62b6d676ac72cb318");
        let mut m = Milenage::try_new(
            &k,
            OperatorField::op(&op).unwrap(),
            &hex!("23553cbe9637a89d218ae64dae47bf35"),
            0xff9b_b4d0_b607,
            0xb9b9,
        )
        .unwrap();

        let auts = m.generate_auts().unwrap();
        let ak_s = m.f5_star().unwrap();
        let mac_s = m.f1_star(0xff9b_b4d0_b607, 0x0000).unwrap();

        let sqn: [u8; 6] = core::array::from_fn(|i| auts[i] ^ ak_s[i]);
        assert_eq!(sqn, hex!("ff9bb4d0b607"));
        assert_eq!(auts[6..14], mac_s);
    }

    #[test]
    fn test_determinism() {
        let k = hex!("fec86ba6eb707ed08905757b1bb44b8f");
        let op = hex!("dbc59adcb6f9a0ef735477b7fadf8374");
        let rand = hex!("9f7c8d021accf4db213ccff0c7f71a6a");
        let mut a =
            Milenage::try_new(&k, OperatorField::op(&op).unwrap(), &rand, 77, 0x725c).unwrap();
        let mut b =
            Milenage::try_new(&k, OperatorField::op(&op).unwrap(), &rand, 77, 0x725c).unwrap();
        for _ in 0..3 {
            assert_eq!(a.f2345().unwrap(), b.f2345().unwrap());
            assert_eq!(a.f1().unwrap(), b.f1().unwrap());
        }
    }
}
