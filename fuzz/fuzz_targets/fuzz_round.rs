#![no_main]

use fiveg_aka::{Aka, Milenage, OperatorField, Snn};
use libfuzzer_sys::fuzz_target;

// 16 K + 16 OP + 16 RAND + 6 SQN + 2 AMF + 1 selector byte
fuzz_target!(|data: [u8; 57]| {
    let k = &data[0..16];
    let op = &data[16..32];
    let rand = &data[32..48];

    let mut sqn8 = [0u8; 8];
    sqn8[2..8].copy_from_slice(&data[48..54]);
    let sqn = u64::from_be_bytes(sqn8);
    let amf = u16::from_be_bytes([data[54], data[55]]);

    // Exercise both operator-field paths.
    let operator = if data[56] & 1 == 0 {
        OperatorField::op(op).unwrap()
    } else {
        OperatorField::opc(op).unwrap()
    };

    let mut m = Milenage::try_new(k, operator, rand, sqn, amf).unwrap();

    // AUTN must always unmask back to the SQN/AMF that went in.
    let autn = m.generate_autn().unwrap();
    let (_, _, _, ak) = m.f2345().unwrap();
    for i in 0..6 {
        assert_eq!(autn[i] ^ ak[i], data[48 + i]);
    }
    assert_eq!(&autn[6..8], &data[54..56]);

    // AUTS likewise, against the resync anonymity key.
    let auts = m.generate_auts().unwrap();
    let ak_s = m.f5_star().unwrap();
    for i in 0..6 {
        assert_eq!(auts[i] ^ ak_s[i], data[48 + i]);
    }

    // The key schedule never fails on a valid vector, and repeated
    // derivations agree.
    let snn = Snn::new("001", "01").unwrap();
    let mut aka = Aka::from_milenage(&mut m, &snn, "001010123456789").unwrap();
    let kseaf = aka.compute_kseaf();
    assert_eq!(kseaf, aka.compute_kseaf());
    assert_eq!(aka.compute_hxres_star().len(), 16);
});
