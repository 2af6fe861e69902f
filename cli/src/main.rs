//! Scripted demonstration of one full 5G-AKA round from caller-supplied
//! subscriber credentials, printing the canonical derivation trace.
//!
//! The trace format (section headers, 12-column labels, lowercase hex) is
//! pinned by the golden-output test below; treat any change as a breaking
//! one for downstream regression checks.

use std::env;
use std::fmt::Write as _;
use std::process::ExitCode;

use fiveg_aka::{Aka, AkaError, Milenage, OperatorField, Snn};

struct Args {
    imsi: String,
    k: Vec<u8>,
    op: Vec<u8>,
    sqn: u64,
    amf: u16,
    rand: Vec<u8>,
}

fn hex_value(flag: &str, value: &str) -> Result<Vec<u8>, String> {
    hex::decode(value).map_err(|e| format!("{flag}: {e}"))
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let (mut imsi, mut k, mut op, mut sqn, mut amf, mut rand) =
        (None, None, None, None, None, None);

    let mut it = argv.iter();
    while let Some(flag) = it.next() {
        let value = it.next().ok_or_else(|| format!("{flag} expects a value"))?;
        match flag.as_str() {
            "--imsi" => imsi = Some(value.clone()),
            "--k" => k = Some(hex_value("--k", value)?),
            "--op" => op = Some(hex_value("--op", value)?),
            "--sqn" => {
                sqn = Some(u64::from_str_radix(value, 16).map_err(|e| format!("--sqn: {e}"))?);
            }
            "--amf" => {
                amf = Some(u16::from_str_radix(value, 16).map_err(|e| format!("--amf: {e}"))?);
            }
            "--rand" => rand = Some(hex_value("--rand", value)?),
            other => return Err(format!("unknown flag {other}")),
        }
    }

    let imsi = imsi.ok_or("--imsi is required")?;
    if imsi.len() != 15 || !imsi.bytes().all(|b| b.is_ascii_digit()) {
        return Err("--imsi must be exactly 15 decimal digits".into());
    }

    Ok(Args {
        imsi,
        k: k.ok_or("--k is required")?,
        op: op.ok_or("--op is required")?,
        sqn: sqn.ok_or("--sqn is required")?,
        amf: amf.ok_or("--amf is required")?,
        rand: rand.ok_or("--rand is required")?,
    })
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<12}{value}");
}

fn run(args: &Args) -> Result<String, AkaError> {
    // IMSI = 3 MCC digits, 2 MNC digits, MSIN; the full string is the SUPI.
    let mcc = &args.imsi[0..3];
    let mnc = &args.imsi[3..5];
    let snn = Snn::new(mcc, mnc)?;

    let mut engine = Milenage::try_new(
        &args.k,
        OperatorField::op(&args.op)?,
        &args.rand,
        args.sqn,
        args.amf,
    )?;
    let opc = engine.opc()?;
    let mac_a = engine.f1()?;
    let av = engine.derive_auth_vector(&snn)?;

    let mut aka = Aka::new(&av, &snn, &args.imsi)?;
    let kausf = aka.compute_kausf();
    let kseaf = aka.compute_kseaf();
    let kamf = aka.compute_kamf();
    let hxres_star = aka.compute_hxres_star();

    let mut out = String::new();
    let _ = writeln!(out, "5G-AKA single-round derivation");
    let _ = writeln!(out);
    let _ = writeln!(out, "[subscriber]");
    line(&mut out, "imsi", &args.imsi);
    line(&mut out, "k", &hex::encode(&args.k));
    line(&mut out, "op", &hex::encode(&args.op));
    line(&mut out, "sqn", &hex::encode(av.sqn));
    line(&mut out, "amf", &hex::encode(args.amf.to_be_bytes()));
    line(&mut out, "rand", &hex::encode(av.rand));
    let _ = writeln!(out);
    let _ = writeln!(out, "[milenage]");
    line(&mut out, "opc", &hex::encode(opc));
    line(&mut out, "mac_a", &hex::encode(mac_a));
    line(&mut out, "xres", &hex::encode(av.xres));
    line(&mut out, "ck", &hex::encode(av.ck));
    line(&mut out, "ik", &hex::encode(av.ik));
    line(&mut out, "ak", &hex::encode(av.ak));
    line(&mut out, "autn", &hex::encode(av.autn));
    let _ = writeln!(out);
    let _ = writeln!(out, "[key hierarchy]");
    line(&mut out, "snn", snn.as_str());
    line(&mut out, "xres_star", &hex::encode(av.xres_star));
    line(&mut out, "hxres_star", &hex::encode(hxres_star));
    line(&mut out, "kausf", &hex::encode(kausf));
    line(&mut out, "kseaf", &hex::encode(kseaf));
    line(&mut out, "kamf", &hex::encode(kamf));
    Ok(out)
}

fn main() -> ExitCode {
    let argv: Vec<String> = env::args().skip(1).collect();

    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!(
                "usage: fiveg-aka-cli --imsi <digits15> --k <hex> --op <hex> \
                 --sqn <hex> --amf <hex> --rand <hex>"
            );
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(trace) => {
            print!("{trace}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}


#[cfg(test)]
mod tests {
    use crate::{parse_args, run};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    const GOLDEN_ARGS: &[&str] = &[
        "--imsi", "001010123456789",
        "--k", "00112233445566778899aabbccddeeff",
        "--op", "00112233445566778899aabbccddeeff",
        "--sqn", "1",
        "--amf", "8000",
        "--rand", "00112233445566778899aabbccddeeff",
    ];

    const GOLDEN_TRACE: &str = "5G-AKA single-round derivation

[subscriber]
imsi        001010123456789
k           00112233445566778899aabbccddeeff
op          00112233445566778899aabbccddeeff
sqn         000000000001
amf         8000
rand        00112233445566778899aabbccddeeff

[milenage]
opc         62e75b8d6fa5bf46ec87a9276f9df54d
mac_a       4af30b82a8531115
xres        700eb2300b2c4799
ck          b379874b3d183d2a21291d439e7761e1
ik          f4706f66629cf7ddf881d80025bf1255
ak          de656c8b0bce
autn        de656c8b0bcf80004af30b82a8531115

[key hierarchy]
snn         5G:mnc001.mcc001.3gppnetwork.org
xres_star   31b6d938a5290ccc65bc829f9820a8d9
hxres_star  3308fb7cf06a35f1cd086b904ce82ecf
kausf       fe8d2546b6971c510329cd8ae34c177d6569486aa9b71159cc3b5c752a93bd10
kseaf       442ac77e2366d8084cb447883b03311065ea6bbd8753cf87e92c0669019cf829
kamf        e0c07aacbba7d77ad55efa309882963a9d46dbc9f0045026df89a5d9a30d9915
";

    #[test]
    fn test_golden_trace() {
        let args = parse_args(&argv(GOLDEN_ARGS)).unwrap();
        assert_eq!(run(&args).unwrap(), GOLDEN_TRACE);
    }

    #[test]
    fn test_rejects_bad_imsi() {
        let args = argv(&["--imsi", "12345"]);
        assert!(parse_args(&args).is_err());

        let args = argv(&["--imsi", "00101012345678x"]);
        assert!(parse_args(&args).is_err());
    }

    #[test]
    fn test_rejects_missing_and_unknown_flags() {
        assert!(parse_args(&argv(&["--k"])).is_err());
        assert!(parse_args(&argv(&["--frequency", "7"])).is_err());
        assert!(parse_args(&argv(&[])).is_err());
    }

    #[test]
    fn test_library_rejects_short_key() {
        let mut args = parse_args(&argv(GOLDEN_ARGS)).unwrap();
        args.k.truncate(15);
        assert!(run(&args).is_err());
    }
}
