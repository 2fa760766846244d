//! End-to-end sign/verify scenarios driving the orchestrators against real
//! directory trees.
//!
//! The flows resolve files relative to the process working directory, so
//! each scenario runs inside its own temporary directory under a shared
//! lock.

use std::{fs, path::Path, sync::Mutex};

use signet_cli::{exit, sign, verify};
use signet_crypto::{keyid, SignatureScheme};
use signet_manifest::read_manifest;

static CWD_LOCK: Mutex<()> = Mutex::new(());

const MANIFEST: &str = "signatures.json";

fn in_temp_dir(scenario: impl FnOnce()) {
    let _guard = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    scenario();
    std::env::set_current_dir(previous).unwrap();
}

fn write_demo_files() -> Vec<String> {
    fs::write("a.txt", "A").unwrap();
    fs::write("b.txt", "B").unwrap();
    fs::write("c.txt", "C").unwrap();
    vec!["a.txt".into(), "b.txt".into(), "c.txt".into()]
}

fn sign_demo(scheme: SignatureScheme) -> String {
    let files = write_demo_files();
    let rc = sign::do_signing(Path::new(MANIFEST), scheme, "demo", &files, false);
    assert_eq!(rc, exit::OK);
    verification_id_from_manifest()
}

/// Recomputes the id the sign flow logged, from the persisted manifest.
fn verification_id_from_manifest() -> String {
    let manifest = read_manifest(Path::new(MANIFEST)).unwrap();
    keyid::verification_id(
        &manifest.context_id,
        &manifest.public_key_bytes().unwrap(),
        &manifest.timestamp,
        &manifest.hostname,
    )
}

#[test]
fn sign_verify_round_trip() {
    in_temp_dir(|| {
        let id = sign_demo(SignatureScheme::Ed25519);

        // The id recomputed at verify time equals the id from sign time.
        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::OK);
    });
}

#[test]
fn round_trip_with_ecdsap521() {
    in_temp_dir(|| {
        let id = sign_demo(SignatureScheme::EcDsaP521);
        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::OK);
    });
}

#[test]
fn tampering_with_one_file_fails_verification() {
    in_temp_dir(|| {
        let id = sign_demo(SignatureScheme::Ed25519);

        let mut contents = fs::read("b.txt").unwrap();
        contents.push(b'!');
        fs::write("b.txt", contents).unwrap();

        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::ERROR);
    });
}

#[test]
fn tampering_with_the_manifest_aborts_verification() {
    in_temp_dir(|| {
        let id = sign_demo(SignatureScheme::Ed25519);

        // Flip one character of the persisted timestamp field.
        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(MANIFEST).unwrap()).unwrap();
        let timestamp = json["timestamp"].as_str().unwrap();
        let flipped: String = {
            let mut chars: Vec<char> = timestamp.chars().collect();
            chars[3] = if chars[3] == '9' { '8' } else { '9' };
            chars.into_iter().collect()
        };
        json["timestamp"] = serde_json::Value::String(flipped);
        fs::write(MANIFEST, serde_json::to_string(&json).unwrap()).unwrap();

        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::ERROR);
    });
}

#[test]
fn missing_file_degrades_to_a_warning() {
    in_temp_dir(|| {
        let id = sign_demo(SignatureScheme::Ed25519);
        fs::remove_file("c.txt").unwrap();

        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::WARNING);
    });
}

#[test]
fn wrong_verification_id_is_an_error() {
    in_temp_dir(|| {
        let _ = sign_demo(SignatureScheme::Ed25519);

        assert_eq!(
            verify::do_verification(Path::new(MANIFEST), "AAAA-BBBB-CC"),
            exit::ERROR
        );
    });
}

#[test]
fn unreadable_manifest_is_an_error() {
    in_temp_dir(|| {
        assert_eq!(
            verify::do_verification(Path::new(MANIFEST), "AAAA-BBBB-CC"),
            exit::ERROR
        );
    });
}

#[test]
fn signing_a_subdirectory_file_stores_a_slash_key() {
    in_temp_dir(|| {
        fs::create_dir("sub").unwrap();
        fs::write(Path::new("sub").join("d.txt"), "D").unwrap();
        let file = Path::new("sub").join("d.txt").to_string_lossy().into_owned();

        let rc = sign::do_signing(
            Path::new(MANIFEST),
            SignatureScheme::Ed25519,
            "demo",
            &[file],
            false,
        );
        assert_eq!(rc, exit::OK);

        let manifest = read_manifest(Path::new(MANIFEST)).unwrap();
        assert!(manifest.file_signatures.contains_key("sub/d.txt"));

        let id = verification_id_from_manifest();
        assert_eq!(verify::do_verification(Path::new(MANIFEST), &id), exit::OK);
    });
}
