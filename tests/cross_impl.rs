//! Cross-implementation tests for AlgoChat.
//!
//! These tests verify that Rust can decrypt messages encrypted by other
//! implementations. Each implementation exports one `<name>.hex` file per
//! fixture message into `test-envelopes-<impl>/`; directories that are not
//! present are skipped.
//!
//! Rust's own export is checked in-process: every fixture is encrypted,
//! hex-encoded and read back exactly as a peer would. The
//! `export_envelopes` example writes the same fixtures to
//! `test-envelopes-rust/` for the other implementations.

use std::fs;
use std::path::{Path, PathBuf};

use algochat::{decrypt, derive_keys_from_seed, encrypt, is_chat_message, Envelope, IdentityKeyPair};

const ALICE_SEED_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const BOB_SEED_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000002";

fn fixtures() -> Vec<(&'static str, String)> {
    vec![
        ("empty", String::new()),
        ("single_char", "X".to_string()),
        ("whitespace", "   \t\n   ".to_string()),
        ("numbers", "1234567890".to_string()),
        ("punctuation", "!@#$%^&*()_+-=[]{}\\|;':\",./<>?".to_string()),
        ("newlines", "Line 1\nLine 2\nLine 3".to_string()),
        ("emoji_simple", "Hello 👋 World 🌍".to_string()),
        ("emoji_zwj", "Family: 👨‍👩‍👧‍👦".to_string()),
        ("chinese", "你好世界 - Hello World".to_string()),
        ("arabic", "مرحبا بالعالم".to_string()),
        ("japanese", "こんにちは世界 カタカナ 漢字".to_string()),
        ("korean", "안녕하세요 세계".to_string()),
        ("accents", "Café résumé naïve".to_string()),
        ("cyrillic", "Привет мир".to_string()),
        ("json", r#"{"key": "value", "num": 42}"#.to_string()),
        ("html", r#"<div class="test">Content</div>"#.to_string()),
        ("url", "https://example.com/path?q=test&lang=en".to_string()),
        ("code", r#"func hello() { print("Hi") }"#.to_string()),
        (
            "long_text",
            "The quick brown fox jumps over the lazy dog. ".repeat(11),
        ),
        ("max_payload", "A".repeat(882)),
    ]
}

fn keys(seed_hex: &str) -> IdentityKeyPair {
    derive_keys_from_seed(&hex::decode(seed_hex).unwrap()).unwrap()
}

fn decrypt_hex(hex_content: &str, bob: &IdentityKeyPair) -> Option<String> {
    let envelope_bytes = hex::decode(hex_content.trim()).ok()?;

    if !is_chat_message(&envelope_bytes) {
        return None;
    }

    let envelope = Envelope::decode(&envelope_bytes).ok()?;
    let content = decrypt(&envelope, &bob.private_key, &bob.public_key, None).ok()??;
    Some(content.text)
}

fn find_envelope_dir(impl_name: &str) -> Option<PathBuf> {
    // Local export first (`cargo run --example export_envelopes`), then the
    // CI layout (checked out inside test-algochat), then sibling repos.
    [
        format!("test-envelopes-{}", impl_name),
        format!("../test-envelopes-{}", impl_name),
        format!("../test-algochat/test-envelopes-{}", impl_name),
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|path| path.exists())
}

/// Returns `(passed, failed)` for every fixture file found in `dir`.
fn verify_dir(dir: &Path, bob: &IdentityKeyPair) -> (usize, Vec<&'static str>) {
    let mut passed = 0;
    let mut failed = Vec::new();

    for (name, expected) in fixtures() {
        let path = dir.join(format!("{}.hex", name));
        let Ok(hex_content) = fs::read_to_string(&path) else {
            continue;
        };

        match decrypt_hex(&hex_content, bob) {
            Some(text) if text == expected => passed += 1,
            _ => failed.push(name),
        }
    }

    (passed, failed)
}

fn verify_implementation(impl_name: &str) {
    let Some(dir) = find_envelope_dir(impl_name) else {
        println!("Skipping {} envelope tests - directory not found", impl_name);
        return;
    };

    let bob = keys(BOB_SEED_HEX);
    let (passed, failed) = verify_dir(&dir, &bob);

    println!(
        "{} cross-impl: {}/{} passed",
        impl_name,
        passed,
        passed + failed.len()
    );
    assert!(
        failed.is_empty(),
        "{} envelopes failed to decrypt: {:?}",
        impl_name,
        failed
    );
}

#[test]
fn test_decrypt_swift_envelopes() {
    verify_implementation("swift");
}

#[test]
fn test_decrypt_typescript_envelopes() {
    verify_implementation("ts");
}

#[test]
fn test_decrypt_python_envelopes() {
    verify_implementation("python");
}

#[test]
fn test_decrypt_kotlin_envelopes() {
    verify_implementation("kotlin");
}

#[test]
fn test_decrypt_rust_envelopes() {
    verify_implementation("rust");
}

#[test]
fn test_rust_export_is_readable_by_recipient() {
    let alice = keys(ALICE_SEED_HEX);
    let bob = keys(BOB_SEED_HEX);

    for (name, message) in fixtures() {
        let envelope = encrypt(
            &message,
            &alice.private_key,
            &alice.public_key,
            &bob.public_key,
            None,
        )
        .unwrap();
        let exported = hex::encode(envelope.encode());

        assert_eq!(
            decrypt_hex(&exported, &bob).as_deref(),
            Some(message.as_str()),
            "fixture {}",
            name
        );
    }
}

#[test]
fn test_rust_export_is_readable_by_sender() {
    let alice = keys(ALICE_SEED_HEX);
    let bob = keys(BOB_SEED_HEX);

    for (name, message) in fixtures() {
        let envelope = encrypt(
            &message,
            &alice.private_key,
            &alice.public_key,
            &bob.public_key,
            None,
        )
        .unwrap();
        let exported = hex::encode(envelope.encode());

        assert_eq!(
            decrypt_hex(&exported, &alice).as_deref(),
            Some(message.as_str()),
            "fixture {}",
            name
        );
    }
}
