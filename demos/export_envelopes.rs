//! Export test envelopes for cross-implementation verification.
//!
//! Writes one `<fixture>.hex` file per message, encrypted from Alice to Bob,
//! into the directory given as the first argument (default
//! `test-envelopes-rust`).

use std::error::Error;
use std::fs;
use std::path::Path;

use algochat::{derive_keys_from_seed, encrypt_message};

const ALICE_SEED_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const BOB_SEED_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000002";

fn test_messages() -> Vec<(&'static str, String)> {
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

fn main() -> Result<(), Box<dyn Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test-envelopes-rust".to_string());

    let alice = derive_keys_from_seed(&hex::decode(ALICE_SEED_HEX)?)?;
    let bob = derive_keys_from_seed(&hex::decode(BOB_SEED_HEX)?)?;

    let output_path = Path::new(&output_dir);
    fs::create_dir_all(output_path)?;

    let messages = test_messages();
    for (name, message) in &messages {
        let envelope =
            encrypt_message(message, &alice.private_key, &alice.public_key, &bob.public_key)?;
        fs::write(
            output_path.join(format!("{}.hex", name)),
            hex::encode(envelope.encode()),
        )?;
        println!("✓ {}", name);
    }

    println!(
        "Rust: exported {} envelopes to {}",
        messages.len(),
        output_dir
    );
    Ok(())
}
