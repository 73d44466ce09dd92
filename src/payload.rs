//! Interpretation of opened plaintext.
//!
//! Most payloads are plain UTF-8 text. Two JSON shapes are recognised:
//! `{"type":"key-publish"}` control messages, and structured messages of the
//! form `{"text": ..., "replyTo": {"txid": ..., "preview": ...}}`.

use serde_json::Value;

use crate::types::{DecryptedContent, Result};

const KEY_PUBLISH_TYPE: &str = "key-publish";

/// Maps opened bytes to content, or `None` for a key-publish message.
///
/// Fields are read individually: a field of an unexpected JSON type is
/// treated as absent rather than rejecting the whole object.
pub(crate) fn parse_payload(data: &[u8]) -> Result<Option<DecryptedContent>> {
    let text = std::str::from_utf8(data)?;

    if !text.starts_with('{') {
        return Ok(Some(DecryptedContent::new(text)));
    }

    let Ok(json) = serde_json::from_str::<Value>(text) else {
        return Ok(Some(DecryptedContent::new(text)));
    };

    if json.get("type").and_then(Value::as_str) == Some(KEY_PUBLISH_TYPE) {
        tracing::trace!("key-publish payload");
        return Ok(None);
    }

    let Some(message) = json.get("text").and_then(Value::as_str) else {
        return Ok(Some(DecryptedContent::new(text)));
    };

    let reply_to = json.get("replyTo");
    let reply_field = |name: &str| {
        reply_to
            .and_then(|reply| reply.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    Ok(Some(DecryptedContent {
        text: message.to_owned(),
        reply_to_id: reply_field("txid"),
        reply_to_preview: reply_field("preview"),
    }))
}
