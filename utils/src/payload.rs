use anyhow::{anyhow, Context, Result};

/// Decodes a `0x`-prefixed hex transaction input.
pub fn decode_hex_payload(input: &str) -> Result<Vec<u8>> {
    let digits = input
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("Transaction input isn't 0x-prefixed hex"))?;
    hex::decode(digits).context("Transaction input isn't valid hex")
}

pub fn encode_hex_payload(payload: &[u8]) -> String {
    format!("0x{}", hex::encode(payload))
}

/// Renders untrusted bytes for a terminal: lossy UTF-8 with control characters
/// other than newline and tab escaped.
pub fn escape_untrusted(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}
