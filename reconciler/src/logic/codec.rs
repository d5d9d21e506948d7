use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use stakesign_defs::{Header, SignError, SignResult, PROTOCOL_TAG};

/// Splits a signature payload into its header and the still-unparsed body.
///
/// Only the protocol field is checked here; every other header field is
/// validated by whichever step consumes it.
pub fn decode_manifest(payload: &[u8]) -> SignResult<(Header, &[u8])> {
    let pos = payload
        .iter()
        .position(|b| *b == b'\n')
        .unwrap_or(payload.len());

    let fields = serde_json::from_slice::<Map<String, Value>>(&payload[..pos])
        .ok()
        .filter(|fields| matches!(fields.get(PROTOCOL_TAG), Some(Value::String(_))))
        .ok_or_else(|| {
            SignError::format(
                "Transaction input isn't consistent with stakesign format; check transaction ID",
            )
        })?;

    let body: &[u8] = if pos < payload.len() {
        &payload[pos + 1..]
    } else {
        &[]
    };
    Ok((Header::from_fields(fields), body))
}

/// Parses every non-empty body line as one entry. A single bad record fails
/// the whole body.
pub fn parse_entries<T: DeserializeOwned>(body: &[u8]) -> SignResult<Vec<T>> {
    body.split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_slice::<T>(line)
                .map_err(|_| SignError::format("Invalid signature syntax"))
        })
        .collect()
}

/// Newline-terminated compact JSON, one entry per line.
pub fn encode_entries<T: Serialize>(entries: &[T]) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut body, entry)?;
        body.push(b'\n');
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stakesign_defs::{GitEntry, SignMode};

    #[test]
    fn test_decode_splits_at_first_newline() {
        let payload = b"{\"stakesign\":\"git\",\"expire\":\"2030-01-01T00:00:00Z\"}\n{\"commit\":\"ab\"}\n";
        let (header, body) = decode_manifest(payload).unwrap();
        assert_eq!(header.mode().unwrap(), SignMode::Git);
        assert_eq!(body, b"{\"commit\":\"ab\"}\n");
    }

    #[test]
    fn test_decode_header_only() {
        let (header, body) = decode_manifest(b"{\"stakesign\":\"docker\"}").unwrap();
        assert_eq!(header.mode().unwrap(), SignMode::Docker);
        assert!(body.is_empty());
    }

    #[test]
    fn test_decode_rejects_foreign_payloads() {
        for payload in [
            &b"hello world\n"[..],
            &b"[1,2,3]\n"[..],
            &b"{\"other\":\"git\"}\n"[..],
            &b"{\"stakesign\":7}\n"[..],
            &b""[..],
        ] {
            match decode_manifest(payload) {
                Err(SignError::Format(msg)) => assert!(msg.contains("check transaction ID")),
                other => panic!("expected format error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_defers_mode_validation() {
        let (header, _) = decode_manifest(b"{\"stakesign\":\"svn\"}\n").unwrap();
        assert!(header.mode().is_err());
    }

    #[test]
    fn test_parse_entries_skips_blank_lines() {
        let body = format!(
            "\n{{\"commit\":\"{}\"}}\n\n{{\"commit\":\"{}\",\"tag\":\"v1\"}}\n",
            "a".repeat(40),
            "b".repeat(40)
        );
        let entries: Vec<GitEntry> = parse_entries(body.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].tag.as_deref(), Some("v1"));
    }

    #[test]
    fn test_parse_entries_one_bad_record_fails_all() {
        let body = format!("{{\"commit\":\"{}\"}}\n{{\"tag\":\"v1\"}}\n", "a".repeat(40));
        let parsed = parse_entries::<GitEntry>(body.as_bytes());
        assert!(matches!(parsed, Err(SignError::Format(_))));

        let parsed = parse_entries::<GitEntry>(b"{\"commit\":\"ab\"\n");
        assert!(matches!(parsed, Err(SignError::Format(_))));

        let parsed = parse_entries::<GitEntry>(b"{\"commit\":42}\n");
        assert!(matches!(parsed, Err(SignError::Format(_))));
    }

    #[test]
    fn test_encode_entries_newline_terminated() {
        let entries = vec![
            GitEntry {
                commit: "a".repeat(40),
                tag: None,
                tag_object: None,
            },
            GitEntry {
                commit: "b".repeat(40),
                tag: Some("v2".to_string()),
                tag_object: Some("c".repeat(40)),
            },
        ];
        let body = encode_entries(&entries).unwrap();
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(text.ends_with("\"}\n"));
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"tagObject\""));
        assert_eq!(parse_entries::<GitEntry>(&body).unwrap(), entries);
    }
}
