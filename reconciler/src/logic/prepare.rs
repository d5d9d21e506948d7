use chrono::{DateTime, Duration, Utc};
use log::info;
use stakesign_defs::{
    ContentHasher, HeaderSpec, ImageIndex, RepositoryIndex, SignError, SignMode, SignResult,
    Warnings,
};
use stakesign_utils::{encode_hex_payload, parse_iso8601_utc};

use super::codec::encode_entries;
use super::docker::prepare_docker;
use super::file::prepare_file;
use super::git::prepare_git;

pub const NO_STAKE_WARNING: &str = "Are you sure you don't want to set the advisory --stake? The signature's validity will be totally up to each verifier's defaults.";

#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub mode: SignMode,
    /// Files, git revisions or docker image handles, depending on `mode`.
    pub items: Vec<String>,
    pub stake_eth: Option<f64>,
    pub expire: Option<DateTime<Utc>>,
}

pub struct PrepareContext<'a> {
    pub repo: &'a dyn RepositoryIndex,
    pub images: &'a dyn ImageIndex,
    pub hasher: &'a dyn ContentHasher,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSignature {
    /// Header JSON line, without its newline.
    pub header: String,
    pub body: Vec<u8>,
    /// `0x` hex of header, newline and body: the transaction input to submit.
    pub payload_hex: String,
    pub warnings: Warnings,
}

/// Resolves `--expire` / `--expire-days` into an instant; at most one may be set.
pub fn resolve_expiry(
    expire: Option<&str>,
    expire_days: Option<i64>,
    now: DateTime<Utc>,
) -> SignResult<Option<DateTime<Utc>>> {
    match (expire, expire_days) {
        (Some(_), Some(_)) => Err(SignError::format("set one of --expire-days and --expire")),
        (Some(expire), None) => parse_iso8601_utc(expire)
            .map(Some)
            .ok_or_else(|| SignError::format(format!("Invalid --expire (expected ISO 8601): {}", expire))),
        (None, Some(days)) => Duration::try_days(days)
            .and_then(|days| now.checked_add_signed(days))
            .map(Some)
            .ok_or_else(|| SignError::format("--expire-days out of range")),
        (None, None) => Ok(None),
    }
}

pub async fn prepare_signature(
    ctx: &PrepareContext<'_>,
    request: &PrepareRequest,
) -> SignResult<PreparedSignature> {
    let mut warnings = Warnings::new();
    match request.stake_eth {
        Some(eth) if !eth.is_finite() || eth < 0.0 => {
            return Err(SignError::format(
                "--stake must be a finite, non-negative ETH amount",
            ))
        }
        Some(_) => {}
        None => warnings.add(NO_STAKE_WARNING),
    }

    let header = HeaderSpec {
        mode: request.mode,
        expire: request.expire,
        stake_ad_eth: request.stake_eth,
    }
    .to_json()
    .map_err(anyhow::Error::from)?;

    let body = match request.mode {
        SignMode::File => prepare_file(ctx.hasher, &request.items).await?,
        SignMode::Git => {
            let revisions = if request.items.is_empty() {
                vec!["HEAD".to_string()]
            } else {
                request.items.clone()
            };
            let (entries, git_warnings) = prepare_git(ctx.repo, &revisions).await?;
            warnings.merge(git_warnings);
            encode_entries(&entries).map_err(anyhow::Error::from)?
        }
        SignMode::Docker => {
            if request.items.is_empty() {
                return Err(SignError::format("No images given to sign"));
            }
            let entries = prepare_docker(ctx.images, &request.items).await?;
            encode_entries(&entries).map_err(anyhow::Error::from)?
        }
    };

    let mut payload = Vec::with_capacity(header.len() + 1 + body.len());
    payload.extend_from_slice(header.as_bytes());
    payload.push(b'\n');
    payload.extend_from_slice(&body);
    info!(
        "Prepared {} signature payload of {} bytes",
        request.mode,
        payload.len()
    );

    Ok(PreparedSignature {
        header,
        body,
        payload_hex: encode_hex_payload(&payload),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_expiry() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(resolve_expiry(None, None, now).unwrap(), None);
        assert_eq!(
            resolve_expiry(None, Some(30), now).unwrap(),
            Some(Utc.with_ymd_and_hms(2030, 1, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(
            resolve_expiry(Some("2031-02-03T04:05:06-01:00"), None, now).unwrap(),
            Some(Utc.with_ymd_and_hms(2031, 2, 3, 5, 5, 6).unwrap())
        );
        assert!(resolve_expiry(Some("2031-02-03"), Some(1), now).is_err());
        assert!(resolve_expiry(Some("soon"), None, now).is_err());
    }
}
