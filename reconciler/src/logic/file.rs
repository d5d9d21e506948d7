use log::debug;
use stakesign_defs::{ContentHasher, Reconciliation, SignError, SignResult};

/// Hands the manifest body to the content hasher's own check mode; the body is
/// never parsed here.
pub async fn verify_file(
    hasher: &dyn ContentHasher,
    body: &[u8],
    ignore_missing: bool,
) -> SignResult<Reconciliation> {
    debug!("Checking {} manifest bytes with {}", body.len(), hasher.describe());
    if !hasher.check(body, ignore_missing).await? {
        return Err(SignError::unverified("sha256sum verification failed!"));
    }
    Ok(Reconciliation {
        verified: vec!["Verified: all signed file digests match".to_string()],
        ..Default::default()
    })
}

/// Digests `files` with the content hasher; its manifest output becomes the body.
pub async fn prepare_file(hasher: &dyn ContentHasher, files: &[String]) -> SignResult<Vec<u8>> {
    if files.is_empty() {
        return Err(SignError::format("No files given to sign"));
    }
    Ok(hasher.digest(files).await?)
}
