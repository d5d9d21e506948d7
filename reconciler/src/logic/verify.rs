use chrono::Utc;
use log::{debug, info};
use stakesign_defs::{
    AliasPolicy, ChainOracle, ContentHasher, ExpiryInfo, ImageIndex, Reconciliation,
    RepositoryIndex, SignError, SignMode, SignResult, Signature, StakeCheck, VerificationReport,
};
use stakesign_utils::eth_to_wei;

use super::codec::decode_manifest;
use super::docker::verify_docker;
use super::envelope::{
    check_expire, check_stake, default_floor_reminder, ensure_stake, ensure_unexpired,
};
use super::file::verify_file;
use super::git::verify_git;
use super::signature::fetch_signature;

/// What the operator asked to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyTarget {
    /// Whatever the signature's header says.
    Auto,
    File,
    /// `None` verifies `HEAD`.
    Git { revision: Option<String> },
    /// `None` verifies every signed image present locally.
    Docker { handle: Option<String> },
}

impl VerifyTarget {
    fn mode(&self) -> Option<SignMode> {
        match self {
            VerifyTarget::Auto => None,
            VerifyTarget::File => Some(SignMode::File),
            VerifyTarget::Git { .. } => Some(SignMode::Git),
            VerifyTarget::Docker { .. } => Some(SignMode::Docker),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub transaction_id: String,
    pub target: VerifyTarget,
    pub stake_floor_eth: f64,
    pub ignore_ad: bool,
    pub ignore_missing: bool,
    pub expired_ok: bool,
}

/// Collaborators a verification run consults.
pub struct VerifyContext<'a> {
    pub oracle: &'a dyn ChainOracle,
    pub repo: &'a dyn RepositoryIndex,
    pub images: &'a dyn ImageIndex,
    pub hasher: &'a dyn ContentHasher,
    pub alias_policy: &'a AliasPolicy,
}

/// Facts established along the way, reported even if a later step fails.
#[derive(Debug)]
pub enum VerifyEvent<'a> {
    Signature(&'a Signature),
    Expiry(&'a ExpiryInfo),
    Stake(&'a StakeCheck),
    Hasher(String),
}

/// One handler per signing mode, chosen once per run.
pub enum Reconciler<'a> {
    File {
        hasher: &'a dyn ContentHasher,
    },
    Git {
        repo: &'a dyn RepositoryIndex,
        revision: String,
    },
    Docker {
        images: &'a dyn ImageIndex,
        handle: Option<String>,
        policy: &'a AliasPolicy,
    },
}

impl<'a> Reconciler<'a> {
    pub fn select(
        mode: SignMode,
        target: &VerifyTarget,
        ctx: &VerifyContext<'a>,
    ) -> SignResult<Self> {
        if let Some(requested) = target.mode() {
            if requested != mode {
                return Err(SignError::format(format!(
                    "Signature is for {} mode, but {} verification was requested",
                    mode, requested
                )));
            }
        }
        Ok(match mode {
            SignMode::File => Reconciler::File { hasher: ctx.hasher },
            SignMode::Git => Reconciler::Git {
                repo: ctx.repo,
                revision: match target {
                    VerifyTarget::Git {
                        revision: Some(revision),
                    } => revision.clone(),
                    _ => "HEAD".to_string(),
                },
            },
            SignMode::Docker => Reconciler::Docker {
                images: ctx.images,
                handle: match target {
                    VerifyTarget::Docker { handle } => handle.clone(),
                    _ => None,
                },
                policy: ctx.alias_policy,
            },
        })
    }

    pub async fn reconcile(&self, body: &[u8], ignore_missing: bool) -> SignResult<Reconciliation> {
        match self {
            Reconciler::File { hasher } => verify_file(*hasher, body, ignore_missing).await,
            Reconciler::Git { repo, revision } => {
                verify_git(*repo, revision, body, ignore_missing).await
            }
            Reconciler::Docker {
                images,
                handle,
                policy,
            } => verify_docker(*images, body, handle.as_deref(), ignore_missing, policy).await,
        }
    }
}

/// Runs a complete verification: signature lookup, envelope checks, then
/// reconciliation of the manifest against local state. Stops at the first
/// fatal error.
pub async fn verify_signature(
    ctx: &VerifyContext<'_>,
    request: &VerifyRequest,
    observer: &mut dyn FnMut(VerifyEvent<'_>),
) -> SignResult<VerificationReport> {
    let floor_wei = eth_to_wei(request.stake_floor_eth)
        .map_err(|_| SignError::format("--stake must be a finite, non-negative ETH amount"))?;

    let signature = fetch_signature(ctx.oracle, &request.transaction_id).await?;
    observer(VerifyEvent::Signature(&signature));

    let (header, body) = decode_manifest(&signature.payload)?;

    let expiry = check_expire(&header, Utc::now())?;
    observer(VerifyEvent::Expiry(&expiry));
    ensure_unexpired(&expiry, request.expired_ok)?;

    let signer_wei = ctx.oracle.get_balance(&signature.signer).await?;
    let (stake, mut warnings) = check_stake(&header, signer_wei, floor_wei, request.ignore_ad)?;
    observer(VerifyEvent::Stake(&stake));
    ensure_stake(&stake)?;

    let mode = header.mode()?;
    let reconciler = Reconciler::select(mode, &request.target, ctx)?;
    if let Reconciler::File { hasher } = &reconciler {
        observer(VerifyEvent::Hasher(hasher.describe()));
    }
    debug!("Reconciling {} signature {}", mode, signature.id);
    let reconciliation = reconciler.reconcile(body, request.ignore_missing).await?;
    warnings.merge(reconciliation.warnings);

    if let Some(reminder) = default_floor_reminder(request.stake_floor_eth, signer_wei) {
        warnings.add(reminder);
    }
    info!(
        "Signature {} verified with {} warning(s)",
        signature.id,
        warnings.len()
    );

    Ok(VerificationReport {
        mode,
        expiry,
        stake,
        verified: reconciliation.verified,
        warnings,
        signature,
    })
}
