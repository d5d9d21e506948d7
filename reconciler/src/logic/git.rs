use log::{debug, info};
use stakesign_defs::{
    GitEntry, GitObject, Reconciliation, RepositoryIndex, Resolution, SignError, SignResult,
    Warnings,
};

use super::codec::parse_entries;
use super::index::{classify_tag, LocalTag};

const SHA256_HEX_LEN: usize = 64;

pub const VERIFY_SHA1_WARNING: &str = "Signature pertains to git SHA-1 digest(s); review git SHA-1 security risks and consider adopting git SHA-256 mode";
pub const PREPARE_SHA1_WARNING: &str = "Preparing signature for git SHA-1 digest; review git SHA-1 security risks and consider adopting git SHA-256 mode";

fn is_legacy_digest(id: &str) -> bool {
    id.len() != SHA256_HEX_LEN
}

/// Resolves a user-supplied revision to the commit it stands for, refusing
/// anything that isn't exactly one commit or annotated tag.
async fn resolve_revision(repo: &dyn RepositoryIndex, revision: &str) -> SignResult<String> {
    match repo.resolve(revision).await? {
        Resolution::Resolved(resolved) => match resolved.object {
            GitObject::Commit { id } => Ok(id),
            GitObject::Tag { target, .. } => Ok(target),
            GitObject::Other { kind, .. } => Err(SignError::resolution(format!(
                "Revision {} is a {}, not a commit",
                revision, kind
            ))),
        },
        Resolution::Ambiguous => Err(SignError::conflict(format!(
            "Ambiguous revision: {}",
            revision
        ))),
        Resolution::Unresolved => Err(SignError::resolution(format!(
            "Failed to `git rev-parse {}`",
            revision
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Specificity {
    Commit,
    Tag,
}

/// Keeps the single success line reported for the revision: the first
/// tag-qualified line beats any commit-only line, otherwise the first wins.
#[derive(Debug, Default)]
struct VerifiedLine(Option<(Specificity, String)>);

impl VerifiedLine {
    fn offer(&mut self, specificity: Specificity, line: String) {
        match &self.0 {
            Some((held, _)) if *held >= specificity => {}
            _ => self.0 = Some((specificity, line)),
        }
    }

    fn into_line(self) -> Option<String> {
        self.0.map(|(_, line)| line)
    }
}

/// Checks a signed tag claim against the local tag of the same name.
///
/// Returns the local shorthand when the tag verified through a local ref, and
/// records any hashes involved in `hashes` for the digest strength check.
async fn reconcile_tag(
    repo: &dyn RepositoryIndex,
    entry: &GitEntry,
    tag: &str,
    ignore_missing: bool,
    warnings: &mut Warnings,
    hashes: &mut Vec<String>,
) -> SignResult<Option<String>> {
    // Never hand git a name it could read as an option.
    let resolution = if tag.starts_with('-') {
        Resolution::Unresolved
    } else {
        repo.resolve(tag).await?
    };

    match classify_tag(resolution) {
        LocalTag::Missing => {
            if !ignore_missing {
                return Err(SignError::resolution(
                    "Signed tag(s) missing from local repository; try --ignore-missing if this is OK",
                ));
            }
            warnings.add("One or more signed tag(s) missing from local repository");
            Ok(None)
        }
        LocalTag::Ambiguous => Err(SignError::conflict(
            "A signed tag name is ambiguous in the local repository",
        )),
        LocalTag::Elsewhere { reference } => {
            let local = match reference {
                Some(name) => name,
                None => "a non-tag revision".to_string(),
            };
            Err(SignError::conflict(format!(
                "The signed tag refers locally to something else: {}",
                local
            )))
        }
        LocalTag::Lightweight { shorthand, commit } => {
            if commit != entry.commit {
                return Err(SignError::conflict(format!(
                    "The local tag '{}' refers to a different commit than the signed tag",
                    shorthand
                )));
            }
            if entry.tag_object.is_some() {
                warnings.add(format!(
                    "The local tag '{}' is lightweight, while the signed tag was annotated",
                    shorthand
                ));
            }
            hashes.push(commit);
            Ok(Some(shorthand))
        }
        LocalTag::Annotated {
            id,
            name,
            target,
            shorthand,
        } => {
            match &entry.tag_object {
                Some(signed_object) => {
                    if *signed_object != id {
                        return Err(SignError::conflict(format!(
                            "The local tag '{}' = {} differs from the signed tag in annotations (although they share the same name and commit reference)",
                            name, id
                        )));
                    }
                    if target != entry.commit {
                        return Err(SignError::conflict(format!(
                            "The local annotated tag '{}' = {} refers to a different commit than the signed tag",
                            name, id
                        )));
                    }
                }
                None => {
                    if target != entry.commit {
                        return Err(SignError::conflict(format!(
                            "The local annotated tag '{}' = {} refers to a different commit than the signed tag",
                            name, id
                        )));
                    }
                    warnings.add(format!(
                        "The local tag '{}' is annotated, while the signed tag was lightweight",
                        shorthand.as_deref().unwrap_or(&name)
                    ));
                }
            }
            hashes.push(id);
            Ok(shorthand)
        }
    }
}

/// Verifies that the manifest body signs `revision` as resolved in `repo`.
pub async fn verify_git(
    repo: &dyn RepositoryIndex,
    revision: &str,
    body: &[u8],
    ignore_missing: bool,
) -> SignResult<Reconciliation> {
    let entries: Vec<GitEntry> = parse_entries(body)?;
    let commit = resolve_revision(repo, revision).await?;
    debug!("Revision {} resolves to commit {}", revision, commit);

    let mut warnings = Warnings::new();
    let head = repo.head().await?;
    if head != commit {
        warnings.add(format!(
            "Verified revision {} = {} is not the working tree HEAD = {}",
            revision, commit, head
        ));
    } else if repo.is_dirty().await? {
        warnings.add(format!(
            "Working tree is dirty; signature applies to clean commit HEAD = {}",
            head
        ));
    }

    let mut hashes = vec![commit.clone()];
    let mut verified = VerifiedLine::default();

    for entry in &entries {
        hashes.push(entry.commit.clone());
        hashes.extend(entry.tag_object.iter().cloned());

        if entry.commit != commit {
            continue;
        }

        let tag_shorthand = match &entry.tag {
            Some(tag) => {
                reconcile_tag(repo, entry, tag, ignore_missing, &mut warnings, &mut hashes).await?
            }
            None => None,
        };

        match tag_shorthand {
            Some(shorthand) => verified.offer(
                Specificity::Tag,
                format!(
                    "Verified: local revision {} = signed tag {} (commit {})",
                    revision, shorthand, commit
                ),
            ),
            None => verified.offer(
                Specificity::Commit,
                format!(
                    "Verified: local revision {} = signed commit {}",
                    revision, commit
                ),
            ),
        }
    }

    let line = verified.into_line().ok_or_else(|| {
        SignError::unverified(format!(
            "Signature doesn't apply to {} ({})",
            revision, commit
        ))
    })?;
    if hashes.iter().any(|h| is_legacy_digest(h)) {
        warnings.add(VERIFY_SHA1_WARNING);
    }
    info!("{}", line);

    Ok(Reconciliation {
        verified: vec![line],
        warnings,
    })
}

/// Resolves each revision to the entry a publisher signs.
pub async fn prepare_git(
    repo: &dyn RepositoryIndex,
    revisions: &[String],
) -> SignResult<(Vec<GitEntry>, Warnings)> {
    let mut entries = Vec::with_capacity(revisions.len());
    let mut legacy = false;

    for revision in revisions {
        let resolved = match repo.resolve(revision).await? {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Ambiguous => {
                return Err(SignError::conflict(format!(
                    "Ambiguous revision: {}",
                    revision
                )))
            }
            Resolution::Unresolved => {
                return Err(SignError::resolution(format!(
                    "Failed to `git rev-parse {}`",
                    revision
                )))
            }
        };
        let entry = match resolved.object {
            GitObject::Other { kind, .. } => {
                return Err(SignError::resolution(format!(
                    "Revision {} is a {}, not a commit",
                    revision, kind
                )))
            }
            GitObject::Commit { id } => {
                legacy |= is_legacy_digest(&id);
                GitEntry {
                    commit: id,
                    tag: resolved
                        .reference
                        .filter(|r| r.is_tag())
                        .map(|r| r.shorthand().to_string()),
                    tag_object: None,
                }
            }
            GitObject::Tag { id, name, target } => {
                legacy |= is_legacy_digest(&id) || is_legacy_digest(&target);
                GitEntry {
                    commit: target,
                    tag: Some(name),
                    tag_object: Some(id),
                }
            }
        };
        entries.push(entry);
    }

    let mut warnings = Warnings::new();
    let head = repo.head().await?;
    if !entries.iter().any(|e| e.commit == head) {
        warnings.add(format!(
            "The revisions to sign don't include the current working tree HEAD = {}",
            head
        ));
    } else if repo.is_dirty().await? {
        warnings.add(format!(
            "Working tree is dirty; signature will apply to clean commit HEAD = {}",
            head
        ));
    }
    if legacy {
        warnings.add(PREPARE_SHA1_WARNING);
    }
    Ok((entries, warnings))
}
