use log::{debug, info};
use stakesign_defs::{
    AliasPolicy, DockerEntry, ImageIndex, LocalImage, Reconciliation, SignError, SignResult,
    Warnings,
};
use std::collections::BTreeSet;

use super::codec::parse_entries;
use super::index::ImageHandleIndex;

/// Rejects entries whose signed tags or digests now name a different local image.
fn check_aliases(
    index: &ImageHandleIndex,
    entry: &DockerEntry,
    policy: &AliasPolicy,
    warnings: &mut Warnings,
) -> SignResult<()> {
    for name in entry.signed_names() {
        let ids = match index.ids_for(name) {
            Some(ids) => ids,
            None => continue,
        };
        if ids.len() > 1 {
            return Err(SignError::conflict(format!(
                "The local image tag '{}' is ambiguous",
                name
            )));
        }
        if ids.contains(&entry.image_id) {
            continue;
        }
        if policy.is_mutable(name) {
            warnings.add(format!(
                "The local default image tag '{}' refers to a different image ID than was signed; be sure to use the full ID or digest to get the correct image.",
                name
            ));
        } else {
            return Err(SignError::conflict(format!(
                "The local image tag '{}' refers to a different image ID than was signed",
                name
            )));
        }
    }
    Ok(())
}

fn verified_line(image: &LocalImage, entry: &DockerEntry, warnings: &mut Warnings) -> String {
    let signed: BTreeSet<&String> = entry.signed_names().collect();
    let local: BTreeSet<&String> = image.names().collect();
    let common: Vec<&str> = signed.intersection(&local).map(|s| s.as_str()).collect();

    if !common.is_empty() {
        format!("Verified image ID = {}, aka: {}", image.id, common.join(" "))
    } else {
        if !signed.is_empty() && !local.is_empty() {
            warnings.add(format!(
                "Image ID = {} was signed, but under different tag(s) than it's known by locally; double-check it's the intended image if selecting by tag.",
                image.id
            ));
        }
        format!("Verified image ID = {}", image.id)
    }
}

/// Verifies signed images against the local image store: the one named by
/// `handle`, or every signed image when no handle is given.
pub async fn verify_docker(
    images: &dyn ImageIndex,
    body: &[u8],
    handle: Option<&str>,
    ignore_missing: bool,
    policy: &AliasPolicy,
) -> SignResult<Reconciliation> {
    let entries: Vec<DockerEntry> = parse_entries(body)?;
    let index = ImageHandleIndex::load(images).await?;
    let target = match handle {
        Some(handle) => Some(index.resolve_handle(handle)?),
        None => None,
    };

    let mut result = Reconciliation::default();
    for entry in &entries {
        check_aliases(&index, entry, policy, &mut result.warnings)?;

        let image = match target {
            Some(target) => {
                if target.id != entry.image_id {
                    continue;
                }
                target
            }
            None => match index.image(&entry.image_id) {
                Some(image) => image,
                None if ignore_missing => {
                    result
                        .warnings
                        .add("The transaction signs one or more images that are missing locally");
                    continue;
                }
                None => {
                    let hint = if entries.len() > 1 {
                        "; try --ignore-missing if OK for some but not all to be missing"
                    } else {
                        ""
                    };
                    return Err(SignError::resolution(format!(
                        "Signed image missing locally{}",
                        hint
                    )));
                }
            },
        };

        let line = verified_line(image, entry, &mut result.warnings);
        info!("{}", line);
        result.verified.push(line);
    }

    if result.verified.is_empty() {
        return Err(SignError::unverified("No image verified"));
    }
    debug!("{} signed image(s) verified", result.verified.len());
    Ok(result)
}

/// Resolves each handle to the entry a publisher signs.
pub async fn prepare_docker(
    images: &dyn ImageIndex,
    handles: &[String],
) -> SignResult<Vec<DockerEntry>> {
    let index = ImageHandleIndex::load(images).await?;
    handles
        .iter()
        .map(|handle| {
            let image = index.resolve_handle(handle)?;
            Ok(DockerEntry {
                image_id: image.id.clone(),
                aka_repo_tags: image.repo_tags.clone(),
                aka_repo_digests: image.repo_digests.clone(),
            })
        })
        .collect()
}
