use log::debug;
use stakesign_defs::{
    GitObject, ImageIndex, LocalImage, Resolution, ResolvedRevision, SignError, SignResult,
};
use std::collections::{BTreeSet, HashMap};

const SHORT_ID_LEN: usize = 12;

/// Every name a local image can be addressed by (full ID, short IDs, repo
/// tags, repo digests) mapped to the set of image IDs currently answering to it.
///
/// Built fresh for each run; local state may change between runs.
#[derive(Debug, Default)]
pub struct ImageHandleIndex {
    names: HashMap<String, BTreeSet<String>>,
    images: HashMap<String, LocalImage>,
}

impl ImageHandleIndex {
    pub fn build(images: Vec<LocalImage>) -> Self {
        let mut index = ImageHandleIndex::default();
        for image in images {
            let id = image.id.clone();
            let mut aliases = vec![id.clone(), image.short_id.clone()];
            match id.strip_prefix("sha256:") {
                Some(hex) => {
                    if let Some(short) = hex.get(..SHORT_ID_LEN) {
                        aliases.push(short.to_string());
                        aliases.push(format!("sha256:{}", short));
                    }
                }
                None => {
                    if let Some(short) = id.get(..SHORT_ID_LEN) {
                        aliases.push(short.to_string());
                    }
                }
            }
            aliases.extend(image.names().cloned());

            for alias in aliases.into_iter().filter(|a| !a.is_empty()) {
                index.names.entry(alias).or_default().insert(id.clone());
            }
            index.images.insert(id, image);
        }
        debug!(
            "Indexed {} local images under {} names",
            index.images.len(),
            index.names.len()
        );
        index
    }

    pub async fn load(provider: &dyn ImageIndex) -> SignResult<Self> {
        let images = provider.list_images().await?;
        Ok(Self::build(images))
    }

    /// Image IDs currently answering to `name`; empty when unknown.
    pub fn ids_for(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.names.get(name).filter(|ids| !ids.is_empty())
    }

    /// Exact lookup by full image ID.
    pub fn image(&self, id: &str) -> Option<&LocalImage> {
        self.images.get(id)
    }

    /// Resolves a user-supplied handle, trying it verbatim, then with `:latest`,
    /// then with a `sha256:` prefix. The first form known locally wins and must
    /// name exactly one image.
    pub fn resolve_handle(&self, handle: &str) -> SignResult<&LocalImage> {
        let candidates = [
            handle.to_string(),
            format!("{}:latest", handle),
            format!("sha256:{}", handle),
        ];
        let ids = candidates
            .iter()
            .find_map(|candidate| self.ids_for(candidate))
            .ok_or_else(|| SignError::resolution(format!("No such local image: {}", handle)))?;
        if ids.len() > 1 {
            return Err(SignError::conflict(format!("Ambiguous image: {}", handle)));
        }
        ids.iter()
            .next()
            .and_then(|id| self.images.get(id))
            .ok_or_else(|| SignError::resolution(format!("No such local image: {}", handle)))
    }
}

/// What a signed tag name currently means in the local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTag {
    Missing,
    Ambiguous,
    /// Exists locally but isn't a tag of a commit: a branch, a raw id, or a
    /// reference to a tree or blob.
    Elsewhere { reference: Option<String> },
    Lightweight {
        shorthand: String,
        commit: String,
    },
    Annotated {
        id: String,
        name: String,
        target: String,
        shorthand: Option<String>,
    },
}

pub fn classify_tag(resolution: Resolution) -> LocalTag {
    match resolution {
        Resolution::Unresolved => LocalTag::Missing,
        Resolution::Ambiguous => LocalTag::Ambiguous,
        Resolution::Resolved(ResolvedRevision { object, reference }) => match object {
            GitObject::Commit { id } => match reference {
                Some(reference) if reference.is_tag() => LocalTag::Lightweight {
                    shorthand: reference.shorthand().to_string(),
                    commit: id,
                },
                other => LocalTag::Elsewhere {
                    reference: other.map(|r| r.name),
                },
            },
            GitObject::Tag { id, name, target } => LocalTag::Annotated {
                id,
                name,
                target,
                shorthand: reference.map(|r| r.shorthand().to_string()),
            },
            GitObject::Other { id, kind } => LocalTag::Elsewhere {
                reference: Some(match reference {
                    Some(reference) => format!("{} ({} {})", reference.name, kind, id),
                    None => format!("{} {}", kind, id),
                }),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stakesign_defs::GitReference;

    fn image(hex: char, tags: &[&str], digests: &[&str]) -> LocalImage {
        let id = format!("sha256:{}", hex.to_string().repeat(64));
        LocalImage {
            short_id: id[..19].to_string(),
            id,
            repo_tags: tags.iter().map(|t| t.to_string()).collect(),
            repo_digests: digests.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_index_covers_every_alias() {
        let index = ImageHandleIndex::build(vec![image('a', &["app:v1"], &["app@sha256:ff"])]);
        let id = format!("sha256:{}", "a".repeat(64));
        for name in [
            id.as_str(),
            "aaaaaaaaaaaa",
            "sha256:aaaaaaaaaaaa",
            "app:v1",
            "app@sha256:ff",
        ] {
            assert_eq!(
                index.ids_for(name).map(|ids| ids.len()),
                Some(1),
                "missing alias {}",
                name
            );
        }
        assert!(index.ids_for("app:v2").is_none());
        assert!(index.image(&id).is_some());
        assert!(index.image("app:v1").is_none());
    }

    #[test]
    fn test_resolve_handle_order() {
        let index = ImageHandleIndex::build(vec![
            image('a', &["app:latest"], &[]),
            image('b', &["app:v1"], &[]),
        ]);
        assert_eq!(
            index.resolve_handle("app").unwrap().id,
            format!("sha256:{}", "a".repeat(64))
        );
        assert_eq!(
            index.resolve_handle("app:v1").unwrap().id,
            format!("sha256:{}", "b".repeat(64))
        );
        assert_eq!(
            index.resolve_handle(&"b".repeat(64)).unwrap().id,
            format!("sha256:{}", "b".repeat(64))
        );
        assert!(matches!(
            index.resolve_handle("nope"),
            Err(SignError::Resolution(_))
        ));
    }

    #[test]
    fn test_resolve_handle_ambiguous() {
        let index = ImageHandleIndex::build(vec![
            image('a', &["app:v1"], &[]),
            image('b', &["app:v1"], &[]),
        ]);
        assert!(matches!(
            index.resolve_handle("app:v1"),
            Err(SignError::Conflict(_))
        ));
    }

    #[test]
    fn test_classify_tag() {
        let commit = "c".repeat(40);
        let lightweight = classify_tag(Resolution::Resolved(ResolvedRevision {
            object: GitObject::Commit { id: commit.clone() },
            reference: Some(GitReference::new("refs/tags/v1")),
        }));
        assert_eq!(
            lightweight,
            LocalTag::Lightweight {
                shorthand: "v1".to_string(),
                commit: commit.clone()
            }
        );

        let branch = classify_tag(Resolution::Resolved(ResolvedRevision {
            object: GitObject::Commit { id: commit.clone() },
            reference: Some(GitReference::new("refs/heads/v1")),
        }));
        assert_eq!(
            branch,
            LocalTag::Elsewhere {
                reference: Some("refs/heads/v1".to_string())
            }
        );

        let annotated = classify_tag(Resolution::Resolved(ResolvedRevision {
            object: GitObject::Tag {
                id: "t".repeat(40),
                name: "v1".to_string(),
                target: commit.clone(),
            },
            reference: Some(GitReference::new("refs/tags/v1")),
        }));
        assert!(matches!(annotated, LocalTag::Annotated { shorthand: Some(ref s), .. } if s == "v1"));

        let blob = classify_tag(Resolution::Resolved(ResolvedRevision {
            object: GitObject::Other {
                id: "b".repeat(40),
                kind: "blob".to_string(),
            },
            reference: Some(GitReference::new("refs/tags/v1")),
        }));
        assert_eq!(
            blob,
            LocalTag::Elsewhere {
                reference: Some(format!("refs/tags/v1 (blob {})", "b".repeat(40)))
            }
        );

        assert_eq!(classify_tag(Resolution::Unresolved), LocalTag::Missing);
        assert_eq!(classify_tag(Resolution::Ambiguous), LocalTag::Ambiguous);
    }
}
