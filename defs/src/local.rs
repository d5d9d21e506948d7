use serde::{Deserialize, Serialize};

/// Namespace under which git keeps tags.
pub const TAG_NAMESPACE: &str = "refs/tags/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Commit {
        id: String,
    },
    /// Annotated tag object; `target` is the commit it peels to.
    Tag {
        id: String,
        name: String,
        target: String,
    },
    /// Anything that doesn't lead to a commit: a tree, a blob, or a tag of one.
    Other {
        id: String,
        kind: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitReference {
    /// Full name, e.g. `refs/tags/v1.0`.
    pub name: String,
}

impl GitReference {
    pub fn new(name: impl Into<String>) -> Self {
        GitReference { name: name.into() }
    }

    pub fn is_tag(&self) -> bool {
        self.name.starts_with(TAG_NAMESPACE)
    }

    pub fn shorthand(&self) -> &str {
        ["refs/tags/", "refs/heads/", "refs/remotes/", "refs/"]
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRevision {
    pub object: GitObject,
    /// Present when the name went through a reference rather than a raw id.
    pub reference: Option<GitReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedRevision),
    /// The name matches more than one local reference.
    Ambiguous,
    Unresolved,
}

/// A locally present docker image as enumerated by the image index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub id: String,
    pub short_id: String,
    pub repo_tags: Vec<String>,
    pub repo_digests: Vec<String>,
}

impl LocalImage {
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.repo_tags.iter().chain(self.repo_digests.iter())
    }
}
