#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use stakesign_defs::{
    ContentHasher, GitObject, GitReference, ImageIndex, LocalImage, RepositoryIndex, Resolution,
    ResolvedRevision,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn hex64(c: char) -> String {
    c.to_string().repeat(64)
}

pub fn hex40(c: char) -> String {
    c.to_string().repeat(40)
}

pub fn image_id(c: char) -> String {
    format!("sha256:{}", hex64(c))
}

/// Newline-terminated JSON lines.
pub fn body(entries: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}

/// In-memory repository: every name maps to a fixed resolution.
#[derive(Default)]
pub struct FakeRepo {
    names: HashMap<String, Resolution>,
    head: String,
    dirty: bool,
}

impl FakeRepo {
    /// Repository whose HEAD is checked out at `commit`, with a clean tree.
    pub fn at(commit: &str) -> Self {
        FakeRepo::default()
            .commit(commit)
            .with_ref("HEAD", GitObject::Commit { id: commit.to_string() }, Some("refs/heads/main"))
            .with_ref("main", GitObject::Commit { id: commit.to_string() }, Some("refs/heads/main"))
            .head(commit)
    }

    pub fn head(mut self, commit: &str) -> Self {
        self.head = commit.to_string();
        self
    }

    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn commit(self, id: &str) -> Self {
        self.with_ref(id, GitObject::Commit { id: id.to_string() }, None)
    }

    pub fn lightweight_tag(self, name: &str, commit: &str) -> Self {
        let reference = format!("refs/tags/{}", name);
        self.commit(commit).with_ref(
            name,
            GitObject::Commit { id: commit.to_string() },
            Some(&reference),
        )
    }

    pub fn annotated_tag(self, name: &str, id: &str, commit: &str) -> Self {
        let reference = format!("refs/tags/{}", name);
        self.commit(commit).with_ref(
            name,
            GitObject::Tag {
                id: id.to_string(),
                name: name.to_string(),
                target: commit.to_string(),
            },
            Some(&reference),
        )
    }

    pub fn branch(self, name: &str, commit: &str) -> Self {
        let reference = format!("refs/heads/{}", name);
        self.commit(commit).with_ref(
            name,
            GitObject::Commit { id: commit.to_string() },
            Some(&reference),
        )
    }

    /// Tag `name` pointing at a non-commit object such as a tree or blob.
    pub fn tag_to_object(self, name: &str, kind: &str, id: &str) -> Self {
        let reference = format!("refs/tags/{}", name);
        self.with_ref(
            name,
            GitObject::Other {
                id: id.to_string(),
                kind: kind.to_string(),
            },
            Some(&reference),
        )
    }

    pub fn ambiguous(mut self, name: &str) -> Self {
        self.names.insert(name.to_string(), Resolution::Ambiguous);
        self
    }

    fn with_ref(mut self, name: &str, object: GitObject, reference: Option<&str>) -> Self {
        self.names.insert(
            name.to_string(),
            Resolution::Resolved(ResolvedRevision {
                object,
                reference: reference.map(GitReference::new),
            }),
        );
        self
    }
}

#[async_trait]
impl RepositoryIndex for FakeRepo {
    async fn resolve(&self, name: &str) -> Result<Resolution, anyhow::Error> {
        Ok(self
            .names
            .get(name)
            .cloned()
            .unwrap_or(Resolution::Unresolved))
    }

    async fn head(&self) -> Result<String, anyhow::Error> {
        Ok(self.head.clone())
    }

    async fn is_dirty(&self) -> Result<bool, anyhow::Error> {
        Ok(self.dirty)
    }
}

pub fn image(c: char, tags: &[&str], digests: &[&str]) -> LocalImage {
    let id = image_id(c);
    LocalImage {
        short_id: id[..19].to_string(),
        id,
        repo_tags: tags.iter().map(|t| t.to_string()).collect(),
        repo_digests: digests.iter().map(|d| d.to_string()).collect(),
    }
}

pub struct FakeImages(pub Vec<LocalImage>);

#[async_trait]
impl ImageIndex for FakeImages {
    async fn list_images(&self) -> Result<Vec<LocalImage>, anyhow::Error> {
        Ok(self.0.clone())
    }
}

/// Content hasher that accepts or rejects every manifest and remembers what it saw.
pub struct FakeHasher {
    pub accept: bool,
    pub checked: Mutex<Vec<(Vec<u8>, bool)>>,
}

impl FakeHasher {
    pub fn new(accept: bool) -> Self {
        FakeHasher {
            accept,
            checked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContentHasher for FakeHasher {
    fn describe(&self) -> String {
        "fake-sha256sum".to_string()
    }

    async fn check(&self, manifest: &[u8], ignore_missing: bool) -> Result<bool, anyhow::Error> {
        self.checked
            .lock()
            .unwrap()
            .push((manifest.to_vec(), ignore_missing));
        Ok(self.accept)
    }

    async fn digest(&self, files: &[String]) -> Result<Vec<u8>, anyhow::Error> {
        Ok(files
            .iter()
            .map(|f| format!("{}  {}\n", hex64('f'), f))
            .collect::<String>()
            .into_bytes())
    }
}
