use async_trait::async_trait;

use crate::{ChainBlock, ChainTransaction, LocalImage, Resolution};

/// Read access to the blockchain holding signature transactions.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    /// `Ok(None)` when the transaction or its receipt is unknown, or it is still pending.
    async fn get_transaction(&self, id: &str) -> Result<Option<ChainTransaction>, anyhow::Error>;
    async fn get_block(&self, number: u64) -> Result<Option<ChainBlock>, anyhow::Error>;
    /// Current balance in wei.
    async fn get_balance(&self, address: &str) -> Result<u128, anyhow::Error>;
}

/// The consumer's local git repository.
#[async_trait]
pub trait RepositoryIndex: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Resolution, anyhow::Error>;
    async fn head(&self) -> Result<String, anyhow::Error>;
    /// Uncommitted modifications, ignoring ignored paths.
    async fn is_dirty(&self) -> Result<bool, anyhow::Error>;
}

/// The consumer's local docker image store.
#[async_trait]
pub trait ImageIndex: Send + Sync {
    async fn list_images(&self) -> Result<Vec<LocalImage>, anyhow::Error>;
}

/// External content-hashing utility (sha256sum-compatible).
#[async_trait]
pub trait ContentHasher: Send + Sync {
    fn describe(&self) -> String;
    /// Runs the utility's manifest check; `Ok(true)` when every listed digest matched.
    async fn check(&self, manifest: &[u8], ignore_missing: bool) -> Result<bool, anyhow::Error>;
    /// Digests `files`, relaying progress as it runs, and returns the produced manifest.
    async fn digest(&self, files: &[String]) -> Result<Vec<u8>, anyhow::Error>;
}
