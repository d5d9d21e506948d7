mod chain;
mod config;
mod errors;
mod local;
mod manifest;
mod provider;
mod report;

pub use chain::{ChainBlock, ChainTransaction, Signature};
pub use config::{AliasPolicy, Config, GatewaySource, DEFAULT_GATEWAY, DEFAULT_STAKE_FLOOR_ETH};
pub use errors::{SignError, SignResult};
pub use local::{GitObject, GitReference, LocalImage, Resolution, ResolvedRevision, TAG_NAMESPACE};
pub use manifest::{DockerEntry, GitEntry, Header, HeaderSpec, SignMode, PROTOCOL_TAG};
pub use provider::{ChainOracle, ContentHasher, ImageIndex, RepositoryIndex};
pub use report::{
    ExpiryInfo, Reconciliation, StakeCheck, StakeSource, VerificationReport, Warnings,
};
