use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChainTransaction {
    pub from: String,
    pub block_number: u64,
    /// `0x`-prefixed hex transaction input.
    pub input: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChainBlock {
    pub number: u64,
    /// Seconds since the unix epoch.
    pub timestamp: i64,
}

/// A signature transaction as recovered from the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub id: String,
    pub signer: String,
    pub block: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: Vec<u8>,
}
