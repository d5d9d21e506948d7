use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use std::fmt;

use crate::{Signature, SignMode};

/// Insertion-ordered, de-duplicated warning messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(IndexSet<String>);

impl Warnings {
    pub fn new() -> Self {
        Warnings(IndexSet::new())
    }

    pub fn add(&mut self, msg: impl Into<String>) {
        self.0.insert(msg.into());
    }

    pub fn merge(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, msg: &str) -> bool {
        self.0.contains(msg)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryInfo {
    pub expire_utc: Option<DateTime<Utc>>,
    pub now_utc: DateTime<Utc>,
}

impl ExpiryInfo {
    pub fn is_unexpired(&self) -> bool {
        match self.expire_utc {
            Some(expire) => expire > self.now_utc,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeSource {
    /// Operator-supplied floor.
    Floor,
    /// The header's advisory `stakeAd`.
    Advertised,
}

impl fmt::Display for StakeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeSource::Floor => f.write_str("--stake"),
            StakeSource::Advertised => f.write_str("stakeAd"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeCheck {
    pub signer_wei: u128,
    pub required_wei: u128,
    pub source: StakeSource,
}

impl StakeCheck {
    pub fn is_enough(&self) -> bool {
        self.signer_wei >= self.required_wei
    }
}

/// Outcome of matching manifest entries against local state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub verified: Vec<String>,
    pub warnings: Warnings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub signature: Signature,
    pub mode: SignMode,
    pub expiry: ExpiryInfo,
    pub stake: StakeCheck,
    pub verified: Vec<String>,
    pub warnings: Warnings,
}
