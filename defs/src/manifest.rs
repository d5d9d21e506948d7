use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{SignError, SignResult};

/// Header field carrying the signing mode; also identifies the payload format.
pub const PROTOCOL_TAG: &str = "stakesign";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignMode {
    #[serde(alias = "sha256sum")]
    File,
    Git,
    Docker,
}

impl SignMode {
    pub fn from_tag(tag: &str) -> Option<SignMode> {
        match tag {
            "file" | "sha256sum" => Some(SignMode::File),
            "git" => Some(SignMode::Git),
            "docker" => Some(SignMode::Docker),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignMode::File => "file",
            SignMode::Git => "git",
            SignMode::Docker => "docker",
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded manifest header.
///
/// Only the presence of a string `stakesign` field is guaranteed; every other
/// field is validated lazily by whichever component consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    fields: Map<String, Value>,
}

impl Header {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Header { fields }
    }

    pub fn mode(&self) -> SignResult<SignMode> {
        self.fields
            .get(PROTOCOL_TAG)
            .and_then(Value::as_str)
            .and_then(SignMode::from_tag)
            .ok_or_else(|| {
                SignError::format(
                    "Signing mode not one of {file, git, docker}. A newer version of this utility might support the necessary mode.",
                )
            })
    }

    pub fn expire(&self) -> Option<&Value> {
        self.fields.get("expire")
    }

    pub fn stake_ad(&self) -> Option<&Value> {
        self.fields.get("stakeAd")
    }
}

/// Header content chosen by a publisher when preparing a signature.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSpec {
    pub mode: SignMode,
    pub expire: Option<DateTime<Utc>>,
    pub stake_ad_eth: Option<f64>,
}

#[derive(Serialize)]
struct WireHeader {
    stakesign: SignMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    expire: Option<String>,
    #[serde(rename = "stakeAd", skip_serializing_if = "Option::is_none")]
    stake_ad: Option<WireStakeAd>,
}

#[derive(Serialize)]
struct WireStakeAd {
    #[serde(rename = "ETH")]
    eth: f64,
}

impl HeaderSpec {
    /// Compact JSON header line, without the trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let wire = WireHeader {
            stakesign: self.mode,
            expire: self
                .expire
                .map(|e| e.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            stake_ad: self.stake_ad_eth.map(|eth| WireStakeAd { eth }),
        };
        serde_json::to_string(&wire)
    }
}

/// One signed git object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitEntry {
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_object: Option<String>,
}

/// One signed docker image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DockerEntry {
    pub image_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aka_repo_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aka_repo_digests: Vec<String>,
}

impl DockerEntry {
    /// Every repository tag and digest the signer observed for this image.
    pub fn signed_names(&self) -> impl Iterator<Item = &String> {
        self.aka_repo_tags.iter().chain(self.aka_repo_digests.iter())
    }
}
