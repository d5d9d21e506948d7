use std::path::PathBuf;

pub const DEFAULT_GATEWAY: &str = "https://cloudflare-eth.com";
pub const DEFAULT_STAKE_FLOOR_ETH: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewaySource {
    Flag,
    Environment,
    Default,
}

/// Which signed tags may drift to another image without failing verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasPolicy {
    pub mutable_suffixes: Vec<String>,
}

impl Default for AliasPolicy {
    fn default() -> Self {
        AliasPolicy {
            mutable_suffixes: vec![":latest".to_string()],
        }
    }
}

impl AliasPolicy {
    pub fn is_mutable(&self, name: &str) -> bool {
        self.mutable_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }
}

/// Settings for one run, assembled once by the binary and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gateway_url: String,
    pub gateway_source: GatewaySource,
    /// `None` uses the docker client's local defaults.
    pub docker_host: Option<String>,
    pub repo_dir: PathBuf,
    /// `None` searches `PATH` for `sha256sum`.
    pub sha256sum: Option<PathBuf>,
    pub color: bool,
    pub alias_policy: AliasPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gateway_url: DEFAULT_GATEWAY.to_string(),
            gateway_source: GatewaySource::Default,
            docker_host: None,
            repo_dir: PathBuf::from("."),
            sha256sum: None,
            color: false,
            alias_policy: AliasPolicy::default(),
        }
    }
}
