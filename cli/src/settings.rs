use stakesign_defs::{AliasPolicy, Config, GatewaySource, DEFAULT_GATEWAY};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::GlobalArgs;

/// The process environment values configuration may fall back on.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub web3_provider_uri: Option<String>,
    pub sha256sum: Option<String>,
    pub no_color: bool,
    pub stdout_is_terminal: bool,
}

impl Environment {
    pub fn from_process() -> Self {
        Environment {
            web3_provider_uri: std::env::var("WEB3_PROVIDER_URI")
                .ok()
                .filter(|v| !v.is_empty()),
            sha256sum: std::env::var("STAKESIGN_SHA256SUM")
                .ok()
                .filter(|v| !v.is_empty()),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            stdout_is_terminal: std::io::stdout().is_terminal(),
        }
    }
}

pub fn build_config(args: &GlobalArgs, env: Environment) -> Config {
    let (gateway_url, gateway_source) = match (&args.gateway, env.web3_provider_uri) {
        (Some(flag), _) => (flag.clone(), GatewaySource::Flag),
        (None, Some(uri)) => (uri, GatewaySource::Environment),
        (None, None) => (DEFAULT_GATEWAY.to_string(), GatewaySource::Default),
    };

    let alias_policy = if args.mutable_tags.is_empty() {
        AliasPolicy::default()
    } else {
        AliasPolicy {
            mutable_suffixes: args.mutable_tags.clone(),
        }
    };

    Config {
        gateway_url,
        gateway_source,
        docker_host: args.docker_host.clone().filter(|h| !h.is_empty()),
        repo_dir: args.repo.clone(),
        sha256sum: env.sha256sum.map(PathBuf::from),
        color: !args.no_color && !env.no_color && env.stdout_is_terminal,
        alias_policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> GlobalArgs {
        GlobalArgs {
            repo: PathBuf::from("."),
            ..Default::default()
        }
    }

    #[test]
    fn test_gateway_precedence() {
        let env = Environment {
            web3_provider_uri: Some("https://env.example".to_string()),
            ..Default::default()
        };

        let config = build_config(&args(), Environment::default());
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY);
        assert_eq!(config.gateway_source, GatewaySource::Default);

        let config = build_config(&args(), env.clone());
        assert_eq!(config.gateway_url, "https://env.example");
        assert_eq!(config.gateway_source, GatewaySource::Environment);

        let mut flagged = args();
        flagged.gateway = Some("https://flag.example".to_string());
        let config = build_config(&flagged, env);
        assert_eq!(config.gateway_url, "https://flag.example");
        assert_eq!(config.gateway_source, GatewaySource::Flag);
    }

    #[test]
    fn test_color_needs_terminal_and_no_opt_out() {
        let tty = Environment {
            stdout_is_terminal: true,
            ..Default::default()
        };
        assert!(build_config(&args(), tty.clone()).color);
        assert!(!build_config(&args(), Environment::default()).color);

        let mut no_color = args();
        no_color.no_color = true;
        assert!(!build_config(&no_color, tty.clone()).color);

        let env_opt_out = Environment {
            no_color: true,
            ..tty
        };
        assert!(!build_config(&args(), env_opt_out).color);
    }

    #[test]
    fn test_mutable_tags_replace_default() {
        assert!(build_config(&args(), Environment::default())
            .alias_policy
            .is_mutable("app:latest"));

        let mut custom = args();
        custom.mutable_tags = vec![":edge".to_string()];
        let policy = build_config(&custom, Environment::default()).alias_policy;
        assert!(policy.is_mutable("app:edge"));
        assert!(!policy.is_mutable("app:latest"));
    }
}
