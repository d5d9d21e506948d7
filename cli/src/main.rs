mod commands;
mod output;
mod settings;

use clap::{Args, Parser, Subcommand};
use log::debug;
use stakesign_defs::{SignMode, DEFAULT_STAKE_FLOOR_ETH};
use stakesign_utils::{parse_log_level, setup_logging};

use reconciler::VerifyTarget;

#[derive(Parser, Debug)]
#[command(
    name = "stakesign",
    version = env!("APP_VERSION"),
    about = "Sign artifacts in Ethereum transactions and verify them against local files, git revisions or docker images"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Ethereum JSON-RPC gateway [env: WEB3_PROVIDER_URI]
    #[arg(long, global = true, value_name = "URL")]
    pub gateway: Option<String>,

    /// Docker daemon to query for local images
    #[arg(long, global = true, value_name = "HOST", env = "DOCKER_HOST")]
    pub docker_host: Option<String>,

    /// Git repository to reconcile against
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub repo: std::path::PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Signed image tag suffix allowed to drift to another image (repeatable)
    #[arg(long = "mutable-tag", global = true, value_name = "SUFFIX")]
    pub mutable_tags: Vec<String>,

    /// error, warn, info or debug
    #[arg(long, global = true, value_name = "LEVEL", env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify an existing signature
    Verify(VerifyArgs),
    /// Prepare data for a signature transaction
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signature transaction ID (0x...)
    pub signature: String,

    /// Minimum acceptable current ETH balance for the signer's address
    #[arg(long = "stake", value_name = "ETH", default_value_t = DEFAULT_STAKE_FLOOR_ETH)]
    pub stake_floor_eth: f64,

    /// Use --stake even if it is less than the signature's stakeAd
    #[arg(long)]
    pub ignore_ad: bool,

    /// Tolerate signed objects missing locally
    #[arg(long)]
    pub ignore_missing: bool,

    /// Proceed even if the signature's stated expiration date has passed
    #[arg(long)]
    pub expired_ok: bool,

    /// Display the transaction's UTF-8 payload after success
    #[arg(long)]
    pub verbose: bool,

    /// Verify a git revision, given as --git=REV (default HEAD)
    #[arg(
        long,
        value_name = "REV",
        num_args = 0..=1,
        require_equals = true,
        conflicts_with_all = ["docker", "file"]
    )]
    pub git: Option<Option<String>>,

    /// Verify a local docker image, given as --docker=HANDLE (default: every signed image)
    #[arg(
        long,
        value_name = "HANDLE",
        num_args = 0..=1,
        require_equals = true,
        conflicts_with = "file"
    )]
    pub docker: Option<Option<String>>,

    /// Verify local files with sha256sum
    #[arg(long, visible_alias = "sha256sum")]
    pub file: bool,
}

impl VerifyArgs {
    pub fn target(&self) -> VerifyTarget {
        if let Some(revision) = &self.git {
            VerifyTarget::Git {
                revision: revision.clone(),
            }
        } else if let Some(handle) = &self.docker {
            VerifyTarget::Docker {
                handle: handle.clone(),
            }
        } else if self.file {
            VerifyTarget::File
        } else {
            VerifyTarget::Auto
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Files, git revisions or docker images to sign
    #[arg(value_name = "FILE", required_unless_present = "git")]
    pub items: Vec<String>,

    /// Sign git revisions (default HEAD)
    #[arg(long, conflicts_with = "docker")]
    pub git: bool,

    /// Sign docker images
    #[arg(long)]
    pub docker: bool,

    /// ETH stake to advertise
    #[arg(long = "stake", value_name = "ETH")]
    pub stake_ad: Option<f64>,

    /// Declare the signature expires at an ISO 8601 date and time
    #[arg(long, value_name = "TIMESTAMP", conflicts_with = "expire_days")]
    pub expire: Option<String>,

    /// Declare the signature expires N days from now
    #[arg(long, value_name = "N")]
    pub expire_days: Option<i64>,
}

impl PrepareArgs {
    pub fn mode(&self) -> SignMode {
        if self.git {
            SignMode::Git
        } else if self.docker {
            SignMode::Docker
        } else {
            SignMode::File
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(parse_log_level(cli.global.log_level.as_deref())) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let config = settings::build_config(&cli.global, settings::Environment::from_process());
    debug!("Using configuration {:?}", config);

    match &cli.command {
        Commands::Verify(args) => commands::verify::handle_verify(&config, args).await,
        Commands::Prepare(args) => commands::prepare::handle_prepare(&config, args).await,
    }
}
