mod docker;
mod git_cli;
mod sha256sum;

pub use docker::DockerDaemon;
pub use git_cli::GitCli;
pub use sha256sum::Sha256sum;
