pub mod interface;
pub mod logic;

pub use interface::{DockerDaemon, GitCli, Sha256sum};

pub use logic::{
    prepare_signature, resolve_expiry, verify_signature, PrepareContext, PrepareRequest,
    PreparedSignature, VerifyContext, VerifyEvent, VerifyRequest, VerifyTarget,
};
