mod codec;
mod docker;
mod envelope;
mod file;
mod git;
mod index;
mod prepare;
mod signature;
mod verify;

pub use codec::{decode_manifest, encode_entries, parse_entries};

pub use index::{classify_tag, ImageHandleIndex, LocalTag};

pub use docker::{prepare_docker, verify_docker};

pub use file::{prepare_file, verify_file};

pub use git::{prepare_git, verify_git, PREPARE_SHA1_WARNING, VERIFY_SHA1_WARNING};

pub use envelope::{
    check_expire, check_stake, default_floor_reminder, ensure_stake, ensure_unexpired,
    is_default_floor,
};

pub use signature::fetch_signature;

pub use verify::{
    verify_signature, Reconciler, VerifyContext, VerifyEvent, VerifyRequest, VerifyTarget,
};

pub use prepare::{
    prepare_signature, resolve_expiry, PrepareContext, PrepareRequest, PreparedSignature,
    NO_STAKE_WARNING,
};
