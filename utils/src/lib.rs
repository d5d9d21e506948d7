mod cmd;
mod exe;
mod logging;
mod payload;
mod time;
mod units;

pub use cmd::{run_command, stream_command, CommandResult};
pub use exe::find_executable;
pub use logging::{parse_log_level, setup_logging};
pub use payload::{decode_hex_payload, encode_hex_payload, escape_untrusted};
pub use time::{format_age, format_utc, parse_iso8601_utc};
pub use units::{eth_to_wei, format_ether, parse_quantity, WEI_PER_ETH};
