use anyhow::{anyhow, bail, Context, Result};

pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
const ETH_DECIMALS: usize = 18;

/// Converts an ether amount to wei using its shortest decimal representation,
/// so `0.1` becomes exactly 10^17 wei. Digits beyond 18 decimals are dropped.
pub fn eth_to_wei(eth: f64) -> Result<u128> {
    if !eth.is_finite() || eth < 0.0 {
        bail!("ETH amount must be a finite, non-negative number");
    }
    // f64 Display never uses exponent notation.
    let repr = format!("{}", eth);
    let (int_part, frac_part) = match repr.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (repr.as_str(), ""),
    };

    let whole: u128 = int_part
        .parse()
        .with_context(|| format!("Invalid ETH amount: {}", repr))?;
    let mut frac_digits: String = frac_part.chars().take(ETH_DECIMALS).collect();
    while frac_digits.len() < ETH_DECIMALS {
        frac_digits.push('0');
    }
    let frac: u128 = frac_digits
        .parse()
        .with_context(|| format!("Invalid ETH amount: {}", repr))?;

    whole
        .checked_mul(WEI_PER_ETH)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| anyhow!("ETH amount out of range: {}", repr))
}

/// Exact decimal ether rendering of a wei amount.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parses a JSON-RPC hex quantity such as `0x1bc16d674ec80000`.
pub fn parse_quantity(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("Quantity is missing 0x prefix: {}", value))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).with_context(|| format!("Invalid hex quantity: {}", value))
}
