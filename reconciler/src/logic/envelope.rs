use chrono::{DateTime, Utc};
use stakesign_defs::{
    ExpiryInfo, Header, SignError, SignResult, StakeCheck, StakeSource, Warnings,
    DEFAULT_STAKE_FLOOR_ETH,
};
use stakesign_utils::{eth_to_wei, format_ether, parse_iso8601_utc};

pub fn check_expire(header: &Header, now_utc: DateTime<Utc>) -> SignResult<ExpiryInfo> {
    let expire_utc = match header.expire() {
        None => None,
        Some(value) => Some(
            value
                .as_str()
                .and_then(parse_iso8601_utc)
                .ok_or_else(|| {
                    SignError::format(
                        "Transaction header.expire has invalid value (expected ISO 8601)",
                    )
                })?,
        ),
    };
    Ok(ExpiryInfo {
        expire_utc,
        now_utc,
    })
}

pub fn ensure_unexpired(expiry: &ExpiryInfo, expired_ok: bool) -> SignResult<()> {
    if expiry.is_unexpired() || expired_ok {
        Ok(())
    } else {
        Err(SignError::envelope(
            "Signature's stated expiration date has passed",
        ))
    }
}

/// Works out the stake the signer must hold: the operator floor, raised to the
/// header's advisory `stakeAd` unless `ignore_ad` is set.
pub fn check_stake(
    header: &Header,
    signer_wei: u128,
    floor_wei: u128,
    ignore_ad: bool,
) -> SignResult<(StakeCheck, Warnings)> {
    let mut warnings = Warnings::new();
    let mut check = StakeCheck {
        signer_wei,
        required_wei: floor_wei,
        source: StakeSource::Floor,
    };

    let stake_ad = match header.stake_ad() {
        Some(stake_ad) if !ignore_ad => stake_ad,
        _ => return Ok((check, warnings)),
    };
    let stake_ad = stake_ad
        .as_object()
        .ok_or_else(|| SignError::format("Transaction header.stakeAd has invalid value"))?;

    match stake_ad.get("ETH") {
        Some(eth) => {
            let ad_wei = eth
                .as_f64()
                .and_then(|eth| eth_to_wei(eth).ok())
                .ok_or_else(|| {
                    SignError::format("Transaction header.stakeAd has invalid ETH value")
                })?;
            if ad_wei > check.required_wei {
                check.required_wei = ad_wei;
                check.source = StakeSource::Advertised;
            }
        }
        None => warnings.add("Transaction header.stakeAd doesn't specify ETH value"),
    }
    Ok((check, warnings))
}

pub fn ensure_stake(check: &StakeCheck) -> SignResult<()> {
    if check.is_enough() {
        return Ok(());
    }
    let mut msg = "Signer's address holds insufficient ETH balance, possibly indicating revocation or compromise!".to_string();
    if check.source == StakeSource::Floor {
        msg.push_str(&format!(
            "\n        If you're certain this address is trustworthy, rerun with --stake {}",
            format_ether(check.signer_wei)
        ));
    }
    Err(SignError::envelope(msg))
}

pub fn is_default_floor(floor_eth: f64) -> bool {
    (floor_eth - DEFAULT_STAKE_FLOOR_ETH).abs() < DEFAULT_STAKE_FLOOR_ETH / 1000.0
}

/// Standing reminder shown when the operator left the floor at its default.
pub fn default_floor_reminder(floor_eth: f64, signer_wei: u128) -> Option<String> {
    is_default_floor(floor_eth).then(|| {
        format!(
            "Ensure the signer's current {} ETH stake evinces their ongoing interest in securing it.\n       Consider setting --stake above the default {} ETH depending on the publisher.",
            format_ether(signer_wei),
            DEFAULT_STAKE_FLOOR_ETH
        )
    })
}
