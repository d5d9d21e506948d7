use chrono::{DateTime, TimeDelta, Utc};
use colored::Colorize;
use stakesign_defs::{ExpiryInfo, GatewaySource, Signature, StakeCheck};
use stakesign_utils::{format_age, format_ether, format_utc};
use std::fmt::Display;

const RECENT_SIGNATURE_DAYS: i64 = 3;

/// Renders the human-readable report. Everything goes to stdout except errors.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Printer { color }
    }

    fn green(&self, text: &str) -> String {
        if self.color {
            text.bright_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn red(&self, text: &str) -> String {
        if self.color {
            text.bright_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn yellow(&self, text: &str) -> String {
        if self.color {
            text.bright_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn mark(&self, ok: bool) -> String {
        if ok {
            self.green("🗹")
        } else {
            self.red("✗")
        }
    }

    pub fn tsv(&self, fields: &[&str]) {
        println!("{}", fields.join("\t"));
    }

    pub fn warn(&self, msg: &str) {
        println!("{}", self.yellow(&format!("[WARN] {}", msg)));
    }

    pub fn error(&self, msg: impl Display) {
        eprintln!("{}", self.red(&format!("[ERROR] {}", msg)));
    }

    /// Reports a fatal error and exits with status 1.
    pub fn bail(&self, msg: impl Display) -> ! {
        self.error(msg);
        std::process::exit(1);
    }

    pub fn gateway(&self, url: &str, source: GatewaySource) {
        self.tsv(&["Trusting ETH gateway:", url, gateway_note(source)]);
    }

    pub fn signature(&self, signature: &Signature, now: DateTime<Utc>) {
        let age = now - signature.timestamp;
        let age_text = format!("({} ago)", format_age(age));
        let age_text = if is_recent(age) {
            self.yellow(&age_text)
        } else {
            age_text
        };
        self.tsv(&["         Transaction:", &signature.id]);
        self.tsv(&["    Signer's address:", &signature.signer]);
        self.tsv(&[
            " Signature timestamp:",
            &format_utc(&signature.timestamp),
            &age_text,
        ]);
    }

    pub fn expiry(&self, expiry: &ExpiryInfo) {
        if let Some(expire) = &expiry.expire_utc {
            self.tsv(&[
                "Signature expiration:",
                &format_utc(expire),
                &self.mark(expiry.is_unexpired()),
            ]);
        }
    }

    pub fn stake(&self, stake: &StakeCheck) {
        self.tsv(&[
            "Signer's balance now:",
            &format_ether(stake.signer_wei),
            &stake_comparison(stake),
            &self.mark(stake.is_enough()),
        ]);
    }

    pub fn success(&self) {
        println!();
        self.tsv(&[&self.green("🗹"), "Success"]);
    }
}

pub fn gateway_note(source: GatewaySource) -> &'static str {
    match source {
        GatewaySource::Flag => "(from --gateway)",
        GatewaySource::Environment => "(from environment WEB3_PROVIDER_URI)",
        GatewaySource::Default => "(to override, set environment WEB3_PROVIDER_URI)",
    }
}

fn is_recent(age: TimeDelta) -> bool {
    age < TimeDelta::days(RECENT_SIGNATURE_DAYS)
}

pub fn stake_comparison(stake: &StakeCheck) -> String {
    format!(
        "{} {} ETH from {}",
        if stake.is_enough() { "≥" } else { "<" },
        format_ether(stake.required_wei),
        stake.source
    )
}
