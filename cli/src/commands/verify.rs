use chrono::Utc;
use http_client::EthRpcClient;
use log::info;
use reconciler::{
    verify_signature, DockerDaemon, GitCli, Sha256sum, VerifyContext, VerifyEvent, VerifyRequest,
};
use stakesign_defs::Config;
use stakesign_utils::escape_untrusted;

use crate::output::Printer;
use crate::VerifyArgs;

pub async fn handle_verify(config: &Config, args: &VerifyArgs) {
    let printer = Printer::new(config.color);
    printer.gateway(&config.gateway_url, config.gateway_source);

    let oracle = match EthRpcClient::new(&config.gateway_url) {
        Ok(oracle) => oracle,
        Err(e) => printer.bail(e),
    };
    let repo = GitCli::new(&config.repo_dir);
    let images = DockerDaemon::new(config.docker_host.clone());
    let hasher = Sha256sum::from_config(config);
    let ctx = VerifyContext {
        oracle: &oracle,
        repo: &repo,
        images: &images,
        hasher: &hasher,
        alias_policy: &config.alias_policy,
    };

    let request = VerifyRequest {
        transaction_id: args.signature.clone(),
        target: args.target(),
        stake_floor_eth: args.stake_floor_eth,
        ignore_ad: args.ignore_ad,
        ignore_missing: args.ignore_missing,
        expired_ok: args.expired_ok,
    };

    let now = Utc::now();
    let mut observer = |event: VerifyEvent<'_>| match event {
        VerifyEvent::Signature(signature) => printer.signature(signature, now),
        VerifyEvent::Expiry(expiry) => printer.expiry(expiry),
        VerifyEvent::Stake(stake) => printer.stake(stake),
        VerifyEvent::Hasher(exe) => {
            printer.tsv(&["  Trusting local exe:", &exe]);
            println!();
        }
    };

    let report = match verify_signature(&ctx, &request, &mut observer).await {
        Ok(report) => report,
        Err(e) => printer.bail(e),
    };

    for line in &report.verified {
        println!("{}", line);
    }
    printer.success();
    for warning in report.warnings.iter() {
        printer.warn(warning);
    }
    info!(
        "Verified {} signature {} from {}",
        report.mode, report.signature.id, report.signature.signer
    );

    if args.verbose {
        println!();
        println!(
            "{}",
            escape_untrusted(&report.signature.payload).trim_end_matches('\n')
        );
    }
}
