use chrono::Utc;
use reconciler::{
    prepare_signature, resolve_expiry, DockerDaemon, GitCli, PrepareContext, PrepareRequest,
    Sha256sum,
};
use stakesign_defs::{Config, ContentHasher, HeaderSpec, SignMode};

use crate::output::Printer;
use crate::PrepareArgs;

pub async fn handle_prepare(config: &Config, args: &PrepareArgs) {
    let printer = Printer::new(config.color);
    let mode = args.mode();

    let expire = match resolve_expiry(args.expire.as_deref(), args.expire_days, Utc::now()) {
        Ok(expire) => expire,
        Err(e) => printer.bail(e),
    };

    let repo = GitCli::new(&config.repo_dir);
    let images = DockerDaemon::new(config.docker_host.clone());
    let hasher = Sha256sum::from_config(config);
    let ctx = PrepareContext {
        repo: &repo,
        images: &images,
        hasher: &hasher,
    };

    // sha256sum relays its digest lines as they come, so the header goes first.
    let streams_body = mode == SignMode::File;
    if streams_body {
        printer.tsv(&["Trusting local exe:", &hasher.describe()]);
        println!();
        let header = HeaderSpec {
            mode,
            expire,
            stake_ad_eth: args.stake_ad,
        };
        match header.to_json() {
            Ok(line) => println!("{}", line),
            Err(e) => printer.bail(e),
        }
    }

    let request = PrepareRequest {
        mode,
        items: args.items.clone(),
        stake_eth: args.stake_ad,
        expire,
    };
    let prepared = match prepare_signature(&ctx, &request).await {
        Ok(prepared) => prepared,
        Err(e) => printer.bail(e),
    };

    if !streams_body {
        println!("{}", prepared.header);
        print!("{}", String::from_utf8_lossy(&prepared.body));
    }
    for warning in prepared.warnings.iter() {
        printer.warn(warning);
    }

    println!("\n-- Transaction input data for signing (one long line):\n");
    println!("{}", prepared.payload_hex);
    println!();
}
