//! `debpin` update command

use anyhow::{Context, Result};

use crate::cli::Cli;
use debpin::ops::{update_files, RuleOutcome, SystemClock, UpdateContext, UpdateOptions};
use debpin::sources::ReqwestClient;
use debpin::util::config::{global_config_path, load_config, project_config_path};
use debpin::verify::Keyring;

pub fn execute(args: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    let keyring = Keyring::load(&config.keys.resolve_paths(&cwd, &args.pgp_keys))?;
    if keyring.is_empty() {
        tracing::warn!("No trusted keys given (--pgp-key); no Release signature can be verified");
    }

    let http = ReqwestClient::new(&config.net)?;
    let clock = SystemClock;
    let ctx = UpdateContext::new(&http, &keyring, &clock).with_update_config(&config.update);

    let files: Vec<_> = args.files.iter().map(|f| cwd.join(f)).collect();
    let opts = UpdateOptions {
        dry_run: args.dry_run,
    };

    let updates = update_files(&ctx, &files, &opts)?;

    for update in &updates {
        if args.dry_run {
            print!("{}", update.rendered);
            continue;
        }

        let updated = update
            .rules
            .iter()
            .filter(|(_, outcome)| *outcome == RuleOutcome::Updated)
            .count();
        let skipped = update
            .rules
            .iter()
            .filter(|(_, outcome)| *outcome == RuleOutcome::Skipped)
            .count();
        eprintln!(
            "    Checked {} ({} rule(s), {} changed, {} skipped)",
            update.path.display(),
            update.rules.len(),
            updated,
            skipped
        );
    }

    Ok(())
}
