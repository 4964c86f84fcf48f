mod display;

use anyhow::Result;
use automerge::{
    Cli, Command, GhCli, Notifier, ProcessRunner, Report, compute_stats, github, poll,
};
use clap::Parser;
use display::ConsoleReport;

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Login => {
            let status = github::auth_login().await?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
        Command::Logout => {
            let status = github::auth_logout().await?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
        Command::Info(args) => {
            let forge = GhCli::new(ProcessRunner::default());
            let report = ConsoleReport::new(args.verbose);
            let notifier = Notifier::from_env();
            let filter = args.repo_filter()?;

            match compute_stats(&forge, &filter, poll::DEFAULT_AUTHOR).await {
                Ok(stats) => report.account(&stats),
                Err(err) => {
                    report.aggregation_error(&err);
                    if let Some(notifier) = &notifier {
                        notifier.notify("Automerge", &format!("error: {err}")).await;
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::Merge(args) => {
            let forge = GhCli::new(ProcessRunner::default());
            let report = ConsoleReport::new(args.verbose);
            let notifier = Notifier::from_env();
            let config = args.poll_config()?;

            // Failures are reported and notified inside the loop; only the
            // exit status is left to us.
            if poll::run(&forge, &config, &report, notifier.as_ref())
                .await
                .is_err()
            {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
