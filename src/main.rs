use clap::Parser;
use apifox_ci::cli::commands::{NotifyTarget, cmd_analyse, cmd_card, cmd_run};
use apifox_ci::cli::config::{
    Cli, Commands, build_runner_settings, load_config, resolve_report_dir, resolve_suites,
    resolve_webhook,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apifox_ci::init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());
    let webhook_timeout = config.webhook.timeout_secs;

    let all_passed = match cli.command {
        Commands::Run {
            suites,
            webhook,
            dry_run,
            report_dir,
            timeout,
        } => {
            let suites = resolve_suites(&suites, &config);
            let settings = build_runner_settings(&config.runner, report_dir.as_deref(), timeout);
            let target = NotifyTarget::resolve(
                resolve_webhook(webhook.as_deref(), &config),
                dry_run,
                webhook_timeout,
            );
            cmd_run(&suites, settings, &target, cli.trace_file.as_deref())?
        }
        Commands::Analyse {
            reports,
            notify,
            webhook,
            dry_run,
            report_dir,
        } => {
            let report_dir = resolve_report_dir(&config.runner, report_dir.as_deref());
            let target = if notify || dry_run {
                NotifyTarget::resolve(
                    resolve_webhook(webhook.as_deref(), &config),
                    dry_run,
                    webhook_timeout,
                )
            } else {
                NotifyTarget::Disabled
            };
            cmd_analyse(&report_dir, &reports, &target)?
        }
        Commands::Card {
            reports,
            report_dir,
        } => {
            let report_dir = resolve_report_dir(&config.runner, report_dir.as_deref());
            cmd_card(&report_dir, &reports)?;
            true
        }
    };

    if !all_passed {
        std::process::exit(1);
    }

    Ok(())
}
