use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use autobot_report::{runner, utils};

#[derive(Parser)]
#[command(name = "autobot-report")]
#[command(version)]
#[command(about = "Run automated test cases and write per-run text reports", long_about = None)]
struct Cli {
    /// Config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test case file and write its report
    Run {
        /// Path to the test case YAML file
        path: PathBuf,

        /// Directory for report files, overrides config and environment
        #[arg(short, long)]
        reports_dir: Option<PathBuf>,
    },

    /// Print the resolved configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { path, reports_dir } => {
            let config =
                utils::config::Config::resolve(cli.config.as_deref(), reports_dir.as_deref())?;

            println!(
                "{} Running test case: {}",
                "▶".green().bold(),
                path.display()
            );
            println!(
                "  Reports: {}",
                config.reports_path.display().to_string().cyan()
            );

            let run = runner::run_file(&path, config)?;

            if let Some(report_path) = &run.report_path {
                println!(
                    "  Report saved to: {}",
                    report_path.display().to_string().cyan()
                );
            }

            match &run.outcome {
                runner::RunOutcome::Passed => {
                    println!(
                        "{} Test case {} {}",
                        "✓".green(),
                        run.test_case.name().white().bold(),
                        "PASSED".green().bold()
                    );
                }
                runner::RunOutcome::Aborted { step, error } => {
                    println!(
                        "{} Test case {} {} at step '{}': {:#}",
                        "✗".red(),
                        run.test_case.name().white().bold(),
                        "ABORTED".red().bold(),
                        step,
                        error
                    );
                }
            }

            let code = run.outcome.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Config => {
            let config = utils::config::Config::resolve(cli.config.as_deref(), None)?;
            println!("reportsPath: {}", config.reports_path.display());
        }
    }

    Ok(())
}
