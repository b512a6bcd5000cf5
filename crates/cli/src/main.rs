mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use site_deploy_deployer::DeployError;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-deploy")]
#[command(version, long_about = None)]
#[command(about = "Publish a static site to S3 and invalidate CloudFront")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Upload the build directory to S3 and invalidate the CloudFront cache
    ///
    /// Environment:
    ///   AWS_S3_BUCKET                    target bucket (required)
    ///   AWS_CLOUDFRONT_DISTRIBUTION_ID   distribution to invalidate (optional)
    ///   AWS_REGION                       region (default: us-east-1)
    ///   SITE_DEPLOY_BUILD_DIR            build directory (default: dist)
    ///
    /// Credentials come from the standard AWS provider chain.
    Deploy {
        /// Directory holding the site build (overrides config and environment)
        #[arg(short, long)]
        build_dir: Option<PathBuf>,

        /// Settings file (default: ./site-deploy.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List what a deploy would upload, without touching AWS
    Plan {
        /// Directory holding the site build (overrides config and environment)
        #[arg(short, long)]
        build_dir: Option<PathBuf>,

        /// Settings file (default: ./site-deploy.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Stage failures are reported by the pipeline as they happen
            if e.downcast_ref::<DeployError>().is_none() {
                eprintln!("❌ {:#}", e);
            }
            tracing::debug!(error = %format!("{:#}", e), "exiting with failure");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Deploy { build_dir, config } => commands::deploy::run(build_dir, config).await,
        Command::Plan {
            build_dir,
            config,
            json,
        } => commands::plan::run(build_dir, config, json),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "site-deploy", &mut io::stdout());
            Ok(())
        }
    }
}
