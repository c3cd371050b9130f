use clap::{Parser, Subcommand};

use sitefleet::config::{self, Config};
use sitefleet::logger;
use sitefleet::provision::{self, DeploymentPlan, LocalProvider};
use sitefleet::server;

/// Provision and serve static websites behind a shared edge
#[derive(Debug, Parser)]
#[command(name = "sitefleet", version)]
#[command(about = "Multi-site static hosting: deploy and local edge", long_about = None)]
struct Cli {
    /// Configuration file (without extension)
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply the full configuration: bucket, certificates, distributions, assets
    Deploy {
        /// Print the plan as JSON and apply nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the local edge server against the bucket root
    Serve,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg.logging);
    tracing::debug!("loaded config: {:?}", cfg);

    run(cli.command, cfg).inspect_err(|err| tracing::error!("{err}"))
}

fn run(command: Command, cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Deploy { dry_run: true } => {
            let plan = DeploymentPlan::build(&cfg)?;
            println!("{}", plan.to_json()?);
        }
        Command::Deploy { dry_run: false } => {
            let mut provider = LocalProvider::new(&cfg.paths.bucket_root);
            let summary = provision::deploy(&cfg, &mut provider)?;
            println!(
                "Deployed {} site(s), {} certificate request(s), {} object(s) uploaded",
                summary.sites, summary.certificates, summary.objects_uploaded
            );
        }
        Command::Serve => {
            // Create Tokio runtime, worker count from edge.workers
            let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
            runtime_builder.enable_all();
            if let Some(workers) = cfg.edge.workers {
                runtime_builder.worker_threads(workers);
            }
            let runtime = runtime_builder.build()?;
            runtime.block_on(server::serve(cfg))?;
        }
    }

    Ok(())
}
