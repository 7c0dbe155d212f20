use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use storeplug::component::{global, seal_global};
use storeplug::config::{LoaderConfig, PLUGIN_PATH_ENV};
use storeplug::plugins::{factory_signature, initialize_plugins};

#[derive(Parser)]
#[command(name = "storeplug")]
#[command(about = "Load storage service plugins into the component registry", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load configured plugins and list the registered components
    Load {
        /// Colon-separated plugin list (overrides STOREPLUG_PLUGIN_PATH)
        #[arg(short, long)]
        plugin_path: Option<String>,

        /// Print the load report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the factory signature plugins must declare
    Signature,
    /// Show version information
    Version,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cmd_load(plugin_path: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = LoaderConfig::from_env()?.merge_override(plugin_path);

    let report = match initialize_plugins(&config) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Error initializing plugins");
            eprintln!("failed to initialize plugin: {}", e);
            std::process::exit(1);
        }
    };
    seal_global()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_idle() {
        println!("No plugins configured ({} is empty)", PLUGIN_PATH_ENV);
    }
    for plugin in &report.registered {
        println!(
            "{}\t{}\t{:.3}ms",
            plugin.component, plugin.path, plugin.elapsed_ms
        );
    }
    for path in &report.skipped {
        println!("skipped\t{:?}", path);
    }

    let registry = global()
        .read()
        .map_err(|_| anyhow::anyhow!("component registry lock is poisoned"))?;
    println!("{} component(s) registered", registry.len());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env file");
        }
    }

    match cli.command {
        Some(Commands::Load { plugin_path, json }) => cmd_load(plugin_path, json)?,
        None => cmd_load(None, false)?,
        Some(Commands::Signature) => println!("{}", factory_signature()),
        Some(Commands::Version) => println!("storeplug {}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}
