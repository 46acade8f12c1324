use anyhow::Result;
use clap::{Parser, Subcommand};
use kit_compat::{
    analyze_text, init_tracing, Config, GeometryClient, GeometrySource, StaticTable,
    TextRenderer,
};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "kit-compat")]
#[command(about = "Check whether a bike can take a Reebike electrification kit")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one bike, e.g. `kit-compat check Trek Domane SL 2023`
    Check {
        /// Brand followed by model
        #[arg(required = true, num_args = 1..)]
        bike: Vec<String>,

        /// Geometry endpoint (or set KIT_COMPAT_GEOMETRY_URL)
        #[arg(long)]
        geometry_url: Option<String>,

        /// Geometry request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the verdict as JSON instead of the text panel (logs stay on stderr)
        #[arg(long)]
        json: bool,
    },
    /// List the brands of the reference table
    Brands,
    /// Autocomplete a brand/model fragment
    Suggest {
        text: String,

        #[arg(short, long, default_value_t = 8)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    init_tracing(&config.log_level);

    let table = StaticTable::reference();

    match args.command {
        Commands::Check {
            bike,
            geometry_url,
            timeout_secs,
            json,
        } => {
            if let Some(url) = geometry_url {
                config.geometry_url = Some(url);
                config.enable_geometry = true;
            }
            if let Some(secs) = timeout_secs {
                config.geometry_timeout = Duration::from_secs(secs);
            }
            let client = GeometryClient::from_config(&config)?;
            let source = client.as_ref().map(|c| c as &dyn GeometrySource);

            let text = bike.join(" ");
            info!(input = %text, "checking bike");
            let mut renderer = TextRenderer::new();
            match analyze_text(&text, source, table, &mut renderer).await {
                Ok(verdict) if json => println!("{}", serde_json::to_string_pretty(&verdict)?),
                Ok(_) => print!("{}", renderer.text()),
                Err(e) if e.is_user_facing() => {
                    eprint!("{}", renderer.text());
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Brands => {
            for brand in table.brands() {
                println!("{}", brand);
            }
        }
        Commands::Suggest { text, limit } => {
            for suggestion in table.suggest(&text, limit) {
                println!("{}\t{}", suggestion.label, suggestion.status);
            }
        }
    }

    Ok(())
}
