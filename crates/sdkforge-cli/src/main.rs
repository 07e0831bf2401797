use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use sdkforge_core::config::{self, CONFIG_FILE_NAME, ForgeConfig};
use sdkforge_core::{document, morph};

use sdkforge_cli::orchestrator::BuildOrchestrator;
use sdkforge_cli::watch;

#[derive(Parser)]
#[command(name = "sdkforge", about = "OpenAPI-driven multi-language SDK build pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-shot SDK build
    Build {
        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Rebuild continuously on filesystem changes
    Watch {
        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the morphed OpenAPI document without generating
    Morph {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: MorphFormat,
    },

    /// Initialize a new sdkforge configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum MorphFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config } => cmd_build(config),

        Commands::Watch { config } => cmd_watch(config),

        Commands::Morph { input, format } => cmd_morph(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "sdkforge", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, failing with a pointer at `init` if absent.
fn load_forge_config(path: Option<PathBuf>) -> Result<ForgeConfig> {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    config::load_config(&path)
        .map_err(anyhow::Error::msg)?
        .ok_or_else(|| {
            anyhow!(
                "no configuration found at {}; run `sdkforge init` first",
                path.display()
            )
        })
}

fn cmd_build(config: Option<PathBuf>) -> Result<()> {
    let config = load_forge_config(config)?;
    BuildOrchestrator::new(config).build()
}

fn cmd_watch(config: Option<PathBuf>) -> Result<()> {
    let config = load_forge_config(config)?;
    let orchestrator = BuildOrchestrator::new(config);
    watch::run(&orchestrator)
}

fn cmd_morph(input: PathBuf, format: MorphFormat) -> Result<()> {
    let mut doc = document::from_path(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    morph(&mut doc)?;
    let rendered = match format {
        MorphFormat::Json => doc.to_json_pretty()?,
        MorphFormat::Yaml => serde_yaml_ng::to_string(&doc)?,
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    fs::write(&path, config::default_config_content())
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
