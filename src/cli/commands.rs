use crate::app::{EntryPoint, StaticDocument};
use crate::core::models::DaemonConfig;
use crate::daemon::run_daemon;
use crate::infrastructure::{DevServer, ModuleResolver};
use crate::utils::{ConfigLoader, InstallerError, Logger};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fbi-installer")]
#[command(about = "FBI Remote Installer - push CIA/3DSX titles to a 3DS from the browser")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the FBI Remote Installer daemon
    Start {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        listen: SocketAddr,
        /// CIA data directory
        #[arg(short, long)]
        data_dir: PathBuf,
        /// Host advertised to the console instead of the request's Host header
        #[arg(short = 'u', long)]
        base_url: Option<String>,
    },
    /// Start the front end development server
    Dev {
        /// Front end root directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Port to serve on (overrides fbi.config.json)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check that the front end entry resolves and mounts
    Check {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Mount target in index.html
        #[arg(short, long)]
        selector: Option<String>,
    },
    /// Print the effective dev server descriptor
    Config {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        let cli = Cli::parse();
        Logger::init(cli.debug);

        match cli.command {
            Commands::Start {
                listen,
                data_dir,
                base_url,
            } => self.handle_start_command(listen, &data_dir, base_url).await,
            Commands::Dev { root, port } => self.handle_dev_command(&root, port).await,
            Commands::Check { root, selector } => self.handle_check_command(&root, selector),
            Commands::Config { root } => self.handle_config_command(&root),
        }
    }

    async fn handle_start_command(
        &self,
        listen: SocketAddr,
        data_dir: &Path,
        base_url: Option<String>,
    ) -> Result<()> {
        let data_dir = std::fs::canonicalize(data_dir)
            .with_context(|| format!("data dir {} must exist", data_dir.display()))?;
        if !data_dir.is_dir() {
            bail!("data dir {} is not a directory", data_dir.display());
        }

        run_daemon(DaemonConfig {
            listen,
            data_dir,
            base_url,
        })
        .await
    }

    async fn handle_dev_command(&self, root: &Path, port: Option<u16>) -> Result<()> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("root {} must exist", root.display()))?;
        let config = ConfigLoader::load(&root, port)?;

        Logger::info(&format!("📁 Root: {}", root.display()));
        DevServer::new(config)?.run().await?;
        Ok(())
    }

    /// Resolve the entry's imports, then run the bootstrap sequence against
    /// index.html
    fn handle_check_command(&self, root: &Path, selector: Option<String>) -> Result<()> {
        let config = ConfigLoader::load(root, None)?;
        let resolver = ModuleResolver::new(&config);

        let mut entry = EntryPoint::installer();
        if let Some(selector) = selector {
            entry = entry.mount_on(selector);
        }

        let main = root.join("src/main.js");
        for specifier in entry.imports() {
            let resolved = resolver.resolve(specifier, &main).map_err(|e| anyhow::anyhow!(e.format_detailed()))?;
            Logger::info(&format!("✓ {} → {}", specifier, resolved.display()));
        }
        if let Some(source) = &entry.root().source {
            let resolved = resolver.resolve(source, &main)?;
            Logger::info(&format!("✓ {} → {}", source, resolved.display()));
        }

        let index = root.join("index.html");
        let html = std::fs::read_to_string(&index)
            .with_context(|| format!("cannot read {}", index.display()))?;
        let mut document = StaticDocument::parse(&html);

        match entry.start(&mut document) {
            Ok(mounted) => {
                Logger::info(&format!(
                    "✓ {} mounts on {} ({} plugins)",
                    mounted.app().root().name,
                    mounted.selector(),
                    mounted.app().installed_plugins().len()
                ));
                Ok(())
            }
            Err(err @ InstallerError::MountTargetMissing(_)) => {
                Err(anyhow::Error::new(err).context(format!("checking {}", index.display())))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn handle_config_command(&self, root: &Path) -> Result<()> {
        let config = ConfigLoader::load(root, None)?;
        println!("{}", ConfigLoader::render(&config)?);
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
