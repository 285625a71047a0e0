//! Corral - Deploy compose projects as container groups
//!
//! This is the main CLI entry point for Corral.

use clap::{Args, Parser, Subcommand};
use corral::compose::{load_project, ProjectOptions};
use corral::container::{container_group_to_container, group_to_views};
use corral::context::{ContextStore, DeploymentContext};
use corral::error::{CorralError, Result};
use corral::group::{to_container_group, ContainerGroup};
use corral::logs::{stream_logs, ColorCycle, JsonLinesFetcher, LogTarget};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Corral - compose projects on single-namespace container groups
#[derive(Parser)]
#[command(name = "corral")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Deploy compose projects as container groups", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Context store directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a compose project into a container group descriptor
    Convert {
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show a single container of a container group
    Inspect {
        /// Container group descriptor (JSON)
        group: PathBuf,
        /// Container name
        container: String,
    },

    /// List containers of a container group
    Ps {
        /// Container group descriptor (JSON)
        group: PathBuf,
    },

    /// Stream merged service logs until interrupted
    Logs {
        #[command(flatten)]
        project: ProjectArgs,
        /// JSON-lines event capture to replay ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
        /// Disable colored prefixes
        #[arg(long)]
        no_color: bool,
    },

    /// Manage deployment contexts
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Compose file
    #[arg(short, long)]
    file: Vec<PathBuf>,
    /// Project name
    #[arg(short = 'p', long)]
    name: Option<String>,
}

impl ProjectArgs {
    fn options(&self) -> Result<ProjectOptions> {
        let mut options = ProjectOptions::new(std::env::current_dir()?);
        options.name = self.name.clone();
        options.files = self.file.clone();
        options.env = std::env::vars().collect();
        Ok(options)
    }
}

#[derive(Args)]
struct ContextArgs {
    /// Stored context to deploy with
    #[arg(long)]
    context: Option<String>,
    /// Target region
    #[arg(long)]
    location: Option<String>,
    /// Subscription ID
    #[arg(long)]
    subscription: Option<String>,
    /// Resource group
    #[arg(long)]
    resource_group: Option<String>,
}

impl ContextArgs {
    fn resolve(&self, store: &ContextStore) -> Result<DeploymentContext> {
        let mut ctx = match self.context {
            Some(ref name) => store.load(name)?,
            None => DeploymentContext::default(),
        };

        if let Some(ref location) = self.location {
            ctx.location = location.clone();
        }
        if let Some(ref subscription) = self.subscription {
            ctx.subscription_id = subscription.clone();
        }
        if let Some(ref resource_group) = self.resource_group {
            ctx.resource_group = resource_group.clone();
        }

        if ctx.location.is_empty() {
            return Err(CorralError::InvalidConfig(
                "no location set; pass --location or --context".to_string(),
            ));
        }
        Ok(ctx)
    }
}

#[derive(Subcommand)]
enum ContextCommands {
    /// Create or replace a context
    Create {
        /// Context name
        name: String,
        /// Subscription ID
        #[arg(long)]
        subscription: String,
        /// Resource group
        #[arg(long)]
        resource_group: String,
        /// Target region
        #[arg(long)]
        location: String,
    },
    /// Show a context
    Show {
        /// Context name
        name: String,
    },
    /// List contexts
    #[command(name = "ls")]
    List,
    /// Remove a context
    #[command(name = "rm")]
    Remove {
        /// Context name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = ContextStore::new(cli.config_dir.unwrap_or_else(ContextStore::default_root));

    match cli.command {
        Commands::Convert { project, context } => {
            let ctx = context.resolve(&store)?;
            let project = load_project(&project.options()?)?;
            let group = to_container_group(&ctx, &project)?;
            println!("{}", serde_json::to_string_pretty(&group)?);
        }

        Commands::Inspect { group, container } => {
            let group = read_group(&group)?;
            let member = group
                .container(&container)
                .ok_or_else(|| CorralError::ContainerNotFound(container.clone()))?;
            let id = format!("{}_{}", group.name.as_deref().unwrap_or_default(), container);
            let view = container_group_to_container(&id, &group, member)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }

        Commands::Ps { group } => {
            let group = read_group(&group)?;
            println!("{:<30} {:<30} {:<12} PORTS", "CONTAINER ID", "IMAGE", "STATUS");
            for view in group_to_views(&group)? {
                let ports: Vec<String> = view.ports.iter().map(|p| p.to_string()).collect();
                println!(
                    "{:<30} {:<30} {:<12} {}",
                    view.id,
                    view.image,
                    view.status,
                    ports.join(", ")
                );
            }
        }

        Commands::Logs {
            project,
            input,
            no_color,
        } => {
            let target = match project.name {
                Some(ref name) => LogTarget::project_name(name),
                None => LogTarget::Project(project.options()?),
            };

            let stdout = std::io::stdout();
            let colors = if no_color || !stdout.is_terminal() {
                ColorCycle::monochrome()
            } else {
                ColorCycle::rainbow()
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping log stream");
                }
                on_interrupt.cancel();
            });

            if input == Path::new("-") {
                let reader = BufReader::new(tokio::io::stdin());
                run_logs(reader, &target, stdout, colors, cancel).await?;
            } else {
                let reader = BufReader::new(tokio::fs::File::open(&input).await?);
                run_logs(reader, &target, stdout, colors, cancel).await?;
            }
        }

        Commands::Context { command } => match command {
            ContextCommands::Create {
                name,
                subscription,
                resource_group,
                location,
            } => {
                let ctx = DeploymentContext::new(&name, &subscription, &resource_group, &location);
                store.save(&ctx)?;
                println!("Created context {}", name);
            }
            ContextCommands::Show { name } => {
                let ctx = store.load(&name)?;
                println!("{}", serde_json::to_string_pretty(&ctx)?);
            }
            ContextCommands::List => {
                for name in store.list()? {
                    println!("{}", name);
                }
            }
            ContextCommands::Remove { name } => {
                store.remove(&name)?;
                println!("Removed context {}", name);
            }
        },
    }

    Ok(())
}

fn read_group(path: &Path) -> Result<ContainerGroup> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

async fn run_logs<R>(
    reader: R,
    target: &LogTarget,
    sink: std::io::Stdout,
    colors: ColorCycle,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let fetcher = JsonLinesFetcher::new(reader);
    stream_logs(&fetcher, target, sink, colors, cancel).await
}
