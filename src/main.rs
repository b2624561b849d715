use anyhow::{Context, Result};
use beadscope::{config, integrations::BdClient, tree::TreeView, tui};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "beadscope")]
#[command(about = "Terminal dashboard for browsing beads issue trees")]
#[command(version)]
struct Args {
    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Project directory containing .beads/ (overrides the config)
    #[arg(long, short)]
    workdir: Option<PathBuf>,

    /// Fetch once, print the fully expanded tree and exit
    #[arg(long)]
    dump: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    log_stderr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_stderr || args.dump || args.init)?;

    if args.init {
        let path = config::init(args.config.as_deref())?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;

    let mut client = BdClient::from_config(&config.beads);
    if let Some(dir) = args.workdir {
        client = client.with_workdir(dir);
    }

    if args.dump {
        return dump(&client, &config).await;
    }

    tui::run(config, client).await
}

/// While the TUI owns the terminal, logs go to a file in the config dir.
fn init_logging(to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("beadscope=info".parse()?);

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let path = config::log_file_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

async fn dump(client: &BdClient, config: &config::Config) -> Result<()> {
    let (graph, digest) = client.fetch_tree(config.ui.sort_mode).await?;

    let mut view = TreeView::new();
    let summary = view.apply_refresh(graph, digest, Utc::now(), &mut |_: &beadscope::data::Node, _: &str| false);
    view.expand_all();

    for row in view.rows() {
        let Some(node) = view.graph().get(&row.node_id) else {
            continue;
        };
        println!(
            "{}{} [{}] {} {}",
            "  ".repeat(row.depth),
            node.id,
            node.status.display_name(),
            node.priority.label(),
            node.title
        );
    }
    println!("{} issues, {} rows ({})", view.graph().len(), view.rows().len(), summary);
    Ok(())
}
