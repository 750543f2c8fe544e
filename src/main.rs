use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use entity_fanout::{Commands, Container, ContainerConfig, PersistenceConfig, Router};

#[derive(Parser)]
#[command(name = "entity-fanout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.entity-fanout")]
    data_dir: String,

    /// Keep all stores in memory for this run
    #[arg(long, global = true)]
    memory_storage: bool,

    /// Run without a graph client
    #[arg(long, global = true)]
    no_graph: bool,

    /// Entities persisted at once by `batch` (0 = unbounded; DuckDB storage caps it at 16)
    #[arg(long, global = true, default_value = "16")]
    batch_concurrency: usize,

    #[arg(long, global = true, default_value = "10000")]
    relational_timeout_ms: u64,

    #[arg(long, global = true, default_value = "5000")]
    graph_timeout_ms: u64,

    #[arg(long, global = true, default_value = "5000")]
    vector_timeout_ms: u64,

    #[arg(long, global = true, default_value = "2000")]
    queue_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn persistence_config(&self) -> PersistenceConfig {
        PersistenceConfig::default()
            .with_batch_concurrency(self.batch_concurrency)
            .with_timeouts(
                Duration::from_millis(self.relational_timeout_ms),
                Duration::from_millis(self.graph_timeout_ms),
                Duration::from_millis(self.vector_timeout_ms),
                Duration::from_millis(self.queue_timeout_ms),
            )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose. Logs go to stderr so results stay parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let data_dir = expand_tilde(&cli.data_dir);
    if !cli.memory_storage {
        std::fs::create_dir_all(&data_dir)?;
    }

    let config = ContainerConfig {
        data_dir,
        memory_storage: cli.memory_storage,
        disable_graph: cli.no_graph,
        persistence: cli.persistence_config(),
    };

    let container = Container::new(config).await?;
    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn skip_flags_parse_on_persist() {
        let cli = Cli::try_parse_from([
            "entity-fanout",
            "--memory-storage",
            "persist",
            "request.json",
            "--skip-graph",
            "--skip-async",
        ])
        .unwrap();

        match cli.command {
            Commands::Persist { skip, .. } => {
                let options = skip.options();
                assert!(options.skip_graph);
                assert!(!options.skip_vector);
                assert!(options.skip_async);
            }
            _ => panic!("expected persist"),
        }
    }

    #[test]
    fn reconcile_rejects_unknown_entity_type() {
        let res = Cli::try_parse_from(["entity-fanout", "reconcile", "-t", "Widget"]);
        assert!(res.is_err());
    }

    #[test]
    fn reconcile_accepts_snake_case_types() {
        let cli =
            Cli::try_parse_from(["entity-fanout", "reconcile", "-t", "memory_unit", "-t", "Concept"])
                .unwrap();
        match cli.command {
            Commands::Reconcile { entity_type, user } => {
                assert_eq!(entity_type.len(), 2);
                assert!(user.is_none());
            }
            _ => panic!("expected reconcile"),
        }
    }

    #[test]
    fn timeouts_feed_persistence_config() {
        let cli = Cli::try_parse_from(["entity-fanout", "--graph-timeout-ms", "250", "stats"]).unwrap();
        let config = cli.persistence_config();
        assert_eq!(config.graph_timeout, Duration::from_millis(250));
        assert_eq!(config.batch_concurrency, 16);
    }
}
