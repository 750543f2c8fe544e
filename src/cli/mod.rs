use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::domain::{EntityType, PersistOptions};

#[derive(Subcommand)]
pub enum Commands {
    /// Persist one `{"type": .., "data": ..}` request read from a JSON file
    Persist {
        file: PathBuf,

        #[command(flatten)]
        skip: SkipArgs,
    },

    /// Persist a JSON array of requests concurrently
    Batch {
        file: PathBuf,

        #[command(flatten)]
        skip: SkipArgs,
    },

    /// Re-project relational rows missing from the graph or vector store
    Reconcile {
        /// Only sweep this tenant's entities
        #[arg(short, long)]
        user: Option<String>,

        /// Entity types to sweep (repeatable); all types when omitted
        #[arg(short = 't', long = "entity-type")]
        entity_type: Vec<EntityType>,
    },

    Stats,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SkipArgs {
    #[arg(long)]
    pub skip_graph: bool,

    #[arg(long)]
    pub skip_vector: bool,

    /// Do not enqueue the follow-up job
    #[arg(long)]
    pub skip_async: bool,
}

impl SkipArgs {
    pub fn options(&self) -> PersistOptions {
        PersistOptions {
            skip_graph: self.skip_graph,
            skip_vector: self.skip_vector,
            skip_async: self.skip_async,
            batch_mode: false,
        }
    }
}
