//! Index management commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use giztoy_vecbucket::{CreateIndexParams, Metric};

use super::{create_store, load_request, output_result, print_success, print_verbose};
use crate::Cli;

/// Index management.
///
/// Indexes have a fixed dimension and distance metric chosen at creation.
#[derive(Args)]
pub struct IndexCommand {
    #[command(subcommand)]
    command: IndexSubcommand,
}

#[derive(Subcommand)]
enum IndexSubcommand {
    /// Create an index (from flags or -f request file)
    Create {
        /// Index name
        name: Option<String>,
        /// Vector dimension
        #[arg(long)]
        dimension: Option<usize>,
        /// Distance metric: cosine or euclidean
        #[arg(long, default_value = "cosine")]
        metric: Metric,
        /// Metadata keys that cannot be used in filters
        #[arg(long = "non-filterable-key")]
        non_filterable_keys: Vec<String>,
    },
    /// Show the dimension and metric of an index
    Describe {
        /// Index name
        name: String,
    },
    /// Check that an index has the expected dimension and metric
    Validate {
        /// Index name
        name: String,
        /// Expected dimension
        #[arg(long)]
        dimension: usize,
        /// Expected distance metric
        #[arg(long, default_value = "cosine")]
        metric: Metric,
    },
    /// Delete an index and all of its vectors
    Delete {
        /// Index name
        name: String,
    },
    /// List all indexes in the bucket
    List,
}

#[derive(Serialize)]
struct IndexList {
    indexes: Vec<String>,
}

impl IndexCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            IndexSubcommand::Create {
                name,
                dimension,
                metric,
                non_filterable_keys,
            } => {
                let params = match (name, dimension) {
                    (Some(name), Some(dimension)) => CreateIndexParams::new(name, *dimension)
                        .with_metric(*metric)
                        .with_non_filterable_keys(non_filterable_keys.iter().cloned()),
                    _ if cli.input.is_some() => load_request(cli)?,
                    _ => anyhow::bail!("index name and --dimension are required, or use -f"),
                };

                print_verbose(
                    cli,
                    &format!(
                        "Creating index {} (dimension={}, metric={})",
                        params.index_name, params.dimension, params.metric
                    ),
                );
                let store = create_store(cli)?;
                let name = params.index_name.clone();
                store.create_index(params).await?;
                print_success(&format!("Index \"{}\" ready", name));
                Ok(())
            }

            IndexSubcommand::Describe { name } => {
                let store = create_store(cli)?;
                let stats = store.describe_index(name).await?;
                output_result(cli, &stats)
            }

            IndexSubcommand::Validate {
                name,
                dimension,
                metric,
            } => {
                let store = create_store(cli)?;
                store
                    .validate_existing_index(name, *dimension, *metric)
                    .await?;
                print_success(&format!(
                    "Index \"{}\" has dimension {} and metric {}",
                    name, dimension, metric
                ));
                Ok(())
            }

            IndexSubcommand::Delete { name } => {
                let store = create_store(cli)?;
                store.delete_index(name).await?;
                print_success(&format!("Index \"{}\" deleted", name));
                Ok(())
            }

            IndexSubcommand::List => {
                let store = create_store(cli)?;
                let indexes = store.list_indexes().await?;
                output_result(cli, &IndexList { indexes })
            }
        }
    }
}
