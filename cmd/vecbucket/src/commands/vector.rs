//! Vector commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use giztoy_vecbucket::{QueryParams, UpdateVectorParams, UpsertParams};

use super::{create_store, load_request, output_result, print_success, print_verbose};
use crate::Cli;

/// Vector writes, queries and deletes.
///
/// Upsert, query and update read their parameters from a YAML or JSON
/// file given with -f.
///
/// Example upsert request:
///
///   index_name: docs
///   vectors: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
///   ids: [a, b]
///   metadata: [{lang: en}, {lang: fr}]
#[derive(Args)]
pub struct VectorCommand {
    #[command(subcommand)]
    command: VectorSubcommand,
}

#[derive(Subcommand)]
enum VectorSubcommand {
    /// Write vectors (in chunks of 10) and print their ids
    Upsert,
    /// Find nearest neighbors
    Query,
    /// Replace a vector's embedding and metadata
    Update {
        /// Index name
        index: String,
        /// Vector id
        id: String,
    },
    /// Delete vectors by id
    Delete {
        /// Index name
        index: String,
        /// Vector ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Serialize)]
struct UpsertOutput {
    index: String,
    ids: Vec<String>,
}

impl VectorCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            VectorSubcommand::Upsert => {
                let params: UpsertParams = load_request(cli)?;
                print_verbose(
                    cli,
                    &format!(
                        "Upserting {} vectors into {}",
                        params.vectors.len(),
                        params.index_name
                    ),
                );
                let store = create_store(cli)?;
                let index = params.index_name.clone();
                let ids = store.upsert(params).await?;
                output_result(cli, &UpsertOutput { index, ids })
            }

            VectorSubcommand::Query => {
                let params: QueryParams = load_request(cli)?;
                print_verbose(
                    cli,
                    &format!("Querying {} (top_k={})", params.index_name, params.top_k()),
                );
                let store = create_store(cli)?;
                let results = store.query(params).await?;
                output_result(cli, &results)
            }

            VectorSubcommand::Update { index, id } => {
                let update: UpdateVectorParams = load_request(cli)?;
                let store = create_store(cli)?;
                store.update_vector(index, id, update).await?;
                print_success(&format!("Vector \"{}\" updated in \"{}\"", id, index));
                Ok(())
            }

            VectorSubcommand::Delete { index, ids } => {
                let store = create_store(cli)?;
                if let [id] = ids.as_slice() {
                    store.delete_vector(index, id).await?;
                } else {
                    store.delete_vectors(index, ids).await?;
                }
                print_success(&format!("Deleted {} vector(s) from \"{}\"", ids.len(), index));
                Ok(())
            }
        }
    }
}
