//! Configuration management commands.

use clap::{Args, Subcommand};

use giztoy_cli::{mask_secret, Context as CliContext};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to manage multiple bucket configurations,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.giztoy/vecbucket/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// AWS region (required)
        #[arg(long)]
        region: String,
        /// Vector bucket name (required)
        #[arg(long)]
        bucket: String,
        /// Custom endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
        /// Access key ID (defaults to AWS_ACCESS_KEY_ID)
        #[arg(long)]
        access_key_id: Option<String>,
        /// Secret access key (defaults to AWS_SECRET_ACCESS_KEY)
        #[arg(long)]
        secret_access_key: Option<String>,
        /// Session token
        #[arg(long)]
        session_token: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Check embedding lengths against the index before writing
        #[arg(long)]
        validate_dimensions: bool,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                region,
                bucket,
                endpoint,
                access_key_id,
                secret_access_key,
                session_token,
                timeout,
                validate_dimensions,
            } => {
                if access_key_id.is_some() != secret_access_key.is_some() {
                    anyhow::bail!("--access-key-id and --secret-access-key must be given together");
                }

                let mut cfg = get_config(cli)?;
                let ctx = CliContext {
                    region: region.clone(),
                    bucket: bucket.clone(),
                    endpoint: endpoint.clone().unwrap_or_default(),
                    access_key_id: access_key_id.clone().unwrap_or_default(),
                    secret_access_key: secret_access_key.clone().unwrap_or_default(),
                    session_token: session_token.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or(0),
                    validate_dimensions: *validate_dimensions,
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<16} {:<30} {}", "CURRENT", "NAME", "REGION", "BUCKET", "ENDPOINT");
                for (name, ctx) in &cfg.contexts {
                    let current = if name == &cfg.current_context { "*" } else { "" };
                    let endpoint = if ctx.endpoint.is_empty() {
                        "(default)"
                    } else {
                        &ctx.endpoint
                    };
                    println!(
                        "{:<8} {:<20} {:<16} {:<30} {}",
                        current, name, ctx.region, ctx.bucket, endpoint
                    );
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                if !cfg.contexts.is_empty() {
                    println!("\nContext details:");
                }
                for (name, ctx) in &cfg.contexts {
                    println!("\n  {}:", name);
                    println!("    Region: {}", ctx.region);
                    println!("    Bucket: {}", ctx.bucket);
                    if !ctx.endpoint.is_empty() {
                        println!("    Endpoint: {}", ctx.endpoint);
                    }
                    if ctx.has_credentials() {
                        println!("    Access Key ID: {}", mask_secret(&ctx.access_key_id));
                        println!("    Secret Access Key: {}", mask_secret(&ctx.secret_access_key));
                    } else {
                        println!("    Credentials: (environment)");
                    }
                    if !ctx.session_token.is_empty() {
                        println!("    Session Token: {}", mask_secret(&ctx.session_token));
                    }
                    if ctx.timeout > 0 {
                        println!("    Timeout: {}s", ctx.timeout);
                    }
                    if ctx.validate_dimensions {
                        println!("    Validate Dimensions: true");
                    }
                }
                Ok(())
            }
        }
    }
}
