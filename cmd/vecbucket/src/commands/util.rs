//! Utility functions for CLI commands.

use std::time::Duration;

use giztoy_cli::{load_config, Config, Context, Output};
use giztoy_s3vectors::Credentials;
use giztoy_vecbucket::{StoreConfig, VectorStore};

use crate::Cli;

const APP_NAME: &str = "vecbucket";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context configuration to use.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;

    match cfg.resolve_context(cli.context.as_deref()) {
        Some(ctx) => Ok(ctx.clone()),
        None => match cli.context.as_deref() {
            Some(name) => anyhow::bail!("context '{}' not found", name),
            None => anyhow::bail!(
                "no context specified. Use -c flag or set a default context with 'vecbucket config use-context'"
            ),
        },
    }
}

/// Loads the request given with `-f`.
pub fn load_request<T: serde::de::DeserializeOwned>(cli: &Cli) -> anyhow::Result<T> {
    let path = cli
        .input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("input file is required, use -f flag"))?;
    print_verbose(cli, &format!("Loading request from {}", path));
    Ok(giztoy_cli::load_request(path)?)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    Output::from_flags(cli.json, cli.output.as_deref()).write(result)
}

/// Builds a store from a context.
pub fn store_config(ctx: &Context) -> anyhow::Result<StoreConfig> {
    if ctx.region.is_empty() {
        anyhow::bail!("context '{}' has no region", ctx.name);
    }
    if ctx.bucket.is_empty() {
        anyhow::bail!("context '{}' has no bucket", ctx.name);
    }

    let mut cfg = StoreConfig::new(&ctx.bucket, &ctx.region)
        .with_endpoint(&ctx.endpoint)
        .with_validate_dimensions(ctx.validate_dimensions);
    if ctx.has_credentials() {
        cfg = cfg.with_credentials(
            Credentials::new(&ctx.access_key_id, &ctx.secret_access_key)
                .with_session_token(&ctx.session_token),
        );
    }
    if ctx.timeout > 0 {
        cfg = cfg.with_timeout(Duration::from_secs(ctx.timeout));
    }
    Ok(cfg)
}

/// Connects to the bucket of the selected context.
pub fn create_store(cli: &Cli) -> anyhow::Result<VectorStore> {
    let ctx = get_context(cli)?;
    let cfg = store_config(&ctx)?;
    print_verbose(
        cli,
        &format!("Using context {} (bucket={}, region={})", ctx.name, cfg.bucket, cfg.region),
    );
    Ok(VectorStore::connect(cfg)?)
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("[verbose] {}", msg);
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}
