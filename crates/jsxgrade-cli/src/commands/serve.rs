//! The `jsxgrade serve` command.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::BufReader;

use jsxgrade_core::config::load_config_from;
use jsxgrade_host::{serve_lines, HostConfig};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let host_config = HostConfig {
        max_nesting_depth: config.max_nesting_depth,
        ..HostConfig::default()
    };

    tracing::info!("serving host protocol on stdin/stdout");
    serve_lines(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        host_config,
    )
    .await?;

    Ok(())
}
