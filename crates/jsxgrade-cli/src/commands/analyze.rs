//! The `jsxgrade analyze` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use jsxgrade_core::analysis::{analyze_quality, validate_code};
use jsxgrade_core::config::load_config;
use jsxgrade_core::extract::analyze_source_with_depth;

pub fn execute(code_path: PathBuf) -> Result<()> {
    let config = load_config()?;
    let source = std::fs::read_to_string(&code_path)
        .with_context(|| format!("failed to read source file: {}", code_path.display()))?;

    let report = serde_json::json!({
        "context": analyze_source_with_depth(&source, config.max_nesting_depth),
        "validation": validate_code(&source),
        "quality": analyze_quality(&source),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
