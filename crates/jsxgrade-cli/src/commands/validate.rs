//! The `jsxgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use jsxgrade_core::config::load_config_from;
use jsxgrade_core::suite;

pub fn execute(suite_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let path = match suite_path {
        Some(path) => path,
        None => PathBuf::from(load_config_from(config_path.as_deref())?.suite_dir),
    };

    let suites = if path.is_dir() {
        suite::load_suite_directory(&path)?
    } else {
        vec![suite::load_suite(&path)?]
    };

    let mut total_warnings = 0;

    for s in &suites {
        println!("Suite: {} ({} cases)", s.name, s.cases.len());

        let warnings = suite::validate_suite(s);
        for w in &warnings {
            match w.case_index {
                Some(i) => println!("  [#{}] WARNING: {}", i + 1, w.message),
                None => println!("  WARNING: {}", w.message),
            }
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("\nAll suites valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
