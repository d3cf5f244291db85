//! The `jsxgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("jsxgrade.toml").exists() {
        println!("jsxgrade.toml already exists, skipping.");
    } else {
        std::fs::write("jsxgrade.toml", SAMPLE_CONFIG)?;
        println!("Created jsxgrade.toml");
    }

    std::fs::create_dir_all("suites")?;
    let example_path = Path::new("suites/example.toml");
    if example_path.exists() {
        println!("suites/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SUITE)?;
        println!("Created suites/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: jsxgrade validate --suite suites/example.toml");
    println!("  2. Run: jsxgrade check --code App.jsx --suite suites/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# jsxgrade configuration

max_nesting_depth = 256
cache_capacity = 0
default_min_count = 1
log_cases = true
suite_dir = "suites"
"#;

const EXAMPLE_SUITE: &str = r#"[suite]
id = "example"
name = "Example Suite"
description = "A first function component"

[[cases]]
type = "ast"
description = "Declares a component function"
checker = "hasFunctionDeclaration || hasArrowFunction"

[[cases]]
type = "ast"
description = "Returns JSX"
checker = "isJSXElement"

[[cases]]
type = "pattern"
description = "Exports the component"
pattern = "export\\s+default"
"#;
