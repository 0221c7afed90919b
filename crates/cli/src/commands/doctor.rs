//! `labassist doctor`: diagnose setup problems.

use labassist_config::AppConfig;
use labassist_knowledge::DocumentIndex;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 labassist Doctor: System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    // Config
    let path = super::config_path(config_path);
    let config = if path.exists() {
        match AppConfig::load_with_env(&path) {
            Ok(config) => {
                println!("  ✅ Config file valid: {}", path.display());
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!("\n  ⚠️  Fix the config file, then run doctor again.");
                return Ok(());
            }
        }
    } else {
        println!(
            "  ⚠️  No config file at {}, using defaults (run `labassist onboard`)",
            path.display()
        );
        let mut config = AppConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    };

    // Documents
    let cwd = std::env::current_dir()?;
    let index = DocumentIndex::from_config(&config.documents, &cwd);
    for root in index.roots() {
        if root.is_dir() {
            println!("  ✅ Document root: {}", root.display());
        } else {
            println!("  ⚠️  Document root missing: {}", root.display());
            issues += 1;
        }
    }
    let count = index.list_documents().len();
    if count > 0 {
        println!("  ✅ {count} document(s) indexed");
    } else {
        println!("  ❌ No *.{} documents found; answers will have no context", index.extension());
        issues += 1;
    }

    // Model server
    let provider = labassist_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Model server reachable ({})", provider.name());
            match provider.list_models().await {
                Ok(models) if models.iter().any(|m| m == &config.default_model) => {
                    println!("  ✅ Model available: {}", config.default_model);
                }
                Ok(models) if !models.is_empty() => {
                    println!(
                        "  ⚠️  Model {} not listed (available: {})",
                        config.default_model,
                        models.join(", ")
                    );
                    issues += 1;
                }
                _ => println!(
                    "  ⚠️  Could not list models; assuming {} exists",
                    config.default_model
                ),
            }
        }
        Ok(false) => {
            println!("  ❌ Model server answered with an error ({})", provider.name());
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Model server unreachable: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
