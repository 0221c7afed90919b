//! `labassist onboard`: first-time setup.

use labassist_config::AppConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    println!("🧪 labassist: First-Time Setup");
    println!("==============================\n");

    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    AppConfig::write_default(&path)?;
    println!("✅ Created config.toml at: {}", path.display());

    let defaults = AppConfig::default();
    println!("\n📝 Next steps:");
    println!("   1. Start Ollama and pull a model: ollama pull {}", defaults.default_model);
    println!(
        "   2. Put your notes in ./{} (*.{} files)",
        defaults.documents.roots.join(", ./"),
        defaults.documents.extension
    );
    println!("   3. Adjust [[retrieval.priority_rules]] for your host names");
    println!("   4. Run `labassist doctor`, then `labassist`");
    Ok(())
}
