//! `labassist tools`: the allow-list.

use labassist_agent::markers::marker_syntax;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let registry = labassist_tools::default_registry(&config.tools);

    println!("🔧 {} tool(s) the model may request:\n", registry.len());
    for tool in registry.tools() {
        let syntax = marker_syntax(tool.name(), tool.argument_contract().placeholder());
        println!("  {syntax}");
        println!("      {}", tool.description());
    }
    println!();
    println!(
        "  ping: {} packet(s), {}s per reply; every command is capped at {}s.",
        config.tools.ping_count, config.tools.ping_timeout_secs, config.tools.command_timeout_secs
    );
    Ok(())
}
