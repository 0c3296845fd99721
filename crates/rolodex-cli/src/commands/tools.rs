//! `rolodex tools` - list the tool definitions served over MCP.

use super::ConfigArgs;
use anyhow::{Context, Result};
use rolodex_mcp::{ToolDefinition, builtin_registry};
use std::fmt::Write;

pub fn list(config_args: &ConfigArgs, verbose: bool) -> Result<()> {
    let config = config_args.load()?;
    let registry = builtin_registry(&config.limits).context("Failed to build tool registry")?;
    print!("{}", render(&registry.list(), verbose)?);
    Ok(())
}

fn render(tools: &[&ToolDefinition], verbose: bool) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n🔧 Available Tools ({}):", tools.len())?;
    for tool in tools {
        let read_only = tool
            .annotations
            .as_ref()
            .is_some_and(|a| a.read_only_hint == Some(true));
        writeln!(
            out,
            "   • {} ({})",
            tool.name,
            if read_only { "read" } else { "writes files" }
        )?;
        if let Some(desc) = &tool.description {
            writeln!(out, "     {}", desc)?;
        }
        if verbose {
            writeln!(
                out,
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            )?;
        }
    }
    writeln!(out)?;
    Ok(out)
}
