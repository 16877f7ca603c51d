//! Schema command - Print the types contributed by folder nodes

use anyhow::Result;
use clap::Args;

use dbxsource_core::schema::{render_sdl, type_definitions};

use super::AppContext;
use crate::output::get_formatter;

#[derive(Debug, Args)]
pub struct SchemaCommand {
    /// Assume folder nodes are enabled regardless of configuration
    #[arg(long)]
    pub folder_nodes: bool,
}

impl SchemaCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let mut source = ctx.config.source.clone();
        source.create_folder_nodes |= self.folder_nodes;

        let definitions = type_definitions(&source);
        let sdl = render_sdl(&definitions);

        if ctx.format.is_json() {
            let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
            get_formatter(ctx.format).print_json(&serde_json::json!({
                "types": names,
                "sdl": sdl,
            }));
        } else if !sdl.is_empty() {
            println!("{sdl}");
        }
        Ok(())
    }
}
