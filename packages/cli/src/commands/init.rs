use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitebuilder_editor::{EditorConfig, CONFIG_FILE_NAME};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Fields to edit as rich text
    #[arg(short, long = "rich")]
    pub rich_fields: Vec<String>,

    /// Undo levels per edit session
    #[arg(long, default_value = "100")]
    pub history_depth: usize,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            CONFIG_FILE_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = EditorConfig {
        history_depth: args.history_depth,
        rich_text_fields: args.rich_fields,
        ..EditorConfig::default()
    };

    fs::write(&config_path, serde_json::to_string_pretty(&config)? + "\n")?;

    println!("  {} Created {}", "✓".green(), CONFIG_FILE_NAME);
    if config.rich_text_fields.is_empty() {
        println!(
            "  {} No rich text fields yet, add them with --rich <eid>",
            "ℹ".blue()
        );
    }

    Ok(())
}
