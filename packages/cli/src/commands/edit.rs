use crate::script::{parse_selection, Step};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sitebuilder_editor::{EditorConfig, FieldBindings, FieldValue, Page};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Project field data (JSON object of eid → field value)
    pub project: PathBuf,

    /// Field to edit
    #[arg(short, long)]
    pub field: String,

    /// Selection as BLOCK:START-END or BLOCK:START-BLOCK:END
    #[arg(short, long)]
    pub select: String,

    /// Steps to run in order (bold, h1, align=center, link=URL, undo, ...)
    #[arg(short, long = "command", required = true)]
    pub commands: Vec<String>,

    /// Treat the field as rich text even if the config doesn't list it
    #[arg(long)]
    pub rich: bool,

    /// Write the result back to the project file instead of stdout
    #[arg(short, long)]
    pub write: bool,
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let mut config = EditorConfig::load(cwd)?;
    if args.rich && !config.is_rich(&args.field) {
        config.rich_text_fields.push(args.field.clone());
    }

    let selection = parse_selection(&args.select)?;
    let steps = args
        .commands
        .iter()
        .map(|command| command.parse::<Step>())
        .collect::<Result<Vec<_>, _>>()?;

    info!(field = %args.field, steps = steps.len(), "running edit script");

    let source = fs::read_to_string(&args.project)
        .with_context(|| format!("Cannot read {}", args.project.display()))?;
    let bindings = FieldBindings::from_json(&source, true)?.with_sink(
        |eid: &str, value: &FieldValue| {
            let shown = match value {
                FieldValue::Text { text } => text.clone(),
                other => format!("{:?}", other),
            };
            eprintln!("  {} {} = {}", "✓".green(), eid.bright_white(), shown.dimmed());
        },
    );
    let mut page = Page::new(bindings, config);

    let session = page.session(&args.field, "");
    session.select(selection);
    for step in &steps {
        let changed = match step {
            Step::Run(command) => session.execute(command),
            Step::Undo => session.undo(),
            Step::Redo => session.redo(),
        };
        if !changed {
            eprintln!("  {} {:?} had no effect", "-".yellow(), step);
        }
    }

    if !page.commit(&args.field)? {
        eprintln!("{}", "No changes".yellow());
    }

    let output = page.bindings().to_json_pretty()?;
    if args.write {
        fs::write(&args.project, output + "\n")?;
        eprintln!("{} {}", "Wrote".green().bold(), args.project.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}
