use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use sitebuilder_editor::{EditorConfig, FieldBindings, FieldData};
use sitebuilder_markup::{format_error, parse};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Project field data (JSON object of eid → field value)
    pub project: PathBuf,

    /// Only inspect this field
    #[arg(short, long)]
    pub field: Option<String>,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let source = fs::read_to_string(&args.project)
        .with_context(|| format!("Cannot read {}", args.project.display()))?;
    let bindings = FieldBindings::from_json(&source, false)?;

    let fields: Vec<(&str, &FieldData)> = match &args.field {
        Some(eid) => vec![(eid.as_str(), bindings.field(eid)?)],
        None => bindings
            .data()
            .iter()
            .map(|(eid, field)| (eid.as_str(), field))
            .collect(),
    };

    let mut error_count = 0;
    for (eid, field) in fields {
        let shape = field.shape().unwrap_or("empty");
        let rich = config.is_rich(eid);
        println!(
            "{} {}{}",
            eid.bright_white().bold(),
            shape.cyan(),
            if rich { " (rich)".dimmed().to_string() } else { String::new() }
        );

        match (&field.text, rich) {
            (Some(text), true) => match parse(text) {
                Ok(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                Err(err) => {
                    error_count += 1;
                    eprintln!("{}", format_error(text, eid, &err));
                }
            },
            (Some(text), false) => println!("  {}", text),
            _ => println!("  {}", serde_json::to_string(field)?),
        }
    }

    if error_count > 0 {
        return Err(anyhow!("{} field(s) failed to parse", error_count));
    }
    Ok(())
}
