//! `claimdesk check` command - find references to records that no longer exist

use console::style;
use miette::Result;

use crate::cli::output::{effective_format, print_serialized};
use crate::cli::session::Session;
use crate::cli::table::Table;
use crate::cli::helpers::plural;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Print only the number of dangling references
    #[arg(long)]
    pub count: bool,
}

/// Exits with an error when any dangling reference is found
pub async fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global).await?;
    let dangling = session.store.check_references();

    if args.count {
        println!("{}", dangling.len());
    } else {
        let format = effective_format(global.output);
        let rows: Vec<serde_json::Value> = dangling
            .iter()
            .map(|d| {
                serde_json::json!({
                    "source": d.source().as_str(),
                    "field": d.field(),
                    "target": d.target().as_str(),
                })
            })
            .collect();

        if !print_serialized(&rows, format)? {
            match format {
                OutputFormat::Table if dangling.is_empty() => {
                    println!("{} All references resolve.", style("✓").green());
                }
                OutputFormat::Table => {
                    for d in &dangling {
                        println!(
                            "  {} {} -> {} {} {}",
                            style("✗").red(),
                            style(session.display_id(d.source().as_str())).cyan(),
                            d.field(),
                            d.target(),
                            style("(missing)").dim()
                        );
                    }
                }
                OutputFormat::Id => {
                    for d in &dangling {
                        println!("{}", d.source());
                    }
                }
                _ => {
                    let mut table = Table::new(&["SOURCE", "FIELD", "TARGET"]);
                    for d in &dangling {
                        table.row(vec![
                            d.source().to_string(),
                            d.field().to_string(),
                            d.target().to_string(),
                        ]);
                    }
                    table.print(format)?;
                }
            }
        }
    }

    if dangling.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!(
            "{} dangling {} found",
            dangling.len(),
            plural(dangling.len(), "reference", "references")
        ))
    }
}
