//! `claimdesk dashboard` command - record counts per kind

use console::style;
use miette::Result;

use crate::cli::output::{effective_format, print_serialized, rule};
use crate::cli::session::Session;
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};

pub async fn run(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global).await?;
    let counts = session.store.dashboard();

    let format = effective_format(global.output);
    if print_serialized(&counts, format)? {
        return Ok(());
    }

    let rows = [
        ("Countries", counts.countries),
        ("Projects", counts.projects),
        ("Contractors", counts.contractors),
        ("Claims", counts.claims),
    ];

    if format == OutputFormat::Csv {
        let mut table = Table::new(&["KIND", "COUNT"]);
        for (kind, count) in rows {
            table.row(vec![kind.to_lowercase(), count.to_string()]);
        }
        return table.print(format);
    }

    println!("{}", style("Dashboard").bold());
    println!("{}", style(session.store.backend().describe()).dim());
    println!("{}", rule());
    for (kind, count) in rows {
        println!("  {:<12} {}", kind, style(count).cyan());
    }
    Ok(())
}
