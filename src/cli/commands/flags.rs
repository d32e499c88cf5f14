//! `claimdesk flags` command - the built-in flag catalog

use miette::Result;

use crate::cli::output::{effective_format, print_serialized};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::flags::CATALOG;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let format = effective_format(global.output);

    let entries: Vec<serde_json::Value> = CATALOG
        .iter()
        .map(|f| serde_json::json!({ "code": f.code, "name": f.name, "flagUrl": f.flag_url() }))
        .collect();
    if print_serialized(&entries, format)? {
        return Ok(());
    }

    if format == OutputFormat::Id {
        for flag in CATALOG {
            println!("{}", flag.code);
        }
        return Ok(());
    }

    let mut table = Table::new(&["CODE", "NAME", "FLAG"]);
    for flag in CATALOG {
        table.row(vec![
            flag.code.to_string(),
            flag.name.to_string(),
            flag.flag_url(),
        ]);
    }
    table.print(format)
}
