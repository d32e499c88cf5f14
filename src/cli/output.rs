//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::validation::ValidationErrors;
use crate::store::StoreError;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Table,
        other => other,
    }
}

/// Print a value as JSON or YAML; returns false for other formats
pub fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print a list of records in the requested format
///
/// `table` is only built for table and CSV output.
pub fn print_list<T: Entity>(
    items: &[&T],
    kind_plural: &str,
    format: OutputFormat,
    table: impl FnOnce() -> Table,
) -> Result<()> {
    let format = effective_format(format);
    if print_serialized(items, format)? {
        return Ok(());
    }

    if format == OutputFormat::Id {
        for item in items {
            println!("{}", item.id());
        }
        return Ok(());
    }

    if items.is_empty() {
        if format != OutputFormat::Csv {
            println!("No {} found.", kind_plural);
        }
        return Ok(());
    }

    let table = table();
    table.print(format)?;
    if format == OutputFormat::Table {
        println!(
            "{} {}",
            style(table.len()).cyan(),
            style(kind_plural).dim()
        );
    }
    Ok(())
}

/// Print field-by-field validation messages
pub fn print_field_errors(errors: &ValidationErrors) {
    for error in errors.iter() {
        eprintln!(
            "  {} {}: {}",
            style("•").red(),
            style(error.field).bold(),
            error.message
        );
    }
}

/// Convert a store failure into a diagnostic at the command boundary
///
/// Backend failures were already announced by the store's notifier.
pub fn store_failure(kind: &str, err: StoreError) -> miette::Report {
    match err {
        StoreError::Invalid(errors) => {
            print_field_errors(&errors);
            miette::miette!("Invalid {}: {}", kind, errors)
        }
        other => miette::miette!("{}", other.user_message()),
    }
}

/// Section rule used by detail views
pub fn rule() -> String {
    style("─".repeat(60)).dim().to_string()
}

/// `label: value` line for detail views
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", style(label).bold(), value);
}

/// Print the new record's id in the requested form
pub fn print_created(
    id: &str,
    alias: &str,
    title: &str,
    global: &GlobalOpts,
) -> Result<()> {
    match effective_format(global.output) {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "id": id, "short_id": alias, "title": title })
        ),
        _ => println!(
            "{} {} {}",
            style(alias).cyan(),
            style(id).dim(),
            title
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_unsized_slices() {
        let ids: &[&str] = &["PROJ-A", "PROJ-B"];
        assert!(print_serialized(ids, OutputFormat::Yaml).unwrap());
        assert!(print_serialized(ids, OutputFormat::Json).unwrap());
        assert!(!print_serialized(ids, OutputFormat::Table).unwrap());
    }
}
