//! Shared helper functions for CLI commands
//!
//! Prompts, confirmation and id formatting used across the entity command
//! modules.

use chrono::{DateTime, Utc};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use miette::{IntoDiagnostic, Result};
use std::io::{self, IsTerminal};

use crate::core::identity::EntityId;

/// Ask before a destructive action
///
/// `--yes` skips the prompt. Without a terminal there is nobody to ask, so
/// the action is refused.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(miette::miette!(
            "Refusing to continue without confirmation; pass --yes"
        ));
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Use the flag value, or ask for it when running interactively
pub fn text_or_prompt(value: Option<String>, label: &str, interactive: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if interactive => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic(),
        None => Ok(String::new()),
    }
}

/// Pick one entry from labelled options; `None` when there are none
pub fn pick_one(prompt: &str, options: &[(EntityId, String)]) -> Result<Option<EntityId>> {
    if options.is_empty() {
        return Ok(None);
    }
    let labels: Vec<&str> = options.iter().map(|(_, l)| l.as_str()).collect();
    let chosen = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .interact_opt()
        .into_diagnostic()?;
    Ok(chosen.map(|i| options[i].0.clone()))
}

/// Pick any number of entries from labelled options
pub fn pick_many(prompt: &str, options: &[(EntityId, String)]) -> Result<Vec<EntityId>> {
    if options.is_empty() {
        return Ok(Vec::new());
    }
    let labels: Vec<&str> = options.iter().map(|(_, l)| l.as_str()).collect();
    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .interact()
        .into_diagnostic()?;
    Ok(chosen.into_iter().map(|i| options[i].0.clone()).collect())
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Singular or plural noun for a count
pub fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_with_yes_skips_prompt() {
        assert!(confirm("Delete?", true).unwrap());
    }

    #[test]
    fn test_text_without_prompt() {
        assert_eq!(text_or_prompt(Some("Kenya".into()), "Name", false).unwrap(), "Kenya");
        assert_eq!(text_or_prompt(None, "Name", false).unwrap(), "");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "claim", "claims"), "claim");
        assert_eq!(plural(0, "claim", "claims"), "claims");
    }
}
