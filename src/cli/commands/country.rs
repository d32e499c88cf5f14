//! `claimdesk country` command - Country management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{confirm, format_date, format_timestamp, plural, text_or_prompt};
use crate::cli::output::{field, print_created, print_list, print_serialized, rule, store_failure};
use crate::cli::session::Session;
use crate::cli::table::{or_dash, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{flags, Country, CountryDraft};

#[derive(Subcommand, Debug)]
pub enum CountryCommands {
    /// List countries
    List(ListArgs),

    /// Create a new country
    New(NewArgs),

    /// Show a country and its projects
    Show(ShowArgs),

    /// Change a country's fields
    Edit(EditArgs),

    /// Delete a country (its projects are kept)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive substring match on the name
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Country name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// ISO code or name from the built-in flag catalog (see `claimdesk flags`)
    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Flag image URL
    #[arg(long)]
    pub flag_url: Option<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "context-file", short = 'f')]
    pub context_files: Vec<PathBuf>,

    /// Prompt for missing fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Country ID or short ID (CTRY@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Country ID or short ID (CTRY@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New flag image URL
    #[arg(long)]
    pub flag_url: Option<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "add-context-file")]
    pub add_context_files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Country ID or short ID (CTRY@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a country subcommand
pub async fn run(cmd: CountryCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global).await?;
    match cmd {
        CountryCommands::List(args) => run_list(&mut session, args, global),
        CountryCommands::New(args) => run_new(&mut session, args, global).await,
        CountryCommands::Show(args) => run_show(&mut session, args, global),
        CountryCommands::Edit(args) => run_edit(&mut session, args, global).await,
        CountryCommands::Delete(args) => run_delete(&mut session, args).await,
    }
}

fn run_list(session: &mut Session, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let needle = args.search.map(|s| s.to_lowercase());
    let mut countries: Vec<Country> = session
        .store
        .countries()
        .iter()
        .filter(|c| {
            needle
                .as_deref()
                .is_none_or(|n| c.name.to_lowercase().contains(n))
        })
        .cloned()
        .collect();
    countries.sort_by_key(|c| c.name.to_lowercase());

    if args.count {
        println!("{}", countries.len());
        return Ok(());
    }

    session.remember(&countries)?;
    let refs: Vec<&Country> = countries.iter().collect();

    print_list(&refs, "countries", global.output, || {
        let mut table = Table::new(&["SHORT", "NAME", "FLAG", "PROJECTS", "CREATED", "ID"]);
        for country in &countries {
            table.row(vec![
                session.display_id(country.id.as_str()),
                country.name.clone(),
                or_dash(country.flag_url.as_deref()),
                session
                    .store
                    .projects_for_country(country.id.as_str())
                    .len()
                    .to_string(),
                format_date(&country.created_at),
                country.id.to_string(),
            ]);
        }
        table
    })
}

async fn run_new(session: &mut Session, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let known = match args.code.as_deref() {
        Some(code) => Some(
            flags::lookup(code)
                .ok_or_else(|| miette::miette!("No flag catalog entry for '{}'", code))?,
        ),
        None => None,
    };

    let name = match (args.name, known) {
        (Some(name), _) => name,
        (None, Some(flag)) => flag.name.to_string(),
        (None, None) => text_or_prompt(None, "Country name", args.interactive)?,
    };

    let mut draft = CountryDraft::new(name);
    draft.flag_url = args.flag_url.or_else(|| known.map(|f| f.flag_url()));
    draft.context_files = args.context_files;

    let country = session
        .store
        .add_country(draft)
        .await
        .map_err(|e| store_failure("country", e))?;

    let alias = session.alias(&country);
    session.save_short_ids()?;
    print_created(&country.id.to_string(), &alias, &country.name, global)
}

fn run_show(session: &mut Session, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let country = session
        .store
        .country(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No country found matching '{}'", args.id))?;

    let format = global.output;
    if print_serialized(&country, format)? {
        return Ok(());
    }
    if format == OutputFormat::Id {
        println!("{}", country.id);
        return Ok(());
    }

    let projects: Vec<_> = session
        .store
        .projects_for_country(&id)
        .into_iter()
        .cloned()
        .collect();
    let alias = session.alias(&country);
    session.remember(&projects)?;

    println!("{}", rule());
    field("ID", style(&country.id).cyan());
    field("Short", &alias);
    field("Name", style(&country.name).yellow());
    field("Flag", or_dash(country.flag_url.as_deref()));
    println!("{}", rule());

    println!();
    println!(
        "{} ({}):",
        style("Projects").bold(),
        projects.len()
    );
    for project in &projects {
        println!(
            "  • {} {}",
            style(session.display_id(project.id.as_str())).cyan(),
            project.title
        );
    }

    if !country.context_files.is_empty() {
        println!();
        println!("{}:", style("Context files").bold());
        for file in &country.context_files {
            println!("  • {}", file.name);
        }
    }

    println!("{}", rule());
    field("Created", style(format_timestamp(&country.created_at)).dim());
    Ok(())
}

async fn run_edit(session: &mut Session, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let mut country = session
        .store
        .country(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No country found matching '{}'", args.id))?;

    if let Some(name) = args.name {
        country.name = name;
    }
    if let Some(url) = args.flag_url {
        country.flag_url = Some(url).filter(|u| !u.trim().is_empty());
    }
    country
        .context_files
        .extend(crate::entities::attachment::from_paths(&args.add_context_files));

    let updated = session
        .store
        .update_country(country)
        .await
        .map_err(|e| store_failure("country", e))?;

    if global.output == OutputFormat::Id {
        println!("{}", updated.id);
    }
    Ok(())
}

async fn run_delete(session: &mut Session, args: DeleteArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let Some(country) = session.store.country(&id).cloned() else {
        println!("No country found matching '{}'; nothing to delete.", args.id);
        return Ok(());
    };

    let orphans = session.store.projects_for_country(&id).len();
    let mut prompt = format!("Delete country {}?", country.name);
    if orphans > 0 {
        prompt.push_str(&format!(
            " {} {} will keep pointing at it.",
            orphans,
            plural(orphans, "project", "projects")
        ));
    }
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session
        .store
        .delete_country(&id)
        .await
        .map_err(|e| store_failure("country", e))?;
    Ok(())
}
