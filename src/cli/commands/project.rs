//! `claimdesk project` command - Project management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    confirm, format_date, format_timestamp, pick_one, plural, text_or_prompt,
};
use crate::cli::output::{field, print_created, print_list, print_serialized, rule, store_failure};
use crate::cli::session::Session;
use crate::cli::table::{or_dash, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::entities::attachment;
use crate::entities::{Project, ProjectDraft};
use crate::store::{CascadeAuthority, CascadePlan};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects
    List(ListArgs),

    /// Create a new project
    New(NewArgs),

    /// Show a project with its contractors and claims
    Show(ShowArgs),

    /// Change a project's fields
    Edit(EditArgs),

    /// Delete a project, its claims and any contractor working only on it
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only projects in this country (ID or CTRY@N)
    #[arg(long)]
    pub country: Option<String>,

    /// Case-insensitive substring match on the title
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Country the project is located in (ID or CTRY@N)
    #[arg(long, short = 'c')]
    pub country: Option<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "context-file", short = 'f')]
    pub context_files: Vec<PathBuf>,

    /// Prompt for missing fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID or short ID (PROJ@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Project ID or short ID (PROJ@N)
    pub id: String,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Move to another country (ID or CTRY@N)
    #[arg(long, short = 'c')]
    pub country: Option<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "add-context-file")]
    pub add_context_files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project ID or short ID (PROJ@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a project subcommand
pub async fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global).await?;
    match cmd {
        ProjectCommands::List(args) => run_list(&mut session, args, global),
        ProjectCommands::New(args) => run_new(&mut session, args, global).await,
        ProjectCommands::Show(args) => run_show(&mut session, args, global),
        ProjectCommands::Edit(args) => run_edit(&mut session, args, global).await,
        ProjectCommands::Delete(args) => run_delete(&mut session, args).await,
    }
}

fn run_list(session: &mut Session, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut projects: Vec<Project> = match args.country {
        Some(ref country) => {
            let country_id = session.resolve(country)?;
            session
                .store
                .projects_for_country(&country_id)
                .into_iter()
                .cloned()
                .collect()
        }
        None => session.store.projects().to_vec(),
    };

    if let Some(needle) = args.search.map(|s| s.to_lowercase()) {
        projects.retain(|p| p.title.to_lowercase().contains(&needle));
    }
    projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    if args.count {
        println!("{}", projects.len());
        return Ok(());
    }

    session.remember(&projects)?;
    let refs: Vec<&Project> = projects.iter().collect();

    print_list(&refs, "projects", global.output, || {
        let mut table = Table::new(&[
            "SHORT",
            "TITLE",
            "COUNTRY",
            "CONTRACTORS",
            "CLAIMS",
            "CREATED",
            "ID",
        ]);
        for project in &projects {
            let id = project.id.as_str();
            table.row(vec![
                session.display_id(id),
                project.title.clone(),
                or_dash(country_name(session, project)),
                session.store.contractors_for_project(id).len().to_string(),
                session.store.claims_for_project(id).len().to_string(),
                format_date(&project.created_at),
                project.id.to_string(),
            ]);
        }
        table
    })
}

fn country_name<'a>(session: &'a Session, project: &Project) -> Option<&'a str> {
    project
        .country_id
        .as_ref()
        .and_then(|c| session.store.country(c.as_str()))
        .map(|c| c.name.as_str())
}

/// Resolve a `--country` reference, or offer a picker when interactive
fn choose_country(
    session: &Session,
    reference: Option<&str>,
    interactive: bool,
) -> Result<Option<EntityId>> {
    if let Some(reference) = reference {
        let id = session.resolve(reference)?;
        return Ok(Some(EntityId::from(id)));
    }
    if !interactive {
        return Ok(None);
    }
    let options: Vec<(EntityId, String)> = session
        .store
        .countries()
        .iter()
        .map(|c| (c.id.clone(), c.name.clone()))
        .collect();
    pick_one("Country", &options)
}

async fn run_new(session: &mut Session, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let title = text_or_prompt(args.title, "Project title", args.interactive)?;
    let country_id = choose_country(session, args.country.as_deref(), args.interactive)?;

    if let Some(ref id) = country_id {
        if session.store.country(id.as_str()).is_none() {
            return Err(miette::miette!("No country found matching '{}'", id));
        }
    }

    let mut draft = ProjectDraft::new(title, country_id);
    draft.context_files = args.context_files;

    let project = session
        .store
        .add_project(draft)
        .await
        .map_err(|e| store_failure("project", e))?;

    let alias = session.alias(&project);
    session.save_short_ids()?;
    print_created(project.id.as_str(), &alias, &project.title, global)
}

fn run_show(session: &mut Session, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let project = session
        .store
        .project(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No project found matching '{}'", args.id))?;

    if print_serialized(&project, global.output)? {
        return Ok(());
    }
    if global.output == OutputFormat::Id {
        println!("{}", project.id);
        return Ok(());
    }

    let contractors: Vec<_> = session
        .store
        .contractors_for_project(&id)
        .into_iter()
        .cloned()
        .collect();
    let claims: Vec<_> = session
        .store
        .claims_for_project(&id)
        .into_iter()
        .cloned()
        .collect();
    let alias = session.alias(&project);
    session.remember(&contractors)?;
    session.remember(&claims)?;

    println!("{}", rule());
    field("ID", style(&project.id).cyan());
    field("Short", &alias);
    field("Title", style(&project.title).yellow());
    field(
        "Country",
        or_dash(country_name(session, &project)),
    );
    println!("{}", rule());

    println!();
    println!("{} ({}):", style("Contractors").bold(), contractors.len());
    for contractor in &contractors {
        println!(
            "  • {} {}",
            style(session.display_id(contractor.id.as_str())).cyan(),
            contractor.name
        );
    }

    println!();
    println!("{} ({}):", style("Claims").bold(), claims.len());
    for claim in &claims {
        let by = session
            .store
            .contractor(claim.contractor_id.as_str())
            .map(|c| c.name.as_str())
            .unwrap_or("unknown contractor");
        println!(
            "  • {} {} {}",
            style(session.display_id(claim.id.as_str())).cyan(),
            claim.title,
            style(format!("({})", by)).dim()
        );
    }

    if !project.context_files.is_empty() {
        println!();
        println!("{}:", style("Context files").bold());
        for file in &project.context_files {
            println!("  • {}", file.name);
        }
    }

    println!("{}", rule());
    field("Created", style(format_timestamp(&project.created_at)).dim());
    Ok(())
}

async fn run_edit(session: &mut Session, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let mut project = session
        .store
        .project(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No project found matching '{}'", args.id))?;

    if let Some(title) = args.title {
        project.title = title;
    }
    if let Some(country) = choose_country(session, args.country.as_deref(), false)? {
        if session.store.country(country.as_str()).is_none() {
            return Err(miette::miette!("No country found matching '{}'", country));
        }
        project.country_id = Some(country);
    }
    project
        .context_files
        .extend(attachment::from_paths(&args.add_context_files));

    let updated = session
        .store
        .update_project(project)
        .await
        .map_err(|e| store_failure("project", e))?;

    if global.output == OutputFormat::Id {
        println!("{}", updated.id);
    }
    Ok(())
}

async fn run_delete(session: &mut Session, args: DeleteArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let Some(project) = session.store.project(&id).cloned() else {
        println!("No project found matching '{}'; nothing to delete.", args.id);
        return Ok(());
    };

    let plan = CascadePlan::for_project(&id, session.store.contractors(), session.store.claims());
    println!(
        "Deleting {} will also affect:",
        style(&project.title).yellow()
    );
    println!(
        "  • {} {} removed",
        plan.contractors_to_delete.len(),
        plural(plan.contractors_to_delete.len(), "contractor", "contractors")
    );
    println!(
        "  • {} {} unlinked",
        plan.contractors_to_update.len(),
        plural(plan.contractors_to_update.len(), "contractor", "contractors")
    );
    println!(
        "  • {} {} removed",
        plan.claims_to_delete.len(),
        plural(plan.claims_to_delete.len(), "claim", "claims")
    );

    if !confirm("This cannot be undone. Continue?", args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let outcome = session
        .store
        .delete_project(&id)
        .await
        .map_err(|e| store_failure("project", e))?;

    if let Some(outcome) = outcome {
        if session.store.backend().cascade_authority() == CascadeAuthority::Server
            && !outcome.dependents_refreshed
        {
            eprintln!(
                "{} Contractors and claims could not be reloaded; run a list command to refresh.",
                style("!").yellow()
            );
        }
    }
    Ok(())
}
