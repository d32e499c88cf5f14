//! `claimdesk contractor` command - Contractor management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    confirm, format_date, format_timestamp, pick_many, plural, text_or_prompt,
};
use crate::cli::output::{field, print_created, print_list, print_serialized, rule, store_failure};
use crate::cli::session::Session;
use crate::cli::table::{truncate_str, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::entities::attachment;
use crate::entities::{Contractor, ContractorDraft};
use crate::store::CascadePlan;

#[derive(Subcommand, Debug)]
pub enum ContractorCommands {
    /// List contractors
    List(ListArgs),

    /// Create a new contractor
    New(NewArgs),

    /// Show a contractor with its projects and claims
    Show(ShowArgs),

    /// Change a contractor's fields or project list
    Edit(EditArgs),

    /// Delete a contractor and every claim it raised
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only contractors working on this project (ID or PROJ@N)
    #[arg(long)]
    pub project: Option<String>,

    /// Case-insensitive substring match on the name
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Company name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Project the contractor works on (ID or PROJ@N, repeatable)
    #[arg(long = "project", short = 'p')]
    pub projects: Vec<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "context-file", short = 'f')]
    pub context_files: Vec<PathBuf>,

    /// Prompt for missing fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Contractor ID or short ID (CTR@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Contractor ID or short ID (CTR@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Add a project (repeatable)
    #[arg(long = "add-project")]
    pub add_projects: Vec<String>,

    /// Remove a project (repeatable)
    #[arg(long = "remove-project")]
    pub remove_projects: Vec<String>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "add-context-file")]
    pub add_context_files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Contractor ID or short ID (CTR@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a contractor subcommand
pub async fn run(cmd: ContractorCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global).await?;
    match cmd {
        ContractorCommands::List(args) => run_list(&mut session, args, global),
        ContractorCommands::New(args) => run_new(&mut session, args, global).await,
        ContractorCommands::Show(args) => run_show(&mut session, args, global),
        ContractorCommands::Edit(args) => run_edit(&mut session, args, global).await,
        ContractorCommands::Delete(args) => run_delete(&mut session, args).await,
    }
}

fn run_list(session: &mut Session, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut contractors: Vec<Contractor> = match args.project {
        Some(ref project) => {
            let project_id = session.resolve(project)?;
            session
                .store
                .contractors_for_project(&project_id)
                .into_iter()
                .cloned()
                .collect()
        }
        None => session.store.contractors().to_vec(),
    };

    if let Some(needle) = args.search.map(|s| s.to_lowercase()) {
        contractors.retain(|c| c.name.to_lowercase().contains(&needle));
    }
    contractors.sort_by_key(|c| c.name.to_lowercase());

    if args.count {
        println!("{}", contractors.len());
        return Ok(());
    }

    session.remember(&contractors)?;
    let refs: Vec<&Contractor> = contractors.iter().collect();

    print_list(&refs, "contractors", global.output, || {
        let mut table = Table::new(&["SHORT", "NAME", "PROJECTS", "CLAIMS", "CREATED", "ID"]);
        for contractor in &contractors {
            let id = contractor.id.as_str();
            let projects: Vec<&str> = session
                .store
                .projects_for_contractor(id)
                .into_iter()
                .map(|p| p.title.as_str())
                .collect();
            table.row(vec![
                session.display_id(id),
                contractor.name.clone(),
                truncate_str(&projects.join(", "), 40),
                session.store.claims_for_contractor(id).len().to_string(),
                format_date(&contractor.created_at),
                contractor.id.to_string(),
            ]);
        }
        table
    })
}

/// Resolve project references, checking each one is loaded
fn resolve_projects(session: &Session, references: &[String]) -> Result<Vec<EntityId>> {
    references
        .iter()
        .map(|reference| {
            let id = session.resolve(reference)?;
            if session.store.project(&id).is_none() {
                return Err(miette::miette!("No project found matching '{}'", reference));
            }
            Ok(EntityId::from(id))
        })
        .collect()
}

async fn run_new(session: &mut Session, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let name = text_or_prompt(args.name, "Contractor name", args.interactive)?;

    let project_ids = if args.projects.is_empty() && args.interactive {
        let options: Vec<(EntityId, String)> = session
            .store
            .projects()
            .iter()
            .map(|p| (p.id.clone(), p.title.clone()))
            .collect();
        pick_many("Projects", &options)?
    } else {
        resolve_projects(session, &args.projects)?
    };

    let mut draft = ContractorDraft::new(name, project_ids);
    draft.context_files = args.context_files;

    let contractor = session
        .store
        .add_contractor(draft)
        .await
        .map_err(|e| store_failure("contractor", e))?;

    let alias = session.alias(&contractor);
    session.save_short_ids()?;
    print_created(contractor.id.as_str(), &alias, &contractor.name, global)
}

fn run_show(session: &mut Session, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let contractor = session
        .store
        .contractor(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No contractor found matching '{}'", args.id))?;

    if print_serialized(&contractor, global.output)? {
        return Ok(());
    }
    if global.output == OutputFormat::Id {
        println!("{}", contractor.id);
        return Ok(());
    }

    let projects: Vec<_> = session
        .store
        .projects_for_contractor(&id)
        .into_iter()
        .cloned()
        .collect();
    let claims: Vec<_> = session
        .store
        .claims_for_contractor(&id)
        .into_iter()
        .cloned()
        .collect();
    let alias = session.alias(&contractor);
    session.remember(&projects)?;
    session.remember(&claims)?;

    println!("{}", rule());
    field("ID", style(&contractor.id).cyan());
    field("Short", &alias);
    field("Name", style(&contractor.name).yellow());
    println!("{}", rule());

    println!();
    println!("{} ({}):", style("Projects").bold(), projects.len());
    for project in &projects {
        println!(
            "  • {} {}",
            style(session.display_id(project.id.as_str())).cyan(),
            project.title
        );
    }
    let missing = contractor.project_ids.len().saturating_sub(projects.len());
    if missing > 0 {
        println!(
            "  {} {} {} not loaded",
            style("!").yellow(),
            missing,
            plural(missing, "project", "projects")
        );
    }

    println!();
    println!("{} ({}):", style("Claims").bold(), claims.len());
    for claim in &claims {
        println!(
            "  • {} {}",
            style(session.display_id(claim.id.as_str())).cyan(),
            claim.title
        );
    }

    if !contractor.context_files.is_empty() {
        println!();
        println!("{}:", style("Context files").bold());
        for file in &contractor.context_files {
            println!("  • {}", file.name);
        }
    }

    println!("{}", rule());
    field(
        "Created",
        style(format_timestamp(&contractor.created_at)).dim(),
    );
    Ok(())
}

async fn run_edit(session: &mut Session, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let mut contractor = session
        .store
        .contractor(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No contractor found matching '{}'", args.id))?;

    if let Some(name) = args.name {
        contractor.name = name;
    }
    for project in resolve_projects(session, &args.add_projects)? {
        if !contractor.works_on(project.as_str()) {
            contractor.project_ids.push(project);
        }
    }
    for reference in &args.remove_projects {
        let project = session.resolve(reference)?;
        contractor = contractor.without_project(&project);
    }
    contractor
        .context_files
        .extend(attachment::from_paths(&args.add_context_files));

    let updated = session
        .store
        .update_contractor(contractor)
        .await
        .map_err(|e| store_failure("contractor", e))?;

    if global.output == OutputFormat::Id {
        println!("{}", updated.id);
    }
    Ok(())
}

async fn run_delete(session: &mut Session, args: DeleteArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let Some(contractor) = session.store.contractor(&id).cloned() else {
        println!("No contractor found matching '{}'; nothing to delete.", args.id);
        return Ok(());
    };

    let plan = CascadePlan::for_contractor(&id, session.store.claims());
    let count = plan.claims_to_delete.len();
    let prompt = format!(
        "Delete {} and {} {}? This cannot be undone.",
        contractor.name,
        count,
        plural(count, "claim", "claims")
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session
        .store
        .delete_contractor(&id)
        .await
        .map_err(|e| store_failure("contractor", e))?;
    Ok(())
}
