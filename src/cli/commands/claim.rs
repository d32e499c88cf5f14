//! `claimdesk claim` command - Claim management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{confirm, format_date, format_timestamp, pick_one, text_or_prompt};
use crate::cli::output::{field, print_created, print_list, print_serialized, rule, store_failure};
use crate::cli::session::Session;
use crate::cli::table::{or_dash, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::entities::{attachment, Attachment, Claim, ClaimDraft};

#[derive(Subcommand, Debug)]
pub enum ClaimCommands {
    /// List claims
    List(ListArgs),

    /// Create a new claim
    New(NewArgs),

    /// Show a claim
    Show(ShowArgs),

    /// Change a claim's fields
    Edit(EditArgs),

    /// Delete a claim
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only claims against this project (ID or PROJ@N)
    #[arg(long)]
    pub project: Option<String>,

    /// Only claims raised by this contractor (ID or CTR@N)
    #[arg(long)]
    pub contractor: Option<String>,

    /// Case-insensitive substring match on the title
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Claim title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Project the claim is raised against (ID or PROJ@N)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Contractor raising the claim (ID or CTR@N)
    #[arg(long, short = 'c')]
    pub contractor: Option<String>,

    /// The claim document
    #[arg(long)]
    pub claim_file: Option<PathBuf>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "context-file", short = 'f')]
    pub context_files: Vec<PathBuf>,

    /// Mark the project's context files as included
    #[arg(long)]
    pub include_project_context: bool,

    /// Mark the contractor's context files as included
    #[arg(long)]
    pub include_contractor_context: bool,

    /// Prompt for missing fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Claim ID or short ID (CLM@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Claim ID or short ID (CLM@N)
    pub id: String,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Move to another project (ID or PROJ@N)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Attribute to another contractor (ID or CTR@N)
    #[arg(long, short = 'c')]
    pub contractor: Option<String>,

    /// Replace the claim document
    #[arg(long)]
    pub claim_file: Option<PathBuf>,

    /// Supporting file to attach (repeatable)
    #[arg(long = "add-context-file")]
    pub add_context_files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Claim ID or short ID (CLM@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a claim subcommand
pub async fn run(cmd: ClaimCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global).await?;
    match cmd {
        ClaimCommands::List(args) => run_list(&mut session, args, global),
        ClaimCommands::New(args) => run_new(&mut session, args, global).await,
        ClaimCommands::Show(args) => run_show(&mut session, args, global),
        ClaimCommands::Edit(args) => run_edit(&mut session, args, global).await,
        ClaimCommands::Delete(args) => run_delete(&mut session, args).await,
    }
}

fn run_list(session: &mut Session, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut claims: Vec<Claim> = match args.project {
        Some(ref project) => {
            let project_id = session.resolve(project)?;
            session
                .store
                .claims_for_project(&project_id)
                .into_iter()
                .cloned()
                .collect()
        }
        None => session.store.claims().to_vec(),
    };

    if let Some(ref contractor) = args.contractor {
        let contractor_id = session.resolve(contractor)?;
        claims.retain(|c| c.contractor_id.as_str() == contractor_id);
    }
    if let Some(needle) = args.search.map(|s| s.to_lowercase()) {
        claims.retain(|c| c.title.to_lowercase().contains(&needle));
    }
    claims.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    if args.count {
        println!("{}", claims.len());
        return Ok(());
    }

    session.remember(&claims)?;
    let refs: Vec<&Claim> = claims.iter().collect();

    print_list(&refs, "claims", global.output, || {
        let mut table = Table::new(&[
            "SHORT",
            "TITLE",
            "PROJECT",
            "CONTRACTOR",
            "FILE",
            "CREATED",
            "ID",
        ]);
        for claim in &claims {
            table.row(vec![
                session.display_id(claim.id.as_str()),
                claim.title.clone(),
                or_dash(project_title(session, claim)),
                or_dash(contractor_name(session, claim)),
                or_dash(claim.claim_file.as_ref().map(|f| f.name.as_str())),
                format_date(&claim.created_at),
                claim.id.to_string(),
            ]);
        }
        table
    })
}

fn project_title<'a>(session: &'a Session, claim: &Claim) -> Option<&'a str> {
    session
        .store
        .project(claim.project_id.as_str())
        .map(|p| p.title.as_str())
}

fn contractor_name<'a>(session: &'a Session, claim: &Claim) -> Option<&'a str> {
    session
        .store
        .contractor(claim.contractor_id.as_str())
        .map(|c| c.name.as_str())
}

/// Resolve a relation reference and check it is loaded
fn resolve_loaded(
    session: &Session,
    reference: &str,
    kind: &str,
    exists: impl Fn(&str) -> bool,
) -> Result<EntityId> {
    let id = session.resolve(reference)?;
    if !exists(&id) {
        return Err(miette::miette!("No {} found matching '{}'", kind, reference));
    }
    Ok(EntityId::from(id))
}

async fn run_new(session: &mut Session, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let title = text_or_prompt(args.title, "Claim title", args.interactive)?;

    let project_id = match args.project {
        Some(ref reference) => Some(resolve_loaded(session, reference, "project", |id| {
            session.store.project(id).is_some()
        })?),
        None if args.interactive => {
            let options: Vec<(EntityId, String)> = session
                .store
                .projects()
                .iter()
                .map(|p| (p.id.clone(), p.title.clone()))
                .collect();
            pick_one("Project", &options)?
        }
        None => None,
    };

    let contractor_id = match args.contractor {
        Some(ref reference) => Some(resolve_loaded(session, reference, "contractor", |id| {
            session.store.contractor(id).is_some()
        })?),
        None if args.interactive => {
            // Offer only contractors working on the chosen project
            let candidates = match project_id {
                Some(ref p) => session.store.contractors_for_project(p.as_str()),
                None => session.store.contractors().iter().collect(),
            };
            let options: Vec<(EntityId, String)> = candidates
                .into_iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect();
            pick_one("Contractor", &options)?
        }
        None => None,
    };

    let claim_file = match args.claim_file {
        Some(path) => Some(path),
        None if args.interactive => {
            let path = text_or_prompt(None, "Claim file path", true)?;
            Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty())
        }
        None => None,
    };

    let draft = ClaimDraft {
        title,
        contractor_id,
        project_id,
        claim_file,
        context_files: args.context_files,
        included_project_context: args.include_project_context,
        included_contractor_context: args.include_contractor_context,
    };

    let claim = session
        .store
        .add_claim(draft)
        .await
        .map_err(|e| store_failure("claim", e))?;

    let alias = session.alias(&claim);
    session.save_short_ids()?;
    print_created(claim.id.as_str(), &alias, &claim.title, global)
}

fn run_show(session: &mut Session, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let claim = session
        .store
        .claim(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No claim found matching '{}'", args.id))?;

    if print_serialized(&claim, global.output)? {
        return Ok(());
    }
    if global.output == OutputFormat::Id {
        println!("{}", claim.id);
        return Ok(());
    }

    let alias = session.alias(&claim);
    session.save_short_ids()?;

    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("{}", rule());
    field("ID", style(&claim.id).cyan());
    field("Short", &alias);
    field("Title", style(&claim.title).yellow());
    field(
        "Project",
        format!(
            "{} {}",
            or_dash(project_title(session, &claim)),
            style(session.display_id(claim.project_id.as_str())).dim()
        ),
    );
    field(
        "Contractor",
        format!(
            "{} {}",
            or_dash(contractor_name(session, &claim)),
            style(session.display_id(claim.contractor_id.as_str())).dim()
        ),
    );
    println!("{}", rule());

    println!();
    field(
        "Claim file",
        or_dash(claim.claim_file.as_ref().map(|f| f.name.as_str())),
    );
    field(
        "Project context included",
        yes_no(claim.included_project_context),
    );
    field(
        "Contractor context included",
        yes_no(claim.included_contractor_context),
    );

    if !claim.context_files.is_empty() {
        println!();
        println!("{}:", style("Context files").bold());
        for file in &claim.context_files {
            println!("  • {}", file.name);
        }
    }

    println!("{}", rule());
    field("Created", style(format_timestamp(&claim.created_at)).dim());
    Ok(())
}

async fn run_edit(session: &mut Session, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let mut claim = session
        .store
        .claim(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("No claim found matching '{}'", args.id))?;

    if let Some(title) = args.title {
        claim.title = title;
    }
    if let Some(ref reference) = args.project {
        claim.project_id = resolve_loaded(session, reference, "project", |id| {
            session.store.project(id).is_some()
        })?;
    }
    if let Some(ref reference) = args.contractor {
        claim.contractor_id = resolve_loaded(session, reference, "contractor", |id| {
            session.store.contractor(id).is_some()
        })?;
    }
    if let Some(path) = args.claim_file {
        claim.claim_file = Some(Attachment::from_path(&path));
    }
    claim
        .context_files
        .extend(attachment::from_paths(&args.add_context_files));

    let updated = session
        .store
        .update_claim(claim)
        .await
        .map_err(|e| store_failure("claim", e))?;

    if global.output == OutputFormat::Id {
        println!("{}", updated.id);
    }
    Ok(())
}

async fn run_delete(session: &mut Session, args: DeleteArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let Some(claim) = session.store.claim(&id).cloned() else {
        println!("No claim found matching '{}'; nothing to delete.", args.id);
        return Ok(());
    };

    let prompt = format!("Delete claim {}? This cannot be undone.", claim.title);
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session
        .store
        .delete_claim(&id)
        .await
        .map_err(|e| store_failure("claim", e))?;
    Ok(())
}
