//! Translation from wire shapes to local records

use crate::api::types::{
    ClaimDetail, ClaimRead, ContextFileRead, ContractorDetail, ContractorRead, CountryDetail,
    CountryRead, ProjectDetail, ProjectRead,
};
use crate::core::identity::EntityId;
use crate::entities::{Attachment, Claim, Contractor, Country, Project};

impl From<ContextFileRead> for Attachment {
    fn from(file: ContextFileRead) -> Self {
        Attachment::stored(file.id, file.path)
    }
}

fn attachments(files: Vec<ContextFileRead>) -> Vec<Attachment> {
    files.into_iter().map(Attachment::from).collect()
}

impl From<CountryRead> for Country {
    fn from(c: CountryRead) -> Self {
        Country {
            id: EntityId::from(c.id),
            name: c.name,
            flag_url: c.flag_url.filter(|u| !u.is_empty()),
            created_at: c.created_at,
            context_files: Vec::new(),
        }
    }
}

impl From<CountryDetail> for Country {
    fn from(d: CountryDetail) -> Self {
        let mut country = Country::from(d.country);
        country.context_files = attachments(d.context_files);
        country
    }
}

impl From<ProjectRead> for Project {
    fn from(p: ProjectRead) -> Self {
        Project {
            id: EntityId::from(p.id),
            title: p.name,
            country_id: p.country_id.map(EntityId::from),
            created_at: p.created_at,
            context_files: Vec::new(),
        }
    }
}

impl From<ProjectDetail> for Project {
    fn from(d: ProjectDetail) -> Self {
        let mut project = Project::from(d.project);
        if project.country_id.is_none() {
            project.country_id = d.country.map(|c| EntityId::from(c.id));
        }
        project.context_files = attachments(d.context_files);
        project
    }
}

impl From<ContractorRead> for Contractor {
    fn from(c: ContractorRead) -> Self {
        Contractor {
            id: EntityId::from(c.id),
            name: c.name,
            created_at: c.created_at,
            project_ids: Vec::new(),
            context_files: Vec::new(),
        }
    }
}

impl From<ContractorDetail> for Contractor {
    fn from(d: ContractorDetail) -> Self {
        let mut contractor = Contractor::from(d.contractor);
        contractor.project_ids = d.projects.into_iter().map(|p| EntityId::from(p.id)).collect();
        contractor.context_files = attachments(d.context_files);
        contractor
    }
}

impl From<ClaimRead> for Claim {
    fn from(c: ClaimRead) -> Self {
        Claim {
            id: EntityId::from(c.id),
            title: c.name,
            created_at: c.created_at,
            contractor_id: EntityId::from(c.contractor_id),
            project_id: EntityId::from(c.project_id),
            claim_file: None,
            context_files: Vec::new(),
            included_project_context: false,
            included_contractor_context: false,
        }
    }
}

impl From<ClaimDetail> for Claim {
    fn from(d: ClaimDetail) -> Self {
        let mut claim = Claim::from(d.claim);
        claim.context_files = attachments(d.context_files);
        claim
    }
}
