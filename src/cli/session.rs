//! Per-invocation state shared by all commands

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::api::ApiClient;
use crate::cli::GlobalOpts;
use crate::core::config::{BackendKind, Config};
use crate::core::entity::Entity;
use crate::core::shortid::ShortIdIndex;
use crate::notify::ConsoleNotifier;
use crate::store::{LocalBackend, RemoteBackend, Store};

/// Resolved configuration, a loaded store and the short ID index
pub struct Session {
    pub config: Config,
    pub store: Store,
    pub short_ids: ShortIdIndex,
}

impl Session {
    /// Load configuration, connect the backend and fetch every collection
    pub async fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load(global.config_overrides()).map_err(|e| miette::miette!("{}", e))?;
        let notifier = ConsoleNotifier::new(global.quiet);

        let mut store = match config.backend {
            BackendKind::Local => Store::new(LocalBackend::new(&config.data_dir), notifier),
            BackendKind::Remote => {
                let api = ApiClient::new(&config.api_url, config.timeout)
                    .map_err(|e| miette::miette!("{}", e))?;
                Store::new(RemoteBackend::new(api, config.page_size), notifier)
            }
        };

        let report = store.refresh().await;
        for failure in &report.failures {
            eprintln!(
                "{} Could not load {}: {}",
                style("!").yellow(),
                failure.collection,
                failure.message
            );
        }

        let short_ids = ShortIdIndex::load(&config.data_dir);

        Ok(Self {
            config,
            store,
            short_ids,
        })
    }

    /// Turn a `PREFIX@N` alias or a full id into a full id
    pub fn resolve(&self, reference: &str) -> Result<String> {
        self.short_ids
            .resolve(reference)
            .ok_or_else(|| miette::miette!("Unknown short ID '{}'; run a list command first", reference))
    }

    /// Assign aliases to listed records and persist the index
    pub fn remember<'a, T: Entity + 'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a T>,
    ) -> Result<()> {
        for item in items {
            self.short_ids.add(T::PREFIX, item.id().as_str());
        }
        self.save_short_ids()
    }

    /// Alias for an id, assigning one if needed
    pub fn alias<T: Entity>(&mut self, item: &T) -> String {
        self.short_ids.add(T::PREFIX, item.id().as_str())
    }

    pub fn save_short_ids(&self) -> Result<()> {
        self.short_ids.save(&self.config.data_dir).into_diagnostic()
    }

    /// Alias if one exists, else the full id
    pub fn display_id(&self, id: &str) -> String {
        self.short_ids
            .alias_for(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }
}
