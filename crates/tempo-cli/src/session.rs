//! Command-scoped connection state: API client, runtime, and lookup cache.

use std::collections::HashMap;
use std::future::Future;

use anyhow::{Context, Result, bail};

use tempo_api::{Client, RecordQuery};
use tempo_core::hierarchy::{NodeSource, SourceError};
use tempo_core::{Catalog, Node, NodeId, RecordType, timeexpr};
use tokio::runtime::{Handle, Runtime};

use crate::Config;
use crate::cli::{Cli, QueryArgs};
use crate::output::OutputOptions;

/// Fetches node collections over the wire for the core catalog.
pub struct RemoteSource {
    client: Client,
    handle: Handle,
}

impl NodeSource for RemoteSource {
    fn load_projects(&mut self) -> Result<Vec<Node>, SourceError> {
        self.handle
            .block_on(self.client.projects())
            .map_err(SourceError::new)
    }

    fn load_folders(&mut self) -> Result<Vec<Node>, SourceError> {
        self.handle
            .block_on(self.client.folders())
            .map_err(SourceError::new)
    }

    fn load_record_types(&mut self) -> Result<Vec<RecordType>, SourceError> {
        self.handle
            .block_on(self.client.record_types())
            .map_err(SourceError::new)
    }
}

/// Everything a logged-in command needs: the API client, the runtime that
/// drives it, and the fill-once catalog of projects/folders/record types.
pub struct Session {
    runtime: Runtime,
    client: Client,
    pub catalog: Catalog<RemoteSource>,
}

impl Session {
    /// Builds the client from flags and config, then authenticates.
    ///
    /// A stored hash short-circuits the login request; otherwise the
    /// password is exchanged for one.
    pub fn connect(cli: &Cli, config: &Config) -> Result<Self> {
        let host = cli.host.clone().unwrap_or_else(|| config.host.clone());
        let https = cli.https || config.https;
        let user = cli.user.clone().or_else(|| config.user.clone());
        let hash = cli.hash.clone().or_else(|| config.hash.clone());

        let Some(user) = user else {
            bail!("a username and either a password or a hash are required");
        };

        let runtime = Runtime::new().context("failed to initialize tokio runtime")?;
        let mut client = Client::new(host, https).context("failed to build API client")?;

        if let Some(hash) = hash {
            client.set_credentials(user, hash);
        } else if let Some(password) = cli.password.as_deref() {
            runtime
                .block_on(client.login(&user, password))
                .context("login failed")?;
        } else {
            bail!("a username and either a password or a hash are required");
        }

        let source = RemoteSource {
            client: client.clone(),
            handle: runtime.handle().clone(),
        };
        Ok(Self {
            runtime,
            client,
            catalog: Catalog::new(source),
        })
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Drives one API call to completion.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Resolves record-query flags into wire-ready values: times through the
    /// expression parser, type and parent lists through the catalog.
    pub fn record_query(&mut self, args: &QueryArgs) -> Result<RecordQuery> {
        let mut query = RecordQuery::default();
        if let Some(from) = &args.from {
            query.time_from = Some(timeexpr::resolve_local(from)?);
        }
        if let Some(to) = &args.to {
            query.time_to = Some(timeexpr::resolve_local(to)?);
        }
        if let Some(types) = &args.type_filter {
            query.type_ids = Some(self.catalog.resolve_type_list(types)?);
        }
        if let Some(parents) = &args.parent {
            query.parent_ids = Some(self.catalog.resolve_parent_list(parents)?);
        }
        Ok(query)
    }

    /// Start/end argument of a new record; absent means the current instant.
    pub fn record_time(&self, text: Option<&str>) -> Result<i64> {
        match text {
            Some(text) => Ok(timeexpr::resolve_local(text)?),
            None => Ok(chrono::Utc::now().timestamp()),
        }
    }

    /// Project display names for record tables; empty when names are not
    /// wanted, so nothing is fetched.
    pub fn project_names(&mut self, options: &OutputOptions) -> Result<HashMap<NodeId, String>> {
        if options.ids || options.only_id {
            return Ok(HashMap::new());
        }
        Ok(self
            .catalog
            .projects()?
            .iter()
            .map(|n| (n.id, n.name.clone()))
            .collect())
    }

    /// Folder display names for the parent column of node tables.
    pub fn folder_names(&mut self, options: &OutputOptions) -> Result<HashMap<NodeId, String>> {
        if options.ids || options.only_id {
            return Ok(HashMap::new());
        }
        Ok(self
            .catalog
            .folders()?
            .iter()
            .map(|n| (n.id, n.name.clone()))
            .collect())
    }
}
