//! CLI runner - executes commands

use crate::auth::TokenCache;
use crate::cli::commands::{Cli, Commands, Overrides};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::http::WebApiClient;
use crate::models::AuditLog;
use crate::pagination::Paginator;
use crate::query::{query_url, FetchXmlBuilder};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
    started: Instant,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            started: Instant::now(),
        }
    }

    /// Time since the runner was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Export { config, overrides } => {
                let config = self.load_config(config.as_deref(), overrides)?;
                let records = self.export(&config).await?;
                write_preview(&mut std::io::stdout().lock(), &records, config.preview)?;
                Ok(())
            }
            Commands::FetchXml {
                last_days,
                page_size,
            } => {
                println!("{}", FetchXmlBuilder::audit_logs(*last_days, *page_size)?);
                Ok(())
            }
        }
    }

    fn load_config(&self, path: Option<&Path>, overrides: &Overrides) -> Result<ExportConfig> {
        let mut config = match path {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };
        overrides.apply(&mut config);
        config.validate()?;
        debug!(crm_url = %config.crm_url, tenant = %config.tenant, "Loaded configuration");
        Ok(config)
    }

    /// Fetch every audit record, reporting progress per page
    async fn export(&self, config: &ExportConfig) -> Result<Vec<AuditLog>> {
        let credentials = config.credentials()?;
        let authority = config.authority_host.clone();
        let cancel = CancellationToken::new();
        let client = WebApiClient::with_token_cache(config.http(), |http| {
            TokenCache::with_client(credentials, http).with_authority(authority)
        })?
        .with_cancellation(cancel.clone());

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling export");
                interrupt.cancel();
            }
        });

        let fetch_xml = FetchXmlBuilder::audit_logs(config.last_days, config.page_size)?;
        let first_page = query_url(
            &config.crm_url,
            &config.api_version,
            &config.entity_set,
            &fetch_xml,
        )?;

        let mut pager = Paginator::new(&client, first_page);
        let mut records = Vec::new();
        while pager.has_next() {
            println!(
                "{} Getting page #{} with no more than {} entries...",
                format_elapsed(self.elapsed()),
                pager.state().page + 1,
                config.page_size
            );
            let Some(batch) = pager.next_batch::<AuditLog>().await? else {
                break;
            };
            println!(
                "{} Received {} entries.",
                format_elapsed(self.elapsed()),
                batch.len()
            );
            records.extend(batch);
        }

        println!(
            "{} Finished! Received {} entries on {} pages.",
            format_elapsed(self.elapsed()),
            records.len(),
            pager.state().page
        );
        Ok(records)
    }
}

/// `First N items:` followed by one ` * record` line each
fn write_preview<W: Write>(out: &mut W, records: &[AuditLog], count: usize) -> std::io::Result<()> {
    writeln!(out, "First {count} items:")?;
    for record in records.iter().take(count) {
        writeln!(out, " * {record}")?;
    }
    Ok(())
}

/// `hh:mm:ss.fff`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        elapsed.subsec_millis()
    )
}
