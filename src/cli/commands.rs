//! CLI commands and argument parsing

use crate::config::ExportConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Dynamics CRM audit-log exporter
#[derive(Parser, Debug)]
#[command(name = "dynamics-audit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export audit records page by page
    Export {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the initial FetchXML query
    FetchXml {
        /// Audit window in days
        #[arg(long, default_value = "30")]
        last_days: u32,

        /// Records per page
        #[arg(long, default_value = "200")]
        page_size: u32,
    },
}

/// Values that take precedence over the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// CRM instance URL
    #[arg(long)]
    pub crm_url: Option<String>,

    /// Tenant id or name
    #[arg(long)]
    pub tenant: Option<String>,

    /// Application (client) id
    #[arg(long)]
    pub client_id: Option<Uuid>,

    /// Client secret
    #[arg(long, env = "DYNAMICS_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Token authority base URL
    #[arg(long)]
    pub authority_host: Option<String>,

    /// Records per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Audit window in days
    #[arg(long)]
    pub last_days: Option<u32>,

    /// Records printed after the export
    #[arg(long)]
    pub preview: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    /// Apply every provided value onto `config`
    pub fn apply(&self, config: &mut ExportConfig) {
        if let Some(v) = &self.crm_url {
            config.crm_url.clone_from(v);
        }
        if let Some(v) = &self.tenant {
            config.tenant.clone_from(v);
        }
        if let Some(v) = self.client_id {
            config.client_id = Some(v);
        }
        if let Some(v) = &self.client_secret {
            config.client_secret.clone_from(v);
        }
        if let Some(v) = &self.authority_host {
            config.authority_host.clone_from(v);
        }
        if let Some(v) = self.page_size {
            config.page_size = v;
        }
        if let Some(v) = self.last_days {
            config.last_days = v;
        }
        if let Some(v) = self.preview {
            config.preview = v;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
    }
}
