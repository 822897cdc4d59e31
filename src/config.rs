//! Exporter configuration
//!
//! Settings are read from a YAML file and may be overridden from the
//! command line.
//!
//! ```yaml
//! crm_url: https://contoso.crm4.dynamics.com
//! tenant: contoso.onmicrosoft.com
//! client_id: 6f1c2a4e-0b7d-4d55-9a39-3f2e8c1d7b20
//! client_secret: ...
//! page_size: 200
//! last_days: 30
//! ```

use crate::auth::{Credentials, DEFAULT_AUTHORITY, DEFAULT_SCOPE};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

// ============================================================================
// Export Config
// ============================================================================

/// Complete exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// CRM instance URL, also the token resource
    #[serde(default)]
    pub crm_url: String,

    /// Tenant id or name
    #[serde(default)]
    pub tenant: String,

    /// Application (client) id
    #[serde(default)]
    pub client_id: Option<Uuid>,

    /// Client secret
    #[serde(default, skip_serializing)]
    pub client_secret: String,

    /// Requested scope
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Token authority base URL
    #[serde(default = "default_authority")]
    pub authority_host: String,

    /// Web API version segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Entity set queried
    #[serde(default = "default_entity_set")]
    pub entity_set: String,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Audit window in days
    #[serde(default = "default_last_days")]
    pub last_days: u32,

    /// Records printed after the export
    #[serde(default = "default_preview")]
    pub preview: usize,

    /// Optional request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_api_version() -> String {
    "v9.1".to_string()
}

fn default_entity_set() -> String {
    "audits".to_string()
}

fn default_page_size() -> u32 {
    200
}

fn default_last_days() -> u32 {
    30
}

fn default_preview() -> usize {
    5
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            crm_url: String::new(),
            tenant: String::new(),
            client_id: None,
            client_secret: String::new(),
            scope: default_scope(),
            authority_host: default_authority(),
            api_version: default_api_version(),
            entity_set: default_entity_set(),
            page_size: default_page_size(),
            last_days: default_last_days(),
            preview: default_preview(),
            timeout_secs: None,
        }
    }
}

impl ExportConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("crm_url", &self.crm_url),
            ("tenant", &self.tenant),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }
        if self.client_id.is_none() {
            return Err(Error::missing_field("client_id"));
        }

        check_http_url("crm_url", &self.crm_url)?;
        check_http_url("authority_host", &self.authority_host)?;

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.last_days == 0 {
            return Err(Error::invalid_value("last_days", "must be at least 1"));
        }
        Ok(())
    }

    /// Credentials for the token exchange, with the CRM URL as resource
    pub fn credentials(&self) -> Result<Credentials> {
        let client_id = self
            .client_id
            .ok_or_else(|| Error::missing_field("client_id"))?;
        Ok(
            Credentials::new(self.tenant.clone(), client_id, self.client_secret.clone())
                .with_resource(self.crm_url.clone())
                .with_scope(self.scope.clone()),
        )
    }

    /// HTTP client settings
    pub fn http(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

fn check_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r"
crm_url: https://contoso.crm4.dynamics.com
tenant: contoso.onmicrosoft.com
client_id: 6f1c2a4e-0b7d-4d55-9a39-3f2e8c1d7b20
client_secret: s3cret
page_size: 50
";

    #[test]
    fn test_defaults_applied() {
        let config = ExportConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.last_days, 30);
        assert_eq!(config.api_version, "v9.1");
        assert_eq!(config.entity_set, "audits");
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.authority_host, DEFAULT_AUTHORITY);
        assert!(config.timeout_secs.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_credentials_use_crm_url_as_resource() {
        let config = ExportConfig::from_yaml(YAML).unwrap();
        let creds = config.credentials().unwrap();
        assert_eq!(creds.resource(), "https://contoso.crm4.dynamics.com");
        assert_eq!(creds.tenant(), "contoso.onmicrosoft.com");
        assert_eq!(creds.client_secret(), "s3cret");
    }

    #[test]
    fn test_missing_fields() {
        let config = ExportConfig::default();
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::MissingConfigField { ref field } if field == "crm_url"
        ));

        let mut config = ExportConfig::from_yaml(YAML).unwrap();
        config.client_id = None;
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::MissingConfigField { ref field } if field == "client_id"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ExportConfig::from_yaml(YAML).unwrap();
        config.page_size = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::InvalidConfigValue { .. }
        ));

        let mut config = ExportConfig::from_yaml(YAML).unwrap();
        config.crm_url = "ftp://contoso".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::InvalidConfigValue { ref field, .. } if field == "crm_url"
        ));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            ExportConfig::from_yaml("client_id: not-a-uuid").unwrap_err(),
            Error::YamlParse(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = ExportConfig::load(file.path()).unwrap();
        assert_eq!(config.tenant, "contoso.onmicrosoft.com");

        let err = ExportConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = ExportConfig::from_yaml(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("s3cret"));
    }

    #[test]
    fn test_http_timeout() {
        let mut config = ExportConfig::default();
        assert!(config.http().timeout.is_none());
        config.timeout_secs = Some(45);
        assert_eq!(config.http().timeout, Some(Duration::from_secs(45)));
    }
}
