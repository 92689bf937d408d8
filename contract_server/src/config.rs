use std::env;

use csg_common::Secret;
use docuseal_tools::DocuSealConfig;
use log::*;

const DEFAULT_CSG_HOST: &str = "127.0.0.1";
const DEFAULT_CSG_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// E-signature provider configuration, shared with the gateway crate.
    pub docuseal: DocuSealConfig,
    /// Optional shared-secret check on the webhook route.
    pub webhook_auth: WebhookAuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CSG_HOST.to_string(),
            port: DEFAULT_CSG_PORT,
            database_url: String::default(),
            docuseal: DocuSealConfig::default(),
            webhook_auth: WebhookAuthConfig::default(),
        }
    }
}

/// When both fields are configured, webhook deliveries must carry the header with exactly
/// the configured value. When either is unset, the check is disabled and the webhook is
/// open (matching policy is then the only protection).
#[derive(Clone, Debug, Default)]
pub struct WebhookAuthConfig {
    pub header_name: String,
    pub secret: Secret<String>,
}

impl WebhookAuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.header_name.trim().is_empty() && !self.secret.reveal().trim().is_empty()
    }

    pub fn from_env_or_default() -> Self {
        let header_name = env::var("CSG_WEBHOOK_HEADER_NAME").ok().unwrap_or_else(|| {
            info!("🪛️ CSG_WEBHOOK_HEADER_NAME is not set. Webhook shared-secret checks are disabled.");
            String::default()
        });
        let secret = env::var("CSG_WEBHOOK_HEADER_VALUE").ok().unwrap_or_else(|| {
            if !header_name.is_empty() {
                warn!(
                    "🪛️ CSG_WEBHOOK_HEADER_NAME is set but CSG_WEBHOOK_HEADER_VALUE is not. Webhook shared-secret \
                     checks are disabled."
                );
            }
            String::default()
        });
        Self { header_name, secret: Secret::new(secret) }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CSG_HOST").ok().unwrap_or_else(|| DEFAULT_CSG_HOST.into());
        let port = env::var("CSG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CSG_PORT. {e} Using the default, {DEFAULT_CSG_PORT}, instead."
                    );
                    DEFAULT_CSG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CSG_PORT);
        let database_url = env::var("CSG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CSG_DATABASE_URL is not set. Please set it to the URL for the contracts database.");
            String::default()
        });
        let docuseal = DocuSealConfig::new_from_env_or_default();
        let webhook_auth = WebhookAuthConfig::from_env_or_default();
        Self { host, port, database_url, docuseal, webhook_auth }
    }
}
