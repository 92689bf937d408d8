use std::time::Duration;

use csg_common::Secret;
use log::*;

const DEFAULT_API_URL: &str = "https://api.docuseal.com";
const DEFAULT_CREATE_PATH: &str = "/submissions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct DocuSealConfig {
    /// Base url of the DocuSeal instance, e.g. `https://api.docuseal.com`.
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Creation endpoint path. Defaults to the submissions API; can be overridden to
    /// `/api/envelopes` for older self-hosted instances.
    pub create_path: String,
    /// Upper bound on the provider round-trip. The request fails rather than block a
    /// handler thread indefinitely.
    pub timeout: Duration,
}

impl Default for DocuSealConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: Secret::default(),
            create_path: DEFAULT_CREATE_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DocuSealConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CSG_DOCUSEAL_API_URL").unwrap_or_else(|_| {
            warn!("CSG_DOCUSEAL_API_URL not set, using {DEFAULT_API_URL} as default");
            DEFAULT_API_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("CSG_DOCUSEAL_API_KEY").unwrap_or_else(|_| {
            warn!("CSG_DOCUSEAL_API_KEY not set. Envelope creation will fail until it is configured.");
            String::default()
        }));
        let create_path = std::env::var("CSG_DOCUSEAL_CREATE_PATH").unwrap_or_else(|_| {
            info!("CSG_DOCUSEAL_CREATE_PATH not set, using {DEFAULT_CREATE_PATH} as default");
            DEFAULT_CREATE_PATH.to_string()
        });
        let timeout = std::env::var("CSG_DOCUSEAL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for CSG_DOCUSEAL_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { api_url, api_key, create_path, timeout }
    }

    /// True when both a base url and an api key have been supplied.
    pub fn is_configured(&self) -> bool {
        !self.api_url.trim().is_empty() && !self.api_key.reveal().trim().is_empty()
    }

    /// Joins the base url and a path, tolerating stray slashes on either side.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
