use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::PartyRole;

#[derive(Debug, Clone, Error)]
pub enum SignatureGatewayError {
    #[error("The signature gateway is not configured: {0}")]
    Configuration(String),
    #[error("Invalid envelope request: {0}")]
    Validation(String),
    #[error("The signature provider rejected the request. {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Could not reach the signature provider: {0}")]
    Network(String),
}

/// One signer in an envelope creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerInfo {
    pub role: PartyRole,
    pub email: String,
    pub name: Option<String>,
}

/// What the provider gave us back for a created envelope. Providers differ in how they
/// report signing urls, so both a by-role and a by-email index are carried, plus a single
/// fallback url for responses that only name one link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvelopeHandle {
    pub envelope_id: Option<String>,
    pub urls_by_role: HashMap<String, String>,
    pub urls_by_email: HashMap<String, String>,
    pub fallback_url: Option<String>,
}

impl EnvelopeHandle {
    /// The signing url for a party: by role first, then by the signer's email, then the
    /// fallback link.
    pub fn url_for(&self, role: PartyRole, email: &str) -> Option<&str> {
        self.urls_by_role
            .get(&role.provider_role().to_lowercase())
            .or_else(|| self.urls_by_email.get(&email.trim().to_lowercase()))
            .map(String::as_str)
            .or(self.fallback_url.as_deref())
    }
}

/// The e-signature provider seam. Implementations translate between the engine's signer
/// model and the provider's wire format.
#[allow(async_fn_in_trait)]
pub trait SignatureGateway {
    /// Creates an envelope for the given document template and signers, dispatching
    /// signature request emails as a side effect.
    ///
    /// `variables` is substituted into the template; `metadata` travels with the envelope
    /// and comes back on webhooks where the provider supports it.
    async fn create_envelope(
        &self,
        template_id: &str,
        signers: &[SignerInfo],
        variables: &serde_json::Map<String, serde_json::Value>,
        metadata: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<EnvelopeHandle, SignatureGatewayError>;
}
