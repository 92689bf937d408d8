//! Bridges the engine's [`SignatureGateway`] seam to the DocuSeal client crate.
use contract_engine::traits::{EnvelopeHandle, SignatureGateway, SignatureGatewayError, SignerInfo};
use docuseal_tools::{DocuSealApi, DocuSealApiError, DocuSealConfig, Signer};
use log::*;
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct DocuSealGateway {
    api: DocuSealApi,
}

impl DocuSealGateway {
    pub fn new(config: DocuSealConfig) -> Result<Self, SignatureGatewayError> {
        let api = DocuSealApi::new(config).map_err(|e| SignatureGatewayError::Configuration(e.to_string()))?;
        Ok(Self { api })
    }
}

impl SignatureGateway for DocuSealGateway {
    async fn create_envelope(
        &self,
        template_id: &str,
        signers: &[SignerInfo],
        variables: &Map<String, Value>,
        metadata: &Map<String, Value>,
    ) -> Result<EnvelopeHandle, SignatureGatewayError> {
        let signers = signers
            .iter()
            .map(|s| Signer::new(s.role.provider_role(), s.email.as_str(), s.name.clone()))
            .collect::<Vec<_>>();
        let created = self
            .api
            .create_envelope(template_id, &signers, variables.clone(), metadata.clone())
            .await
            .map_err(into_gateway_error)?;
        debug!(
            "✒️ DocuSeal envelope created. Id: {}, {} signing urls harvested",
            created.envelope_id.as_deref().unwrap_or("<none>"),
            created.urls.by_role.len() + created.urls.by_email.len()
        );
        Ok(EnvelopeHandle {
            envelope_id: created.envelope_id,
            urls_by_role: created.urls.by_role,
            urls_by_email: created.urls.by_email,
            fallback_url: created.signing_url,
        })
    }
}

fn into_gateway_error(e: DocuSealApiError) -> SignatureGatewayError {
    match e {
        DocuSealApiError::Configuration(msg) | DocuSealApiError::Initialization(msg) => {
            SignatureGatewayError::Configuration(msg)
        },
        DocuSealApiError::Validation(msg) => SignatureGatewayError::Validation(msg),
        DocuSealApiError::QueryError { status, message } => {
            SignatureGatewayError::Upstream { status, message }
        },
        DocuSealApiError::RequestError(msg) => SignatureGatewayError::Network(msg),
        DocuSealApiError::ResponseError(msg) | DocuSealApiError::JsonError(msg) => {
            SignatureGatewayError::Upstream { status: 502, message: format!("unreadable response: {msg}") }
        },
    }
}
