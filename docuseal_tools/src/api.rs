use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::{json, Map, Value};

use crate::{
    config::DocuSealConfig,
    data_objects::{EnvelopeCreated, Signer},
    extract,
    DocuSealApiError,
};

#[derive(Clone)]
pub struct DocuSealApi {
    config: DocuSealConfig,
    client: Arc<Client>,
}

impl DocuSealApi {
    pub fn new(config: DocuSealConfig) -> Result<Self, DocuSealApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let key = config.api_key.reveal();
        let token =
            HeaderValue::from_str(key.as_str()).map_err(|e| DocuSealApiError::Initialization(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| DocuSealApiError::Initialization(e.to_string()))?;
        // Some instances authenticate with X-Auth-Token, others with a bearer token. Send both.
        headers.insert("X-Auth-Token", token);
        headers.insert("Authorization", bearer);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DocuSealApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Creates an envelope (submission) on the provider for the given signers and returns
    /// the envelope id and per-signer signing links.
    ///
    /// If the configured creation path returns 404, the call is retried once against the
    /// single well-known alternate path before failing. Other error statuses are surfaced
    /// as [`DocuSealApiError::QueryError`] and are not retried.
    pub async fn create_envelope(
        &self,
        template_id: &str,
        signers: &[Signer],
        variables: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> Result<EnvelopeCreated, DocuSealApiError> {
        if !self.config.is_configured() {
            return Err(DocuSealApiError::Configuration("api url or api key is missing".to_string()));
        }
        if template_id.trim().is_empty() {
            return Err(DocuSealApiError::Validation("template id is required".to_string()));
        }
        if signers.is_empty() {
            return Err(DocuSealApiError::Validation("at least one signer is required".to_string()));
        }
        if let Some(signer) = signers.iter().find(|s| s.email.trim().is_empty()) {
            return Err(DocuSealApiError::Validation(format!(
                "signer {} has a blank email",
                signer.role_or("unnamed")
            )));
        }

        let payload = build_payload(template_id, signers, variables, metadata);
        let url = self.config.url_for(&self.config.create_path);
        match self.do_create(&url, &payload).await {
            Err(DocuSealApiError::QueryError { status: 404, .. }) => {
                let alternate = alternate_create_path(&self.config.create_path);
                info!("Create path {} returned 404, retrying against {alternate}", self.config.create_path);
                self.do_create(&self.config.url_for(alternate), &payload).await
            },
            other => other,
        }
    }

    async fn do_create(&self, url: &str, payload: &Value) -> Result<EnvelopeCreated, DocuSealApiError> {
        trace!("Sending envelope creation request to {url}");
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DocuSealApiError::RequestError(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.text().await.map_err(|e| DocuSealApiError::ResponseError(e.to_string()))?;
        if !status.is_success() {
            return Err(DocuSealApiError::QueryError { status: status.as_u16(), message: raw });
        }
        trace!("Envelope creation response: status={status} body={raw}");
        // Tolerate a non-JSON 2xx body; the id may still arrive via a response header.
        let body: Value = serde_json::from_str(&raw).unwrap_or_else(|e| {
            debug!("Envelope creation response body is not JSON ({e}), relying on headers");
            Value::Null
        });

        let envelope_id = extract::envelope_id(&body, &headers);
        if envelope_id.is_none() {
            warn!("No envelope id found in creation response (status {status})");
        }
        let urls = extract::signing_urls(&body);
        let signing_url = extract::fallback_signing_url(&body).or_else(|| {
            urls.by_role.values().next().cloned().or_else(|| urls.by_email.values().next().cloned())
        });
        Ok(EnvelopeCreated { envelope_id, signing_url, urls, raw: body })
    }
}

/// Builds the creation payload with the field spread every supported provider version
/// understands. The apparent duplication (submitters/recipients/signers, template_id in two
/// spellings) is intentional compatibility with older API versions.
fn build_payload(
    template_id: &str,
    signers: &[Signer],
    variables: Map<String, Value>,
    metadata: Map<String, Value>,
) -> Value {
    let mut payload = Map::new();
    match template_id.parse::<i64>() {
        Ok(numeric) => payload.insert("template_id".to_string(), json!(numeric)),
        Err(_) => payload.insert("template_id".to_string(), json!(template_id)),
    };
    payload.insert("templateId".to_string(), json!(template_id));
    payload.insert("send_email".to_string(), json!(true));
    if !variables.is_empty() {
        payload.insert("variables".to_string(), Value::Object(variables));
    }
    if !metadata.is_empty() {
        payload.insert("metadata".to_string(), Value::Object(metadata));
    }

    let submitters = signers
        .iter()
        .enumerate()
        .map(|(i, signer)| {
            let mut entry = Map::new();
            entry.insert("role".to_string(), json!(signer.role_or(&format!("Signer {}", i + 1))));
            entry.insert("email".to_string(), json!(signer.email));
            if let Some(name) = signer.name.as_deref().filter(|n| !n.trim().is_empty()) {
                entry.insert("name".to_string(), json!(name));
            }
            entry.insert("routing_order".to_string(), json!(i + 1));
            Value::Object(entry)
        })
        .collect::<Vec<_>>();
    let recipients = submitters
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut entry = entry.as_object().cloned().unwrap_or_default();
            entry.remove("routing_order");
            entry.insert("order".to_string(), json!(i + 1));
            Value::Object(entry)
        })
        .collect::<Vec<_>>();
    // tenants expecting a single signer object get the first recipient
    if let Some(first) = recipients.first() {
        payload.insert("signer".to_string(), first.clone());
    }
    payload.insert("submitters".to_string(), json!(submitters));
    payload.insert("recipients".to_string(), json!(recipients));
    payload.insert("signers".to_string(), json!(recipients));
    Value::Object(payload)
}

fn alternate_create_path(configured: &str) -> &'static str {
    if configured.eq_ignore_ascii_case("/submissions") {
        "/api/envelopes"
    } else {
        "/submissions"
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn two_signers() -> Vec<Signer> {
        vec![
            Signer::new("First Party", "s@x.com", Some("Seller Sally".to_string())),
            Signer::new("Second Party", "b@x.com", None),
        ]
    }

    #[test]
    fn payload_spreads_signers_across_compat_keys() {
        let payload = build_payload("12", &two_signers(), Map::new(), Map::new());
        assert_eq!(payload["template_id"], json!(12));
        assert_eq!(payload["templateId"], json!("12"));
        assert_eq!(payload["send_email"], json!(true));
        assert_eq!(payload["submitters"].as_array().map(Vec::len), Some(2));
        assert_eq!(payload["recipients"].as_array().map(Vec::len), Some(2));
        assert_eq!(payload["signers"], payload["recipients"]);
        assert_eq!(payload["signer"]["email"], json!("s@x.com"));
        assert_eq!(payload["submitters"][0]["routing_order"], json!(1));
        assert_eq!(payload["recipients"][1]["order"], json!(2));
        // unnamed signers omit the name field rather than sending an empty string
        assert!(payload["submitters"][1].get("name").is_none());
    }

    #[test]
    fn non_numeric_template_id_is_sent_as_string() {
        let payload = build_payload("tpl-uuid", &two_signers(), Map::new(), Map::new());
        assert_eq!(payload["template_id"], json!("tpl-uuid"));
    }

    #[test]
    fn alternate_path_flips_between_known_endpoints() {
        assert_eq!(alternate_create_path("/submissions"), "/api/envelopes");
        assert_eq!(alternate_create_path("/api/envelopes"), "/submissions");
        assert_eq!(alternate_create_path("/custom"), "/submissions");
    }

    #[tokio::test]
    async fn create_envelope_validates_before_any_network_io() {
        let api = DocuSealApi::new(DocuSealConfig {
            api_key: csg_common::Secret::new("key".to_string()),
            ..Default::default()
        })
        .unwrap();
        let err = api.create_envelope("", &two_signers(), Map::new(), Map::new()).await.unwrap_err();
        assert!(matches!(err, DocuSealApiError::Validation(_)));
        let err = api.create_envelope("12", &[], Map::new(), Map::new()).await.unwrap_err();
        assert!(matches!(err, DocuSealApiError::Validation(_)));
        let blank_email = vec![Signer::new("First Party", " ", None)];
        let err = api.create_envelope("12", &blank_email, Map::new(), Map::new()).await.unwrap_err();
        assert!(matches!(err, DocuSealApiError::Validation(_)));
    }

    #[tokio::test]
    async fn create_envelope_requires_credentials() {
        let api = DocuSealApi::new(DocuSealConfig::default()).unwrap();
        let err = api.create_envelope("12", &two_signers(), Map::new(), Map::new()).await.unwrap_err();
        assert!(matches!(err, DocuSealApiError::Configuration(_)));
    }
}
