use std::fmt::Debug;

use chrono::Utc;
use csg_common::helpers::first_non_blank;
use log::*;
use serde_json::{json, Map, Value};

use crate::{
    contract_api::{ContractFlowError, NewContractRequest},
    db_types::{Contract, ContractStatus, NewContract, PartyRole, ReconciliationOutcome, WebhookEvent},
    traits::{ContractSigningDatabase, OrderSummary, SignatureGateway, SignerInfo, UserProfile},
};

/// `ContractFlowApi` is the primary API for the contract signing lifecycle: creating and
/// dispatching signing envelopes for marketplace orders, reading contract state, and
/// folding provider webhook events back into it.
pub struct ContractFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for ContractFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContractFlowApi")
    }
}

impl<B, G> ContractFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B, G> ContractFlowApi<B, G>
where
    B: ContractSigningDatabase,
    G: SignatureGateway,
{
    /// Creates (or resets) the draft contract for an order, then dispatches it to the
    /// e-signature provider and stores the envelope id and signing urls.
    ///
    /// The acting user must be the order's buyer, its seller, or staff. If the order
    /// already has a contract with an attached envelope that has left `Draft`, that
    /// contract is returned unchanged rather than re-sent.
    pub async fn create_draft_and_send(
        &self,
        acting_user_id: i64,
        req: NewContractRequest,
    ) -> Result<Contract, ContractFlowError> {
        let order = self
            .db
            .fetch_order(req.order_id)
            .await?
            .ok_or_else(|| ContractFlowError::NotFound(format!("order {}", req.order_id)))?;
        let actor = self
            .db
            .fetch_user(acting_user_id)
            .await?
            .ok_or_else(|| ContractFlowError::Authorization(format!("unknown user {acting_user_id}")))?;
        if !(actor.is_staff() || acting_user_id == order.buyer_id || acting_user_id == order.seller_id) {
            warn!(
                "📝️🚫️ User #{acting_user_id} tried to send a contract for order #{} but is not a party to it",
                order.order_id
            );
            return Err(ContractFlowError::Authorization(format!(
                "user {acting_user_id} is not a party to order {}",
                order.order_id
            )));
        }

        let existing = self.db.fetch_contract_by_order(order.order_id).await?;
        if let Some(existing) = existing.as_ref() {
            if existing.envelope_id.is_some() && existing.status != ContractStatus::Draft {
                info!(
                    "📝️ Order #{} already has contract #{} in status {}. Not re-sending.",
                    order.order_id, existing.id, existing.status
                );
                return Ok(existing.clone());
            }
        }

        // A blank template id on a re-send falls back to the one already on file.
        let template_id =
            first_non_blank([Some(req.template_id.as_str()), existing.as_ref().map(|c| c.template_id.as_str())])
                .map(|t| t.trim().to_string())
                .ok_or_else(|| ContractFlowError::Validation("A template id is required".into()))?;

        let seller = self.resolve_party(order.seller_id, req.seller_email.as_deref()).await?;
        let buyer = self.resolve_party(order.buyer_id, req.buyer_email.as_deref()).await?;
        let new_contract = NewContract {
            order_id: order.order_id,
            template_id,
            content: req.content.clone(),
            seller_email: seller.0.clone(),
            seller_name: req.seller_name.clone().or(seller.1),
            buyer_email: buyer.0.clone(),
            buyer_name: req.buyer_name.clone().or(buyer.1),
        };
        let draft = self.db.upsert_draft(new_contract).await?;
        debug!("📝️ Draft contract #{} stored for order #{}", draft.id, draft.order_id);

        let signers = [
            SignerInfo {
                role: PartyRole::Seller,
                email: draft.seller_email.clone(),
                name: draft.seller_name.clone(),
            },
            SignerInfo { role: PartyRole::Buyer, email: draft.buyer_email.clone(), name: draft.buyer_name.clone() },
        ];
        let mut variables = req.variables.clone();
        if let Some(content) = draft.content.as_deref() {
            variables.entry("content".to_string()).or_insert_with(|| json!(content));
        }
        let metadata = enrich_metadata(req.metadata.clone(), &draft, &order, &actor);
        let envelope = self.gateway.create_envelope(&draft.template_id, &signers, &variables, &metadata).await?;
        let contract = self.db.attach_envelope(draft.order_id, &envelope).await?;
        info!(
            "📝️✉️ Contract #{} for order #{} dispatched. Envelope id: {}",
            contract.id,
            contract.order_id,
            contract.envelope_id.as_deref().unwrap_or("<none>")
        );
        Ok(contract)
    }

    /// The contract for the given order, or `NotFound`.
    pub async fn contract_for_order(&self, order_id: i64) -> Result<Contract, ContractFlowError> {
        self.db
            .fetch_contract_by_order(order_id)
            .await?
            .ok_or_else(|| ContractFlowError::NotFound(format!("contract for order {order_id}")))
    }

    /// Feeds one provider webhook event through reconciliation.
    ///
    /// This never fails from the caller's perspective. Storage errors are logged and
    /// reported as [`ReconciliationOutcome::NoMatch`] so webhook endpoints can always
    /// acknowledge the delivery.
    pub async fn process_webhook_event(&self, event: WebhookEvent) -> ReconciliationOutcome {
        if !event.has_locator() {
            debug!("🪝️ Webhook event carries neither envelope id nor participant email. Ignoring.");
            return ReconciliationOutcome::NoMatch;
        }
        match self.db.reconcile_event(&event).await {
            Ok(ReconciliationOutcome::Updated(contract)) => {
                info!(
                    "🪝️ Webhook reconciled against contract #{} (order #{}). Status is now {}.",
                    contract.id, contract.order_id, contract.status
                );
                ReconciliationOutcome::Updated(contract)
            },
            Ok(ReconciliationOutcome::NoMatch) => {
                info!(
                    "🪝️ No contract matched webhook event (envelope: {:?}, email: {:?}). Ignoring.",
                    event.envelope_id, event.participant_email
                );
                ReconciliationOutcome::NoMatch
            },
            Err(e) => {
                error!("🪝️ Storage failure while reconciling webhook event: {e}");
                ReconciliationOutcome::NoMatch
            },
        }
    }

    /// Resolves a party's email and display name: an explicit override wins, otherwise the
    /// user profile supplies both.
    async fn resolve_party(
        &self,
        user_id: i64,
        override_email: Option<&str>,
    ) -> Result<(String, Option<String>), ContractFlowError> {
        let profile = self.db.fetch_user(user_id).await?;
        let email = first_non_blank([override_email, profile.as_ref().map(|p| p.email.as_str())])
            .map(|e| e.trim().to_string())
            .ok_or_else(|| {
                ContractFlowError::Validation(format!("no signing email available for user {user_id}"))
            })?;
        let name = profile.as_ref().map(|p| p.signer_name().to_string());
        Ok((email, name))
    }
}

/// Caller metadata plus the identifiers the webhook handler may need to tie an event back
/// to this contract. Caller-supplied keys win.
fn enrich_metadata(
    mut metadata: Map<String, Value>,
    contract: &Contract,
    order: &OrderSummary,
    actor: &UserProfile,
) -> Map<String, Value> {
    let mut put = |key: &str, value: Value| {
        metadata.entry(key.to_string()).or_insert(value);
    };
    put("contract_id", json!(contract.id));
    put("order_id", json!(order.order_id));
    put("listing_id", json!(order.listing_id));
    put("seller_id", json!(order.seller_id));
    put("buyer_id", json!(order.buyer_id));
    put("seller_email", json!(contract.seller_email));
    put("buyer_email", json!(contract.buyer_email));
    put("seller_role", json!(PartyRole::Seller.provider_role()));
    put("buyer_role", json!(PartyRole::Buyer.provider_role()));
    put("initiated_by", json!(actor.user_id));
    put("generated_at", json!(Utc::now().to_rfc3339()));
    metadata
}
