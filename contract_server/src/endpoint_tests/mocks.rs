use chrono::Utc;
use contract_engine::{
    db_types::{Contract, ContractStatus, NewContract, PartyStatus, ReconciliationOutcome, WebhookEvent},
    traits::{
        ContractSigningDatabase,
        ContractStoreError,
        EnvelopeHandle,
        LookupError,
        OrderLookup,
        OrderSummary,
        SignatureGateway,
        SignatureGatewayError,
        SignerInfo,
        UserLookup,
        UserProfile,
    },
};
use mockall::mock;
use serde_json::{Map, Value};

mock! {
    pub ContractDb {}
    impl Clone for ContractDb {
        fn clone(&self) -> Self;
    }
    impl OrderLookup for ContractDb {
        async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSummary>, LookupError>;
    }
    impl UserLookup for ContractDb {
        async fn fetch_user(&self, user_id: i64) -> Result<Option<UserProfile>, LookupError>;
    }
    impl ContractSigningDatabase for ContractDb {
        fn url(&self) -> &str;
        async fn fetch_contract_by_order(&self, order_id: i64) -> Result<Option<Contract>, ContractStoreError>;
        async fn fetch_contract_by_envelope_id(&self, envelope_id: &str) -> Result<Option<Contract>, ContractStoreError>;
        async fn upsert_draft(&self, contract: NewContract) -> Result<Contract, ContractStoreError>;
        async fn attach_envelope(&self, order_id: i64, envelope: &EnvelopeHandle) -> Result<Contract, ContractStoreError>;
        async fn reconcile_event(&self, event: &WebhookEvent) -> Result<ReconciliationOutcome, ContractStoreError>;
    }
}

mock! {
    pub Gateway {}
    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }
    impl SignatureGateway for Gateway {
        async fn create_envelope(
            &self,
            template_id: &str,
            signers: &[SignerInfo],
            variables: &Map<String, Value>,
            metadata: &Map<String, Value>,
        ) -> Result<EnvelopeHandle, SignatureGatewayError>;
    }
}

pub const ORDER_ID: i64 = 42;
pub const SELLER_ID: i64 = 3;
pub const BUYER_ID: i64 = 2;

pub fn order_summary() -> OrderSummary {
    OrderSummary { order_id: ORDER_ID, buyer_id: BUYER_ID, seller_id: SELLER_ID, listing_id: 9 }
}

pub fn profile_for(user_id: i64) -> Option<UserProfile> {
    let (username, email) = match user_id {
        SELLER_ID => ("sally", "sally@sellers.test"),
        BUYER_ID => ("bob", "bob@buyers.test"),
        _ => return None,
    };
    Some(UserProfile {
        user_id,
        username: username.to_string(),
        email: email.to_string(),
        display_name: None,
        role: "MEMBER".to_string(),
    })
}

pub fn pending_contract() -> Contract {
    let now = Utc::now();
    Contract {
        id: 7,
        order_id: ORDER_ID,
        template_id: "12".to_string(),
        envelope_id: Some("env-7".to_string()),
        content: None,
        seller_email: "sally@sellers.test".to_string(),
        seller_name: None,
        seller_status: PartyStatus::Pending,
        seller_signing_url: Some("https://sign.test/env-7/seller".to_string()),
        seller_signed_at: None,
        buyer_email: "bob@buyers.test".to_string(),
        buyer_name: None,
        buyer_status: PartyStatus::Pending,
        buyer_signing_url: Some("https://sign.test/env-7/buyer".to_string()),
        buyer_signed_at: None,
        status: ContractStatus::PendingBoth,
        signed_file_url: None,
        signed_at: None,
        created_at: now,
        updated_at: now,
    }
}
