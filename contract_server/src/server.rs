use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use contract_engine::{ContractFlowApi, SqliteDatabase};
use log::info;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::docuseal::DocuSealGateway,
    routes::{health, ContractByOrderRoute, SendContractRoute},
    webhook::ContractWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = DocuSealGateway::new(config.docuseal.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: DocuSealGateway,
) -> Result<Server, ServerError> {
    info!("💻️ Contracts database: {}", config.database_url);
    let srv = HttpServer::new(move || {
        let contracts_api = ContractFlowApi::new(db.clone(), gateway.clone());
        let webhook_auth = config.webhook_auth.clone();
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("csg::access_log"))
            .app_data(web::Data::new(contracts_api))
            .app_data(web::Data::new(webhook_auth));
        let contracts_scope = web::scope("/contracts")
            .service(SendContractRoute::<SqliteDatabase, DocuSealGateway>::new())
            .service(ContractByOrderRoute::<SqliteDatabase, DocuSealGateway>::new())
            .service(ContractWebhookRoute::<SqliteDatabase, DocuSealGateway>::new());
        app.service(health).service(contracts_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
