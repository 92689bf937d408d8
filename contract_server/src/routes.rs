//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this
//! module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the
//! current thread will cause the current worker to stop processing new requests. Any long,
//! non-cpu-bound operation (I/O, database and gateway calls) must therefore be expressed
//! as futures or asynchronous functions, which get executed concurrently by worker
//! threads.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use contract_engine::{
    traits::{ContractSigningDatabase, SignatureGateway},
    ContractFlowApi,
};
use log::*;

use crate::{data_objects::ContractSendRequest, errors::ServerError, helpers::acting_user_id};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Contracts  ----------------------------------------------------
route!(send_contract => Post "/send" impl ContractSigningDatabase, SignatureGateway);
/// Route handler for the contract send endpoint.
///
/// Creates (or resets) the draft contract for the given order, dispatches it to the
/// e-signature provider, and returns the stored contract including both signing urls.
/// The caller's user id must arrive in the `x-user-id` header; the auth layer upstream is
/// responsible for having verified it.
pub async fn send_contract<B, G>(
    req: HttpRequest,
    body: web::Json<ContractSendRequest>,
    api: web::Data<ContractFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: ContractSigningDatabase,
    G: SignatureGateway,
{
    let user_id = acting_user_id(&req)?;
    let request = body.into_inner();
    debug!("💻️ POST send contract for order #{} by user #{user_id}", request.order_id);
    let contract = api.create_draft_and_send(user_id, request.into_engine_request()).await?;
    Ok(HttpResponse::Ok().json(contract))
}

route!(contract_by_order => Get "/order/{order_id}" impl ContractSigningDatabase, SignatureGateway);
pub async fn contract_by_order<B, G>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<ContractFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: ContractSigningDatabase,
    G: SignatureGateway,
{
    let user_id = acting_user_id(&req)?;
    let order_id = path.into_inner();
    debug!("💻️ GET contract for order #{order_id} by user #{user_id}");
    let contract = api.contract_for_order(order_id).await?;
    Ok(HttpResponse::Ok().json(contract))
}
