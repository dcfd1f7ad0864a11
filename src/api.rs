#![forbid(unsafe_code)]

use std::sync::Arc;

use log::info;
use poem::Route;
use poem_openapi::{OpenApi, OpenApiService};

use crate::api::goodbye::GoodbyeApi;
use crate::api::hello::HelloApi;
use crate::api::messages_create::CreateMessageApi;
use crate::api::messages_delete::DeleteMessageApi;
use crate::api::messages_get::GetMessageApi;
use crate::api::messages_list::ListMessagesApi;
use crate::api::messages_patch::PatchMessageApi;
use crate::api::messages_replace::ReplaceMessageApi;
use crate::utils::config::Config;
use crate::utils::message_store::MessageStore;

pub mod goodbye;
pub mod hello;
pub mod messages_create;
pub mod messages_delete;
pub mod messages_get;
pub mod messages_list;
pub mod messages_patch;
pub mod messages_replace;

#[cfg(test)]
mod tests;

// From cargo.toml.
const KRAKEN_VERSION: &str = env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                              Route Assembly
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble the complete route table.  Which endpoints exist is decided here,
 * once, from the feature flags: with goodbye disabled the /goodbye API is
 * never registered and requests for it get the router's 404.
 */
pub fn build_app(config: &Config, store: Arc<MessageStore>) -> Route {
    let server_url = format!("{}:{}", config.http_addr, config.http_port);

    let hello = HelloApi::new(config.features.formal_greeting_default);
    let messages = (
        ListMessagesApi::new(Arc::clone(&store)),
        GetMessageApi::new(Arc::clone(&store)),
        CreateMessageApi::new(Arc::clone(&store)),
        ReplaceMessageApi::new(Arc::clone(&store)),
        PatchMessageApi::new(Arc::clone(&store)),
        DeleteMessageApi::new(store),
    );

    if config.features.goodbye_enabled {
        info!("Registering the /goodbye endpoint.");
        mount(OpenApiService::new((hello, GoodbyeApi, messages), &config.title, KRAKEN_VERSION)
            .server(server_url))
    } else {
        info!("The /goodbye endpoint is disabled by configuration.");
        mount(OpenApiService::new((hello, messages), &config.title, KRAKEN_VERSION)
            .server(server_url))
    }
}

// ---------------------------------------------------------------------------
// mount:
// ---------------------------------------------------------------------------
// Serve the api at the root along with its generated documentation.
fn mount<T>(api_service: OpenApiService<T, ()>) -> Route
where
    T: OpenApi + Send + Sync + 'static,
{
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .at("/openapi.json", spec)
        .at("/openapi.yaml", spec_yaml)
        .nest("/", api_service)
}
