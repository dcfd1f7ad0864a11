#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json };
use log::debug;

use crate::utils::kraken_utils::{self, RequestDebug};
use crate::utils::message_store::{Message, MessageStore};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ListMessagesApi {
    store: Arc<MessageStore>,
}

struct ReqListMessages;

impl RequestDebug for ReqListMessages {
    fn get_request_info(&self) -> String {
        "  * No Request Body".to_string()
    }
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListMessagesApi {
    /// Return every stored message in creation order.
    #[oai(path = "/messages", method = "get")]
    async fn list_messages_api(&self, http_req: &Request) -> Json<Vec<Message>> {
        kraken_utils::debug_request(http_req, &ReqListMessages);

        let messages = self.store.list();
        debug!("Listing {} message(s).", messages.len());
        Json(messages)
    }
}

impl ListMessagesApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }
}
