#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use log::{error, info, warn};

use crate::utils::errors::HttpResult;
use crate::utils::kraken_utils::{self, RequestDebug};
use crate::utils::message_store::{Message, MessageStore};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct CreateMessageApi {
    store: Arc<MessageStore>,
}

/// New message.  Any id supplied by the client is ignored; the store assigns
/// the id.
#[derive(Object)]
pub struct ReqCreateMessage
{
    id: Option<i64>,
    content: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqCreateMessage {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    id: ");
        s.push_str(&format!("{:?}", self.id));
        s.push_str("\n    content: ");
        s.push_str(&self.content);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum KrakenResponse {
    #[oai(status = 201)]
    Http201(Json<Message>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_201(resp: Message) -> KrakenResponse {
    KrakenResponse::Http201(Json(resp))
}
fn make_http_400(msg: String) -> KrakenResponse {
    KrakenResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}
fn make_http_500(msg: String) -> KrakenResponse {
    KrakenResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

fn bad_request_handler(err: poem::Error) -> KrakenResponse {
    make_http_400("ERROR: ".to_owned() + err.to_string().as_str())
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl CreateMessageApi {
    /// Store a new message and return it with its assigned id.
    #[oai(path = "/messages", method = "post")]
    async fn create_message_api(&self, http_req: &Request, req: Json<ReqCreateMessage>) -> KrakenResponse {
        self.process(http_req, req.0)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl CreateMessageApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    fn process(&self, http_req: &Request, req: ReqCreateMessage) -> KrakenResponse {
        // Conditional logging depending on log level.
        kraken_utils::debug_request(http_req, &req);

        if let Some(id) = req.id {
            warn!("Ignoring client supplied id {} on message create.", id);
        }

        match self.store.create(req.content) {
            Ok(message) => {
                info!("Message {} created.", message.id);
                make_http_201(message)
            }
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}
