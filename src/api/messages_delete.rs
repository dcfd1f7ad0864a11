#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, ApiResponse };
use log::{error, info};

use crate::utils::errors::{Errors, HttpResult};
use crate::utils::kraken_utils::{self, RequestDebug};
use crate::utils::message_store::MessageStore;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct DeleteMessageApi {
    store: Arc<MessageStore>,
}

struct ReqDeleteMessage
{
    id: i64,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqDeleteMessage {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(64);
        s.push_str("  Request parameters:");
        s.push_str("\n    id: ");
        s.push_str(&self.id.to_string());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum KrakenResponse {
    #[oai(status = 204)]
    Http204,
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_400(msg: String) -> KrakenResponse {
    KrakenResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}
fn make_http_404(msg: String) -> KrakenResponse {
    KrakenResponse::Http404(Json(HttpResult::new(404.to_string(), msg)))
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
impl DeleteMessageApi {
    /// Remove a message.  Deleting a message that doesn't exist, including
    /// one that was already deleted, is a 404.
    #[oai(path = "/messages/:id", method = "delete")]
    async fn delete_message_api(&self, http_req: &Request,
                                #[oai(validator(minimum(value = "1")))] id: Path<i64>) -> KrakenResponse {
        let req = ReqDeleteMessage { id: id.0 };
        self.process(http_req, &req)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl DeleteMessageApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    fn process(&self, http_req: &Request, req: &ReqDeleteMessage) -> KrakenResponse {
        // Conditional logging depending on log level.
        kraken_utils::debug_request(http_req, req);

        match self.store.delete(req.id) {
            Ok(()) => {
                info!("Message {} deleted.", req.id);
                KrakenResponse::Http204
            }
            Err(e @ Errors::MessageNotFound(_)) => {
                let msg = e.to_string();
                info!("{}", msg);
                make_http_404(msg)
            }
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}
