#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, param::Path, ApiResponse };
use log::{error, info};

use crate::utils::errors::{Errors, HttpResult};
use crate::utils::kraken_utils::{self, RequestDebug};
use crate::utils::message_store::{Message, MessageStore};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ReplaceMessageApi {
    store: Arc<MessageStore>,
}

/// Replacement message body.  The id always comes from the path.
#[derive(Object)]
pub struct ReqReplaceMessage
{
    id: Option<i64>,
    content: String,
}

// Request plus the path id it applies to.
struct ReplaceRequest
{
    id: i64,
    body: ReqReplaceMessage,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReplaceRequest {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    id: ");
        s.push_str(&self.id.to_string());
        s.push_str("\n  Request body:");
        s.push_str("\n    id: ");
        s.push_str(&format!("{:?}", self.body.id));
        s.push_str("\n    content: ");
        s.push_str(&self.body.content);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum KrakenResponse {
    #[oai(status = 200)]
    Http200(Json<Message>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: Message) -> KrakenResponse {
    KrakenResponse::Http200(Json(resp))
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
impl ReplaceMessageApi {
    /// Fully replace a message.  The stored record becomes the request body
    /// with the path id.
    #[oai(path = "/messages/:id", method = "put")]
    async fn replace_message_api(&self, http_req: &Request,
                                 #[oai(validator(minimum(value = "1")))] id: Path<i64>,
                                 req: Json<ReqReplaceMessage>) -> KrakenResponse {
        let req = ReplaceRequest { id: id.0, body: req.0 };
        self.process(http_req, req)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl ReplaceMessageApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    fn process(&self, http_req: &Request, req: ReplaceRequest) -> KrakenResponse {
        // Conditional logging depending on log level.
        kraken_utils::debug_request(http_req, &req);

        match self.store.replace(req.id, req.body.content) {
            Ok(m) => {
                info!("Message {} replaced.", m.id);
                make_http_200(m)
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
