#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, ApiResponse };
use serde_json::Value;
use log::{error, info};

use crate::utils::errors::{Errors, HttpResult};
use crate::utils::kraken_utils::{self, RequestDebug};
use crate::utils::message_store::{Message, MessageStore};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct PatchMessageApi {
    store: Arc<MessageStore>,
}

// The body is an arbitrary mapping of field overrides, so it stays untyped
// until the store merges it into the existing record.
struct ReqPatchMessage
{
    id: i64,
    patch: Value,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqPatchMessage {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    id: {}\n  Request body:\n    {}", self.id, self.patch)
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
    #[oai(status = 422)]
    Http422(Json<HttpResult>),
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
fn make_http_422(msg: String) -> KrakenResponse {
    KrakenResponse::Http422(Json(HttpResult::new(422.to_string(), msg)))
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
impl PatchMessageApi {
    /// Override only the fields present in the body.  The id of a message
    /// cannot be changed.
    #[oai(path = "/messages/:id", method = "patch")]
    async fn patch_message_api(&self, http_req: &Request,
                               #[oai(validator(minimum(value = "1")))] id: Path<i64>,
                               patch: Json<Value>) -> KrakenResponse {
        let req = ReqPatchMessage { id: id.0, patch: patch.0 };
        self.process(http_req, &req)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl PatchMessageApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    fn process(&self, http_req: &Request, req: &ReqPatchMessage) -> KrakenResponse {
        // Conditional logging depending on log level.
        kraken_utils::debug_request(http_req, req);

        let fields = match &req.patch {
            Value::Object(fields) => fields,
            other => {
                let msg = format!("ERROR: The patch for message {} must be a JSON object, got: {}", req.id, other);
                info!("{}", msg);
                return make_http_422(msg);
            }
        };

        match self.store.merge_patch(req.id, fields) {
            Ok(m) => {
                info!("Message {} patched.", m.id);
                make_http_200(m)
            }
            Err(e @ Errors::MessageNotFound(_)) => {
                let msg = e.to_string();
                info!("{}", msg);
                make_http_404(msg)
            }
            Err(e @ (Errors::IdentityChange(_, _) | Errors::InvalidMessage(_))) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                info!("{}", msg);
                make_http_422(msg)
            }
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}
