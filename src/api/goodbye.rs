#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Query, ApiResponse };

use crate::utils::errors::HttpResult;
use crate::utils::greetings::{farewell, RespGreeting};
use crate::utils::kraken_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
/// Only registered when the goodbye feature is enabled.
pub struct GoodbyeApi;

struct ReqGoodbye
{
    name: Option<String>,
}

impl RequestDebug for ReqGoodbye {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    name: {:?}", self.name)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum KrakenResponse {
    #[oai(status = 200)]
    Http200(Json<RespGreeting>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
}

fn make_http_200(resp: RespGreeting) -> KrakenResponse {
    KrakenResponse::Http200(Json(resp))
}
fn make_http_400(msg: String) -> KrakenResponse {
    KrakenResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}

fn bad_request_handler(err: poem::Error) -> KrakenResponse {
    make_http_400("ERROR: ".to_owned() + err.to_string().as_str())
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GoodbyeApi {
    /// Return a farewell, addressed to "world" unless a name is given.
    #[oai(path = "/goodbye", method = "get")]
    async fn goodbye_api(&self, http_req: &Request, name: Query<Option<String>>) -> KrakenResponse {
        let req = ReqGoodbye { name: name.0 };
        kraken_utils::debug_request(http_req, &req);

        make_http_200(RespGreeting::new(farewell(req.name.as_deref())))
    }
}
