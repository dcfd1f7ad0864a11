#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Query, ApiResponse };
use log::info;

use crate::utils::errors::{Errors, HttpResult};
use crate::utils::greetings::{greet, RespGreeting};
use crate::utils::kraken_utils::{self, parse_bool, RequestDebug};

// Query parameter names.
const FORMAL_PARM : &str = "formal";

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct HelloApi {
    formal_default: bool,
}

struct ReqHello
{
    name: Option<String>,
    formal: Option<String>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqHello {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    name: {:?}\n    formal: {:?}", self.name, self.formal)
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
impl HelloApi {
    /// Return a greeting, formal when requested or when formal greetings are
    /// the configured default.  The formal parameter accepts true/false,
    /// 1/0, yes/no and on/off in any case.
    #[oai(path = "/hello", method = "get")]
    async fn hello_api(&self, http_req: &Request, name: Query<Option<String>>,
                       formal: Query<Option<String>>) -> KrakenResponse {
        let req = ReqHello { name: name.0, formal: formal.0 };
        self.process(http_req, &req)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl HelloApi {
    pub fn new(formal_default: bool) -> Self {
        Self { formal_default }
    }

    fn process(&self, http_req: &Request, req: &ReqHello) -> KrakenResponse {
        // Conditional logging depending on log level.
        kraken_utils::debug_request(http_req, req);

        let formal = match req.formal.as_deref() {
            None => None,
            Some(raw) => match parse_bool(raw) {
                Some(b) => Some(b),
                None => {
                    let msg = "ERROR: ".to_owned() +
                        Errors::InvalidQueryParm(FORMAL_PARM.to_string(), raw.to_string()).to_string().as_str();
                    info!("{}", msg);
                    return make_http_400(msg);
                }
            },
        };

        make_http_200(RespGreeting::new(greet(req.name.as_deref(), formal, self.formal_default)))
    }
}
