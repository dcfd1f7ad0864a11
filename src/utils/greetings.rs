#![forbid(unsafe_code)]

use poem_openapi::Object;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const INFORMAL_GREETING : &str = "Hello";
const FORMAL_GREETING   : &str = "Good day";
const FAREWELL          : &str = "Goodbye";
const DEFAULT_GREET_NAME    : &str = "Kraken";
const DEFAULT_FAREWELL_NAME : &str = "world";

// ***************************************************************************
//                              Response Types
// ***************************************************************************
/// Body shared by the greeting endpoints.
#[derive(Object, Debug)]
pub struct RespGreeting
{
    pub message: String,
}

impl RespGreeting {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// greet:
// ---------------------------------------------------------------------------
/** Build a greeting.  The greeting is formal when either the caller asks for
 * it or the service is configured to greet formally by default.  Missing or
 * empty names are replaced with "Kraken".
 */
pub fn greet(name: Option<&str>, formal: Option<bool>, formal_default: bool) -> String {
    let prefix = if formal.unwrap_or(false) || formal_default {FORMAL_GREETING} else {INFORMAL_GREETING};
    format!("{} {}", prefix, non_empty(name).unwrap_or(DEFAULT_GREET_NAME))
}

// ---------------------------------------------------------------------------
// farewell:
// ---------------------------------------------------------------------------
pub fn farewell(name: Option<&str>) -> String {
    format!("{} {}", FAREWELL, non_empty(name).unwrap_or(DEFAULT_FAREWELL_NAME))
}

// ***************************************************************************
//                            Private Functions
// ***************************************************************************
fn non_empty(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty())
}
