#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::info;
use poem::listener::{Listener, RustlsCertificate, RustlsConfig, TcpListener};

use crate::api::build_app;
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;
use crate::utils::message_store::MessageStore;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "KrakenServer"; // for poem logging

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize Kraken -----------------
    // Announce ourselves.
    println!("Starting kraken_server!");

    // Read the configuration and start logging.
    let ctx = kraken_init()?;
    let config = &ctx.parms.config;

    // --------------- Main Loop Set Up ---------------
    // The store lives for the whole process and is handed to the handlers.
    let store = Arc::new(MessageStore::new());
    let app = build_app(config, store);

    let addr = format!("{}:{}", config.bind_addr, config.http_port);

    // ------------------ Main Loop -------------------
    match config.tls_files()? {
        Some((cert, key)) => {
            info!("Listening for https requests on {}.", addr);
            poem::Server::new(
                TcpListener::bind(addr).rustls(
                    RustlsConfig::new().fallback(
                        RustlsCertificate::new()
                            .key(std::fs::read(key)?)
                            .cert(std::fs::read(cert)?),
                    ),
                ),
            )
            .name(SERVER_NAME)
            .run(app)
            .await?;
        }
        None => {
            info!("Listening for http requests on {}.", addr);
            poem::Server::new(TcpListener::bind(addr))
                .name(SERVER_NAME)
                .run(app)
                .await?;
        }
    }

    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// kraken_init:
// ---------------------------------------------------------------------------
/** Read the command line and configuration, then initialize logging.  Any
 * failure here aborts startup.
 */
fn kraken_init() -> Result<RuntimeCtx> {
    let ctx = init_runtime_context()?;
    init_log(&ctx)?;

    info!("Using configuration file: {}", ctx.parms.config_file);
    info!("{}", Errors::InputParms(format!("{:#?}", ctx)));
    print_version_info();
    Ok(ctx)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running KRAKEN={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          env!("CARGO_PKG_VERSION"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"),
    );
}
