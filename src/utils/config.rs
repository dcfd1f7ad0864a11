#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::{env, fs};

use crate::utils::{errors::Errors, kraken_utils::{get_absolute_path, parse_bool}};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Configuration file location.
const ENV_KRAKEN_CONFIG_FILE : &str = "KRAKEN_CONFIG_FILE";
const DEFAULT_CONFIG_FILE    : &str = "~/.kraken/kraken.toml";

// Feature flag environment variables.
pub const ENV_FEATURE_GOODBYE         : &str = "FEATURE_GOODBYE";
pub const ENV_FEATURE_FORMAL_GREETING : &str = "FEATURE_FORMAL_GREETING";

// Networking.
const DEFAULT_HTTP_ADDR : &str = "http://localhost";
const DEFAULT_BIND_ADDR : &str = "0.0.0.0";
const DEFAULT_HTTP_PORT : u16  = 8000;

// Console logging when no log4rs file is configured.
const CONSOLE_LOG_PATTERN : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l}):5} {t} - {m}{n}";

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// KrakenArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, Default, Parser)]
#[command(name = "kraken_server", about = "Command line arguments for the Kraken Server.")]
pub struct KrakenArgs {
    /// Path of the TOML configuration file.
    ///
    /// The file is located using the following priority order:
    ///
    ///   1. If set, the value of the KRAKEN_CONFIG_FILE environment variable,
    ///
    ///   2. Otherwise, if set, the value of this argument,
    ///
    ///   3. Otherwise, ~/.kraken/kraken.toml
    ///
    /// A missing file means all default values are used.
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Path of a log4rs YAML configuration file.
    ///
    /// Overrides log_config_file in the configuration file.  When neither is
    /// set, log records go to the console at info level.
    #[arg(short, long)]
    pub log_config_file: Option<String>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
/// Everything resolved at startup.  Built once in main and passed down.
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub args: KrakenArgs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub bind_addr: String,
    pub http_port: u16,
    pub log_config_file: Option<String>,
    pub tls_cert_file: Option<String>,
    pub tls_key_file: Option<String>,
    pub features: FeatureFlags,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// The TLS certificate and key paths, if TLS is configured.  Setting only
    /// one of the two is an error.
    pub fn tls_files(&self) -> Result<Option<(String, String)>, Errors> {
        match (&self.tls_cert_file, &self.tls_key_file) {
            (Some(cert), Some(key)) => Ok(Some((get_absolute_path(cert), get_absolute_path(key)))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(Errors::TlsConfig("tls_cert_file is set but tls_key_file is not".to_string())),
            (None, Some(_)) => Err(Errors::TlsConfig("tls_key_file is set but tls_cert_file is not".to_string())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Kraken Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            log_config_file: None,
            tls_cert_file: None,
            tls_key_file: None,
            features: FeatureFlags::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureFlags:
// ---------------------------------------------------------------------------
/// Process-wide switches, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Serve the /goodbye endpoint.
    pub goodbye_enabled: bool,
    /// Greet formally even when the request doesn't ask for it.
    pub formal_greeting_default: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { goodbye_enabled: true, formal_greeting_default: false }
    }
}

impl FeatureFlags {
    /** Apply environment overrides.  The lookup function returns the raw
     * value of a variable if it is set; main passes a closure over
     * std::env so tests can supply their own.
     */
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Errors>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_FEATURE_GOODBYE) {
            self.goodbye_enabled = parse_flag(ENV_FEATURE_GOODBYE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_FEATURE_FORMAL_GREETING) {
            self.formal_greeting_default = parse_flag(ENV_FEATURE_FORMAL_GREETING, &raw)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// parse_flag:
// ---------------------------------------------------------------------------
/** Interpret a boolean switch.  Matching is case-insensitive and ignores
 * surrounding whitespace; anything unrecognized is an error rather than a
 * silent false.
 */
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, Errors> {
    parse_bool(raw).ok_or_else(|| Errors::InvalidFeatureFlag(name.to_string(), raw.to_string()))
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs.  A log configuration file named on the command line
 * takes precedence over one named in the configuration file.  Without
 * either, a console logger at info level is installed.
 */
pub fn init_log(ctx: &RuntimeCtx) -> Result<()> {
    let logconfig = ctx.args.log_config_file.as_ref().or(ctx.parms.config.log_config_file.as_ref());
    match logconfig {
        Some(file) => {
            let file = get_absolute_path(file);
            if let Err(e) = log4rs::init_file(&file, Default::default()) {
                println!("{}", e);
                return Err(anyhow!(Errors::Log4rsInitialization(file)));
            }
            info!("Log4rs initialized using: {}", file);
        }
        None => {
            init_console_log()?;
            info!("Log4rs initialized with console logging.");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init_console_log:
// ---------------------------------------------------------------------------
fn init_console_log() -> Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_config_file:
// ---------------------------------------------------------------------------
fn get_config_file(args: &KrakenArgs) -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --config-file argument
    //  3. Default location
    //
    let config_file = env::var(ENV_KRAKEN_CONFIG_FILE).unwrap_or_else(
        |_| {
            match args.config_file.clone() {
                Some(f) => f,
                None => DEFAULT_CONFIG_FILE.to_string(),
            }
        });

    get_absolute_path(&config_file)
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
/// Parse the TOML configuration text.  Keys that are absent take defaults.
pub fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c) => Ok(c),
        Err(e) => Err(anyhow!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e)),
    }
}

// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file and apply
 * the feature flag environment variables on top.  If the file can't be read
 * the default values are used.  Logging isn't initialized yet, so anything
 * worth reporting here goes to stdout.
 */
fn get_parms(args: &KrakenArgs) -> Result<Parms> {
    let config_file = get_config_file(args);
    println!("{}", Errors::ReadingConfigFile(config_file.clone()));

    let mut config = match fs::read_to_string(&config_file) {
        Ok(contents) => parse_config(&contents, &config_file)?,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            Config::new()
        }
    };

    config.features.apply_overrides(|name| env::var(name).ok())?;
    config.tls_files()?;

    Ok(Parms { config_file, config })
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> Result<RuntimeCtx> {
    let args = KrakenArgs::parse();
    let parms = get_parms(&args)?;
    Ok(RuntimeCtx { parms, args })
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::utils::config::{
        parse_config, parse_flag, Config, FeatureFlags, ENV_FEATURE_FORMAL_GREETING,
        ENV_FEATURE_GOODBYE,
    };
    use crate::utils::errors::Errors;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn default_flags() {
        let flags = Config::new().features;
        assert!(flags.goodbye_enabled);
        assert!(!flags.formal_greeting_default);
    }

    #[test]
    fn flag_values() {
        for raw in ["true", "True", " TRUE ", "1", "yes", "on"] {
            assert!(parse_flag("X", raw).unwrap(), "{}", raw);
        }
        for raw in ["false", "False", "0", "no", "off"] {
            assert!(!parse_flag("X", raw).unwrap(), "{}", raw);
        }
        assert!(matches!(parse_flag("X", "maybe"), Err(Errors::InvalidFeatureFlag(_, _))));
        assert!(matches!(parse_flag("X", ""), Err(Errors::InvalidFeatureFlag(_, _))));
    }

    #[test]
    fn env_overrides_flags() {
        let mut flags = FeatureFlags::default();
        flags
            .apply_overrides(lookup_from(&[(ENV_FEATURE_GOODBYE, "False"), (ENV_FEATURE_FORMAL_GREETING, "True")]))
            .unwrap();
        assert_eq!(flags, FeatureFlags { goodbye_enabled: false, formal_greeting_default: true });
    }

    #[test]
    fn unset_env_keeps_flags() {
        let mut flags = FeatureFlags { goodbye_enabled: false, formal_greeting_default: true };
        flags.apply_overrides(lookup_from(&[])).unwrap();
        assert_eq!(flags, FeatureFlags { goodbye_enabled: false, formal_greeting_default: true });
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut flags = FeatureFlags::default();
        let err = flags.apply_overrides(lookup_from(&[(ENV_FEATURE_GOODBYE, "sometimes")])).unwrap_err();
        assert!(err.to_string().contains(ENV_FEATURE_GOODBYE));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = parse_config("http_port = 9000\n[features]\nformal_greeting_default = true\n", "test.toml").unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.title, "Kraken Server");
        assert!(config.features.goodbye_enabled);
        assert!(config.features.formal_greeting_default);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(parse_config("http_port = \"not a port\"", "test.toml").is_err());
    }

    #[test]
    fn tls_needs_both_files() {
        let mut config = Config::new();
        assert!(config.tls_files().unwrap().is_none());

        config.tls_cert_file = Some("/certs/cert.pem".to_string());
        assert!(matches!(config.tls_files(), Err(Errors::TlsConfig(_))));

        config.tls_key_file = Some("/certs/key.pem".to_string());
        assert_eq!(
            config.tls_files().unwrap(),
            Some(("/certs/cert.pem".to_string(), "/certs/key.pem".to_string()))
        );
    }
}
