pub mod config;
pub mod errors;
pub mod greetings;
pub mod kraken_utils;
pub mod message_store;
