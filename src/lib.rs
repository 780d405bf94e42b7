pub mod client;
pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod index;
pub mod output;
pub mod rate;
pub mod record;
pub mod registry;
pub mod remote;
pub mod store;
pub mod text;

pub use client::Client;
pub use error::BiocycError;
pub use record::{Entry, Record};
