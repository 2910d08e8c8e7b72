//! # eccu-client Library
//!
//! Builds, publishes and tracks ECCU (edge content control update) requests
//! against a CDN provider's SOAP service.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod publish;
pub mod request;
pub mod response;
pub mod service;
pub mod soap_body;
pub mod soap_client;

pub use cli::{Cli, Command, PublishArgs};
pub use config::{Config, ConfigManager, EnvProvider, SystemEnvProvider};
pub use error::{ConfigError, EccuError, Result, SoapError};
pub use output::EntryRenderer;
pub use publish::{PropertyOptions, PublishRequest, RequestOptions};
pub use request::{EccuRequest, PropertyInfo, RequestFile, RequestStatus};
pub use response::SoapResponse;
pub use service::EccuService;
pub use soap_body::{SoapBody, XsdType};
pub use soap_client::{HttpSoapInvoker, SoapClientConfig, SoapInvoker};
