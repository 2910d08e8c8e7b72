use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::publish::{PropertyOptions, PublishRequest, RequestOptions};
use crate::request::EccuRequest;
use crate::soap_client::{HttpSoapInvoker, SoapClientConfig, SoapInvoker};

/// Entry point bundling an invoker with the configured publishing defaults
#[derive(Clone)]
pub struct EccuService {
    invoker: Arc<dyn SoapInvoker>,
    default_notes: String,
    default_property_type: String,
}

impl EccuService {
    pub fn new(
        invoker: Arc<dyn SoapInvoker>,
        default_notes: impl Into<String>,
        default_property_type: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            default_notes: default_notes.into(),
            default_property_type: default_property_type.into(),
        }
    }

    /// Build a service talking HTTP to the configured endpoint
    pub fn from_config(config: &Config) -> Result<Self> {
        let invoker = HttpSoapInvoker::new(SoapClientConfig::from(config))?;
        Ok(Self::new(
            Arc::new(invoker),
            config.publish.default_notes.clone(),
            config.publish.property_type.clone(),
        ))
    }

    pub fn invoker(&self) -> &dyn SoapInvoker {
        self.invoker.as_ref()
    }

    /// Prepare a publish request carrying this service's defaults
    pub fn publish_request(
        &self,
        property_name: &str,
        mut property: PropertyOptions,
        options: RequestOptions,
    ) -> PublishRequest {
        if property.property_type.is_none() {
            property.property_type = Some(self.default_property_type.clone());
        }
        PublishRequest::new(property_name, property)
            .with_default_notes(self.default_notes.clone())
            .with_options(options)
    }

    pub async fn publish(
        &self,
        property_name: &str,
        content: &str,
        property: PropertyOptions,
        options: RequestOptions,
    ) -> Result<u64> {
        self.publish_request(property_name, property, options)
            .execute(self.invoker(), content)
            .await
    }

    /// Read `path` and publish it; the file name defaults to the path's file name
    pub async fn publish_file(
        &self,
        property_name: &str,
        path: &Path,
        property: PropertyOptions,
        mut options: RequestOptions,
    ) -> Result<u64> {
        let content = tokio::fs::read_to_string(path).await?;
        if options.file_name.is_none() {
            options.file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }

        debug!(path = %path.display(), bytes = content.len(), "publishing ECCU file");
        self.publish(property_name, &content, property, options).await
    }

    pub async fn all(&self, verbose: bool) -> Result<Vec<EccuRequest>> {
        EccuRequest::all(self.invoker(), verbose).await
    }

    pub async fn last(&self, verbose: bool) -> Result<Option<EccuRequest>> {
        EccuRequest::last(self.invoker(), verbose).await
    }

    pub async fn find(&self, id: u64, verbose: bool) -> Result<EccuRequest> {
        EccuRequest::find(self.invoker(), id, verbose).await
    }

    pub async fn destroy(&self, id: u64) -> Result<bool> {
        EccuRequest::destroy(self.invoker(), id).await
    }

    pub async fn update_notes(&self, id: u64, notes: &str) -> Result<bool> {
        EccuRequest::update_notes(self.invoker(), id, notes).await
    }

    pub async fn update_email(&self, id: u64, email: &str) -> Result<bool> {
        EccuRequest::update_email(self.invoker(), id, email).await
    }
}
