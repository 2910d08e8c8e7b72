//! Publishing new ECCU requests
//!
//! A [`PublishRequest`] targets one digital property. Its options decide
//! what goes into the `upload` message; see [`PublishRequest::request_body`]
//! for the exact element layout.

use tracing::{info, warn};

use crate::error::{EccuError, INVALID_DOMAIN_FAULT, Result, SoapError};
use crate::soap_body::SoapBody;
use crate::soap_client::SoapInvoker;

/// Property type used when none is given
pub const DEFAULT_PROPERTY_TYPE: &str = "hostheader";

/// Notes banner used when neither the caller nor the configuration supplies one
pub fn default_notes() -> String {
    format!("ECCU Request using eccu-client {}", env!("CARGO_PKG_VERSION"))
}

/// How the target property is matched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOptions {
    /// Classification of the property, `hostheader` when absent
    pub property_type: Option<String>,
    /// Exact name matching; only an absent flag means `true`
    pub exact_match: Option<bool>,
}

/// Per-request metadata rendered into the upload message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Rendered as an empty element when absent
    pub file_name: Option<String>,
    /// Rendered as an empty element when absent
    pub version: Option<String>,
    /// Replaced by the notes banner when absent
    pub notes: Option<String>,
    /// The email element is left out entirely when absent
    pub emails: Option<Vec<String>>,
}

impl RequestOptions {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        self.with_emails([email.into()])
    }

    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = Some(emails.into_iter().map(Into::into).collect());
        self
    }
}

/// A new ECCU request against a single digital property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    property_name: String,
    property_type: String,
    property_exact_match: bool,
    options: RequestOptions,
    default_notes: String,
}

impl PublishRequest {
    pub fn new(property_name: impl Into<String>, property: PropertyOptions) -> Self {
        Self {
            property_name: property_name.into(),
            property_type: property
                .property_type
                .unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string()),
            property_exact_match: property.exact_match.unwrap_or(true),
            options: RequestOptions::default(),
            default_notes: default_notes(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the banner used when no notes are given
    pub fn with_default_notes(mut self, notes: impl Into<String>) -> Self {
        self.default_notes = notes.into();
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn property_type(&self) -> &str {
        &self.property_type
    }

    pub fn property_exact_match(&self) -> bool {
        self.property_exact_match
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Build the `upload` message for `content`
    pub fn request_body(&self, content: &str) -> SoapBody {
        let options = &self.options;
        let mut body = SoapBody::new();

        body.string("filename", options.file_name.as_deref().unwrap_or(""))
            .text("contents", content)
            .string("versionString", options.version.as_deref().unwrap_or(""))
            .string(
                "notes",
                options.notes.as_deref().unwrap_or(&self.default_notes),
            );

        if let Some(emails) = &options.emails {
            body.string("statusChangeEmail", &emails.join(","));
        }

        body.string("propertyName", &self.property_name)
            .string("propertyType", &self.property_type)
            .boolean("propertyNameExactMatch", self.property_exact_match);

        body
    }

    /// Upload `content` and return the id the remote service assigned to it
    pub async fn execute(&self, invoker: &dyn SoapInvoker, content: &str) -> Result<u64> {
        let body = self.request_body(content);

        let response = invoker
            .call("upload", "upload", &body.to_xml())
            .await
            .map_err(|err| self.classify(err))?;

        let id = response
            .integer_at(&["upload_response", "file_id"])
            .ok_or_else(|| EccuError::unexpected("upload", "missing upload_response.file_id"))?;

        info!(id, property = %self.property_name, "ECCU request published");
        Ok(id)
    }

    fn classify(&self, err: SoapError) -> EccuError {
        let invalid_domain = err
            .fault_string()
            .is_some_and(|fault| fault.contains(INVALID_DOMAIN_FAULT));

        if invalid_domain {
            warn!(property = %self.property_name, "property rejected by remote service");
            return EccuError::InvalidDomain {
                property: self.property_name.clone(),
            };
        }

        EccuError::from_soap(err)
    }
}
