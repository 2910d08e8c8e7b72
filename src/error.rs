use thiserror::Error;

/// Fault string the remote service returns when the caller has no rights over a property
pub const INVALID_DOMAIN_FAULT: &str = "You are not authorized to specify this digital property.";

/// Fault string fragment the remote service uses for unknown request ids
pub const NOT_FOUND_FAULT: &str = "does not exist";

/// Transport-level failures raised by a [`crate::SoapInvoker`]
#[derive(Error, Debug)]
pub enum SoapError {
    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    #[error("SOAP fault ({code}): {string}")]
    Fault { code: String, string: String },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed SOAP response: {0}")]
    MalformedResponse(String),
}

impl SoapError {
    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SoapError::Http { status, .. } => Some(*status),
            SoapError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Fault string carried by the error, if it is a SOAP fault
    pub fn fault_string(&self) -> Option<&str> {
        match self {
            SoapError::Fault { string, .. } => Some(string),
            _ => None,
        }
    }
}

/// Domain errors surfaced by ECCU operations
#[derive(Error, Debug)]
pub enum EccuError {
    #[error("Unauthorized: login credentials were rejected")]
    Unauthorized,

    #[error("Not authorized to specify digital property: {property}")]
    InvalidDomain { property: String },

    #[error("ECCU request not found: {id}")]
    NotFound { id: u64 },

    /// Unclassified transport or application failure, kept verbatim
    #[error(transparent)]
    Soap(#[from] SoapError),

    #[error("Unexpected response to {operation}: {details}")]
    UnexpectedResponse { operation: String, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EccuError {
    /// Classification shared by every operation: 401 becomes [`EccuError::Unauthorized`],
    /// everything else passes through unchanged.
    pub fn from_soap(err: SoapError) -> Self {
        if err.status() == Some(401) {
            EccuError::Unauthorized
        } else {
            EccuError::Soap(err)
        }
    }

    /// Message shown to an operator instead of the raw error, for the known categories
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            EccuError::Unauthorized => Some("Your login credentials are invalid."),
            EccuError::InvalidDomain { .. } => Some(INVALID_DOMAIN_FAULT),
            _ => None,
        }
    }

    pub fn unexpected(operation: &str, details: impl Into<String>) -> Self {
        EccuError::UnexpectedResponse {
            operation: operation.to_string(),
            details: details.into(),
        }
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EccuError>;

/// Transport result type alias
pub type SoapResult<T> = std::result::Result<T, SoapError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_becomes_unauthorized() {
        let err = EccuError::from_soap(SoapError::Http {
            status: 401,
            body: String::new(),
        });
        assert!(matches!(err, EccuError::Unauthorized));
    }

    #[test]
    fn test_other_status_passes_through() {
        let err = EccuError::from_soap(SoapError::Http {
            status: 402,
            body: "payment required".to_string(),
        });

        match err {
            EccuError::Soap(SoapError::Http { status, body }) => {
                assert_eq!(status, 402);
                assert_eq!(body, "payment required");
            }
            other => panic!("Expected passthrough, got {:?}", other),
        }
    }

    #[test]
    fn test_fault_passes_through_with_display() {
        let err = EccuError::from_soap(SoapError::Fault {
            code: "soapenv:Server".to_string(),
            string: "Something broke".to_string(),
        });

        assert_eq!(err.to_string(), "SOAP fault (soapenv:Server): Something broke");
        assert!(err.user_message().is_none());
    }

    #[test]
    fn test_fault_string_accessor() {
        let fault = SoapError::Fault {
            code: "x".to_string(),
            string: "boom".to_string(),
        };
        assert_eq!(fault.fault_string(), Some("boom"));
        assert_eq!(fault.status(), None);

        let http = SoapError::Http {
            status: 500,
            body: String::new(),
        };
        assert_eq!(http.fault_string(), None);
        assert_eq!(http.status(), Some(500));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            EccuError::Unauthorized.user_message(),
            Some("Your login credentials are invalid.")
        );
        assert_eq!(
            EccuError::InvalidDomain {
                property: "foo.com".to_string()
            }
            .user_message(),
            Some("You are not authorized to specify this digital property.")
        );
        assert!(EccuError::NotFound { id: 1 }.user_message().is_none());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("username is required".to_string());
        assert!(err.to_string().contains("Configuration validation error"));
        assert!(err.to_string().contains("username is required"));

        let wrapped: EccuError = err.into();
        assert!(matches!(wrapped, EccuError::Config(_)));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = EccuError::Io(io_error);

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "File not found");
    }
}
