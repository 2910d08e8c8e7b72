use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{SoapError, SoapResult};
use crate::response::{Envelope, SoapResponse, parse_envelope};

/// Default ECCU SOAP endpoint
pub const DEFAULT_ENDPOINT: &str = "https://ccuapi.akamai.com/eccu-api/services/ECCUService";

/// Namespace of the ECCU service operations
pub const SERVICE_NAMESPACE: &str = "https://ccuapi.akamai.com/eccu-api/services/ECCUService";

/// Remote procedure invoker
///
/// `method` names the remote operation, `message_tag` is the element the
/// message is wrapped in, and `message` is the already serialised body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SoapInvoker: Send + Sync {
    async fn call(&self, method: &str, message_tag: &str, message: &str)
    -> SoapResult<SoapResponse>;
}

/// Configuration for the HTTP SOAP client
#[derive(Debug, Clone)]
pub struct SoapClientConfig {
    /// Service endpoint URL
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for SoapClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: 30,
            user_agent: format!("eccu-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Wrap a serialised message in a SOAP 1.1 envelope
pub fn envelope(message_tag: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<soapenv:Envelope \
xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" \
xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xmlns:eccu=\"{ns}\">\
<soapenv:Body><eccu:{tag}>{message}</eccu:{tag}></soapenv:Body>\
</soapenv:Envelope>",
        ns = SERVICE_NAMESPACE,
        tag = message_tag,
    )
}

/// SOAP invoker posting envelopes over HTTP with basic auth
pub struct HttpSoapInvoker {
    client: Client,
    config: SoapClientConfig,
}

impl HttpSoapInvoker {
    /// Create a new SOAP client with the given configuration
    pub fn new(config: SoapClientConfig) -> SoapResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(SoapError::from)?;

        Ok(Self { client, config })
    }

    /// Post the envelope and read the reply; the timeout covers both
    async fn make_request(&self, method: &str, envelope: String) -> SoapResult<(u16, String)> {
        let exchange = async {
            let response = self
                .client
                .post(&self.config.endpoint)
                .basic_auth(&self.config.username, Some(&self.config.password))
                .header("Content-Type", "text/xml;charset=UTF-8")
                .header("SOAPAction", format!("\"{}\"", method))
                .body(envelope)
                .send()
                .await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        timeout(Duration::from_secs(self.config.timeout_seconds), exchange)
            .await
            .map_err(|_| SoapError::Timeout {
                url: self.config.endpoint.clone(),
                timeout_seconds: self.config.timeout_seconds,
            })?
            .map_err(SoapError::from)
    }

    /// Get the client configuration
    pub fn config(&self) -> &SoapClientConfig {
        &self.config
    }
}

/// Turn an HTTP status and reply text into a response or a transport error.
/// A SOAP fault wins over the status code; servers usually send it with 500.
pub fn interpret_reply(status: u16, text: &str) -> SoapResult<SoapResponse> {
    let envelope = parse_envelope(text);

    match envelope {
        Ok(Envelope::Fault { code, string }) => Err(SoapError::Fault { code, string }),
        _ if !(200..300).contains(&status) => Err(SoapError::Http {
            status,
            body: text.to_string(),
        }),
        Ok(Envelope::Body(body)) => Ok(SoapResponse::new(body)),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl SoapInvoker for HttpSoapInvoker {
    async fn call(
        &self,
        method: &str,
        message_tag: &str,
        message: &str,
    ) -> SoapResult<SoapResponse> {
        debug!(
            method,
            message_tag,
            message_bytes = message.len(),
            endpoint = %self.config.endpoint,
            "invoking SOAP operation"
        );

        let (status, text) = self
            .make_request(method, envelope(message_tag, message))
            .await?;

        debug!(method, status, reply_bytes = text.len(), "SOAP reply received");
        interpret_reply(status, &text)
    }
}
