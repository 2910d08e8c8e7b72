//! Shared helpers for integration tests: recorded SOAP fixtures and a
//! scripted in-memory invoker.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use eccu_client::soap_client::interpret_reply;
use eccu_client::{SoapError, SoapInvoker, SoapResponse};

/// Path of a recorded SOAP reply under `tests/fixtures/soap`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("soap")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", name, e))
}

/// One call observed by a [`ScriptedInvoker`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub message_tag: String,
    pub message: String,
}

/// Invoker replaying a fixed queue of replies and recording every call
#[derive(Default)]
pub struct ScriptedInvoker {
    replies: Mutex<VecDeque<Result<SoapResponse, SoapError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a recorded reply as the HTTP layer would see it
    pub fn reply_with_fixture(self, status: u16, name: &str) -> Self {
        let reply = interpret_reply(status, &fixture(name));
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn reply_with(self, response: SoapResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail_with(self, error: SoapError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn fail_with_status(self, status: u16) -> Self {
        self.fail_with(SoapError::Http {
            status,
            body: format!("HTTP {}", status),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl SoapInvoker for ScriptedInvoker {
    async fn call(
        &self,
        method: &str,
        message_tag: &str,
        message: &str,
    ) -> Result<SoapResponse, SoapError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            message_tag: message_tag.to_string(),
            message: message.to_string(),
        });

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SoapError::MalformedResponse(format!(
                "no scripted reply left for {}",
                method
            ))))
    }
}
