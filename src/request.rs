//! ECCU request records
//!
//! The remote service is the only source of truth: every lookup goes back
//! to it, and records are plain snapshots of what it returned.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EccuError, NOT_FOUND_FAULT, Result, SoapError};
use crate::response::{SoapResponse, as_bool, as_integer, as_list, as_string};
use crate::soap_body::SoapBody;
use crate::soap_client::SoapInvoker;

/// Processing status of a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub code: Option<u64>,
    pub message: Option<String>,
    pub extended: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFile {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub md5: Option<String>,
    /// Only present when the record was fetched verbosely
    pub content: Option<String>,
}

/// Targeted digital property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: Option<String>,
    pub property_type: Option<String>,
    pub exact_match: bool,
}

/// Snapshot of one ECCU request as reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EccuRequest {
    pub id: u64,
    pub status: RequestStatus,
    pub file: RequestFile,
    pub property: PropertyInfo,
    pub notes: Option<String>,
    pub email: Option<String>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

fn text(info: &Value, key: &str) -> Option<String> {
    info.get(key).and_then(as_string)
}

fn timestamp(info: &Value, key: &str) -> Option<DateTime<Utc>> {
    info.get(key)
        .and_then(as_string)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decode base64 file contents, keeping the raw value when it is not base64
fn decode_contents(raw: String) -> String {
    let compact: String = raw.split_whitespace().collect();
    STANDARD
        .decode(compact.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or(raw)
}

impl EccuRequest {
    /// Build a record from an `eccu_info` response mapping
    pub fn from_info(id: u64, info: &Value, verbose: bool) -> Self {
        let content = if verbose {
            text(info, "contents").map(decode_contents)
        } else {
            None
        };

        Self {
            id: info.get("file_id").and_then(as_integer).unwrap_or(id),
            status: RequestStatus {
                code: info.get("status_code").and_then(as_integer),
                message: text(info, "status_message"),
                extended: text(info, "extended_status_message"),
                updated_at: timestamp(info, "status_update_date"),
            },
            file: RequestFile {
                name: text(info, "filename"),
                size: info.get("file_size").and_then(as_integer),
                md5: text(info, "file_md5"),
                content,
            },
            property: PropertyInfo {
                name: text(info, "property_name"),
                property_type: text(info, "property_type"),
                exact_match: info
                    .get("property_name_exact_match")
                    .and_then(as_bool)
                    .unwrap_or(false),
            },
            notes: text(info, "notes"),
            email: text(info, "status_change_email"),
            uploaded_by: text(info, "uploaded_by"),
            uploaded_at: timestamp(info, "upload_date"),
            version: text(info, "version_string"),
        }
    }

    /// Ids of all requests known to the remote service, in remote order
    pub async fn all_ids(invoker: &dyn SoapInvoker) -> Result<Vec<u64>> {
        let response = invoker
            .call("getIds", "getIds", "")
            .await
            .map_err(EccuError::from_soap)?;

        let ids = match response.get(&["get_ids_response", "file_ids"]) {
            None => return Ok(Vec::new()),
            // SOAP-encoded arrays nest their items under the same name
            Some(list) => list.get("file_ids").unwrap_or(list),
        };

        as_list(ids)
            .into_iter()
            .map(|value| {
                as_integer(value).ok_or_else(|| {
                    EccuError::unexpected("getIds", format!("invalid file id: {}", value))
                })
            })
            .collect()
    }

    /// Every request, one `getInfo` call per id
    pub async fn all(invoker: &dyn SoapInvoker, verbose: bool) -> Result<Vec<EccuRequest>> {
        let ids = Self::all_ids(invoker).await?;
        debug!(count = ids.len(), verbose, "fetching ECCU request details");

        let mut requests = Vec::with_capacity(ids.len());
        for id in ids {
            requests.push(Self::find(invoker, id, verbose).await?);
        }
        Ok(requests)
    }

    /// Most recent request, `None` when there are none
    pub async fn last(invoker: &dyn SoapInvoker, verbose: bool) -> Result<Option<EccuRequest>> {
        match Self::all_ids(invoker).await?.last() {
            Some(&id) => Self::find(invoker, id, verbose).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn find(invoker: &dyn SoapInvoker, id: u64, verbose: bool) -> Result<EccuRequest> {
        let mut body = SoapBody::new();
        body.integer("fileId", id).boolean("retrieveContents", verbose);

        let response = call_for_id(invoker, "getInfo", id, &body).await?;
        let info = response
            .get(&["get_info_response", "eccu_info"])
            .ok_or(EccuError::NotFound { id })?;

        Ok(Self::from_info(id, info, verbose))
    }

    /// Delete a request; returns the remote success flag
    pub async fn destroy(invoker: &dyn SoapInvoker, id: u64) -> Result<bool> {
        let mut body = SoapBody::new();
        body.integer("fileId", id);

        let response = call_for_id(invoker, "delete", id, &body).await?;
        success_flag(&response, "delete", "delete_response")
    }

    /// Replace the notes of a request
    pub async fn update_notes(invoker: &dyn SoapInvoker, id: u64, notes: &str) -> Result<bool> {
        let mut body = SoapBody::new();
        body.integer("fileId", id).string("notes", notes);

        let response = call_for_id(invoker, "setNotes", id, &body).await?;
        success_flag(&response, "setNotes", "set_notes_response")
    }

    /// Replace the status-change email of a request
    pub async fn update_email(invoker: &dyn SoapInvoker, id: u64, email: &str) -> Result<bool> {
        let mut body = SoapBody::new();
        body.integer("fileId", id).string("statusChangeEmail", email);

        let response = call_for_id(invoker, "setStatusChangeEmail", id, &body).await?;
        success_flag(
            &response,
            "setStatusChangeEmail",
            "set_status_change_email_response",
        )
    }
}

async fn call_for_id(
    invoker: &dyn SoapInvoker,
    method: &str,
    id: u64,
    body: &SoapBody,
) -> Result<SoapResponse> {
    invoker
        .call(method, method, &body.to_xml())
        .await
        .map_err(|err| classify_for_id(err, id))
}

fn classify_for_id(err: SoapError, id: u64) -> EccuError {
    if err
        .fault_string()
        .is_some_and(|fault| fault.contains(NOT_FOUND_FAULT))
    {
        warn!(id, "ECCU request not found");
        return EccuError::NotFound { id };
    }
    EccuError::from_soap(err)
}

fn success_flag(response: &SoapResponse, operation: &str, key: &str) -> Result<bool> {
    response
        .bool_at(&[key, "success"])
        .ok_or_else(|| EccuError::unexpected(operation, format!("missing {}.success", key)))
}
