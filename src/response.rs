//! SOAP response mapping
//!
//! Replies are converted into a `serde_json::Value` tree keyed by snake_case
//! local element names, so `<ns1:uploadResponse><fileId>7</fileId>` is read
//! as `upload_response.file_id`. Repeated siblings collapse into an array,
//! empty and `xsi:nil` elements become `null`, leaves are strings.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{SoapError, SoapResult};

/// Body of a successful SOAP call
#[derive(Debug, Clone, PartialEq)]
pub struct SoapResponse {
    pub body: Value,
}

impl SoapResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Look up a nested value by snake_case key path
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.body, |value, key| value.get(*key))
            .filter(|value| !value.is_null())
    }

    /// Integer at `path`, accepting both numeric and string leaves
    pub fn integer_at(&self, path: &[&str]) -> Option<u64> {
        self.get(path).and_then(as_integer)
    }

    /// Boolean at `path`, accepting both boolean and `"true"`/`"false"` leaves
    pub fn bool_at(&self, path: &[&str]) -> Option<bool> {
        self.get(path).and_then(as_bool)
    }
}

pub fn as_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalise a value that may be a single leaf or an array of leaves
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Convert a camelCase element name into snake_case
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    nil: bool,
}

impl Frame {
    fn new(name: String, nil: bool) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
            nil,
        }
    }

    fn into_value(self) -> Value {
        if self.nil {
            Value::Null
        } else if !self.children.is_empty() {
            Value::Object(self.children)
        } else if self.text.trim().is_empty() {
            Value::Null
        } else {
            Value::String(self.text)
        }
    }
}

fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    snake_case(&String::from_utf8_lossy(start.local_name().as_ref()))
}

fn is_nil(start: &BytesStart<'_>) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
    })
}

fn malformed(err: impl std::fmt::Display) -> SoapError {
    SoapError::MalformedResponse(err.to_string())
}

/// Parse an XML document into a snake_case value tree
pub fn parse_document(xml: &str) -> SoapResult<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Frame::new(String::new(), false)];

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                stack.push(Frame::new(element_name(&start), is_nil(&start)));
            }
            Event::Empty(start) => {
                let name = element_name(&start);
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.children, name, Value::Null);
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(malformed("unbalanced closing tag"));
                }
                let frame = stack.pop().ok_or_else(|| malformed("empty stack"))?;
                let name = frame.name.clone();
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.children, name, frame.into_value());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(malformed("unexpected end of document"));
    }

    let root = stack.pop().ok_or_else(|| malformed("empty document"))?;
    Ok(Value::Object(root.children))
}

/// Outcome of reading a SOAP envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Body(Value),
    Fault { code: String, string: String },
}

/// Parse a SOAP envelope and split it into a body or a fault
pub fn parse_envelope(xml: &str) -> SoapResult<Envelope> {
    let document = parse_document(xml)?;
    let body = document
        .get("envelope")
        .and_then(|envelope| envelope.get("body"))
        .cloned()
        .ok_or_else(|| malformed("missing SOAP envelope body"))?;

    if let Some(fault) = body.get("fault") {
        let code = fault.get("faultcode").and_then(as_string).unwrap_or_default();
        let string = fault
            .get("faultstring")
            .and_then(as_string)
            .unwrap_or_default();
        return Ok(Envelope::Fault { code, string });
    }

    Ok(Envelope::Body(body))
}
