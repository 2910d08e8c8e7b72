//! SOAP message bodies
//!
//! A [`SoapBody`] is an ordered list of typed fields rendered as
//! `<name xsi:type="xsd:...">value</name>` elements. Field order is the
//! insertion order; every added field is rendered exactly once.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::partial_escape;
use std::fmt;

/// Wire type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsdType {
    String,
    Boolean,
    Int,
    Base64Binary,
}

impl XsdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            XsdType::String => "xsd:string",
            XsdType::Boolean => "xsd:boolean",
            XsdType::Int => "xsd:int",
            XsdType::Base64Binary => "xsd:base64Binary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SoapField {
    name: String,
    kind: XsdType,
    value: String,
}

/// Ordered, typed SOAP message body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapBody {
    fields: Vec<SoapField>,
}

impl SoapBody {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, kind: XsdType, value: String) -> &mut Self {
        self.fields.push(SoapField {
            name: name.to_string(),
            kind,
            value,
        });
        self
    }

    pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
        self.push(name, XsdType::String, value.to_string())
    }

    pub fn boolean(&mut self, name: &str, value: bool) -> &mut Self {
        self.push(name, XsdType::Boolean, value.to_string())
    }

    pub fn integer(&mut self, name: &str, value: u64) -> &mut Self {
        self.push(name, XsdType::Int, value.to_string())
    }

    /// Attach a raw text payload. The slot keeps the content untouched; it is
    /// base64-encoded only when the body is serialised.
    pub fn text(&mut self, name: &str, raw: &str) -> &mut Self {
        self.push(name, XsdType::Base64Binary, raw.to_string())
    }

    /// Raw content of a text slot added with [`SoapBody::text`]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == XsdType::Base64Binary && f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Rendered (unescaped) value of a scalar field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Element names in render order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SoapBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            let value = match field.kind {
                XsdType::Base64Binary => STANDARD.encode(field.value.as_bytes()),
                _ => partial_escape(field.value.as_str()).into_owned(),
            };
            write!(
                f,
                "<{name} xsi:type=\"{kind}\">{value}</{name}>",
                name = field.name,
                kind = field.kind.as_str(),
            )?;
        }
        Ok(())
    }
}
