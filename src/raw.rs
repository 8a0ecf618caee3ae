//! Wire shape of a Minerva/Barista model-query response.
//!
//! Field names mirror the service exactly (`root-type`, `property-label`,
//! annotation `key`/`value`). Missing arrays and strings decode as empty so
//! partially populated responses still load; the builder skips entries left
//! without an id or endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub individuals: Vec<RawIndividual>,
    #[serde(default)]
    pub facts: Vec<RawFact>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawIndividual {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub types: Vec<RawClassExpression>,
    #[serde(default, rename = "root-type")]
    pub root_types: Vec<RawClassExpression>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawFact {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub property: String,
    #[serde(default, rename = "property-label")]
    pub property_label: Option<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

/// A class expression: either a named class or a `complement` wrapping one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawClassExpression {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler: Option<Box<RawClassExpression>>,
}

impl RawClassExpression {
    pub fn is_complement(&self) -> bool {
        self.kind.as_deref() == Some("complement")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawAnnotation {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "value-type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

pub fn parse_raw_model(input: &str) -> crate::Result<RawModel> {
    Ok(serde_json::from_str(input)?)
}
