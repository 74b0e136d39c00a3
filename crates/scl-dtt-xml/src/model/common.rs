// crates/scl-dtt-xml/src/model/common.rs

//! Contains helper structs shared by templates and instances.

use alloc::string::String;
use serde::Deserialize;

/// Represents `<Private type="..." source="...">`. Its content is not interpreted.
#[derive(Debug, Deserialize, Clone)]
pub struct Private {
    #[serde(rename = "@type")]
    pub kind: String,

    #[serde(rename = "@source", default)]
    pub source: Option<String>,
}

/// Represents `<Val sGroup="1">10</Val>`.
#[derive(Debug, Deserialize, Clone)]
pub struct Val {
    #[serde(rename = "@sGroup", default)]
    pub s_group: Option<u32>,

    #[serde(rename = "$text", default)]
    pub value: String,
}
