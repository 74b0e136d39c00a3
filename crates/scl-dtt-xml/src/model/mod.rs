//! Internal `serde` data structures that map directly to the SCL XML schema.
//!
//! Only the parts the template engine consumes are modeled: the IED tree down
//! to the data instances of each logical node, and `<DataTypeTemplates>`.
//! Every other element (Header, Substation, Communication, control blocks,
//! data sets, ...) is skipped by the deserializer.

#![allow(clippy::pedantic)] // XML schema naming conventions differ from Rust

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

pub mod common;
pub mod instance;
pub mod templates;

pub use instance::LDevice;
pub use templates::DataTypeTemplates;

/// The root `<SCL>` element of an SCD/ICD/CID document.
#[derive(Debug, Deserialize, Default)]
#[serde(rename = "SCL")]
pub struct Scl {
    #[serde(rename = "@version", default)]
    pub version: Option<String>,

    #[serde(rename = "@revision", default)]
    pub revision: Option<String>,

    #[serde(rename = "IED", default)]
    pub ieds: Vec<Ied>,

    #[serde(rename = "DataTypeTemplates", default)]
    pub data_type_templates: Option<DataTypeTemplates>,
}

/// Represents `<IED name="...">`.
#[derive(Debug, Deserialize)]
pub struct Ied {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "AccessPoint", default)]
    pub access_points: Vec<AccessPoint>,
}

/// Represents `<AccessPoint name="...">`. Only server access points hold logical devices.
#[derive(Debug, Deserialize)]
pub struct AccessPoint {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "Server", default)]
    pub server: Option<Server>,
}

/// Represents `<Server>`.
#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(rename = "LDevice", default)]
    pub ldevices: Vec<LDevice>,
}
