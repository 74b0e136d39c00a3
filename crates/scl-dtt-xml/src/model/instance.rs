// crates/scl-dtt-xml/src/model/instance.rs

//! Contains model structs for the instantiated side of an IED:
//! `<LDevice>`, `<LN0>`/`<LN>` and their `<DOI>`/`<SDI>`/`<DAI>` trees.

use super::common::{Private, Val};
use super::templates::Text;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// Represents `<LDevice inst="...">`.
#[derive(Debug, Deserialize)]
pub struct LDevice {
    #[serde(rename = "@inst")]
    pub inst: String,

    #[serde(rename = "LN0", default)]
    pub ln0: Option<Ln>,

    #[serde(rename = "LN", default)]
    pub lns: Vec<Ln>,
}

/// Represents `<LN0>` and `<LN>`. Only the data instances are read.
#[derive(Debug, Deserialize)]
pub struct Ln {
    #[serde(rename = "@prefix", default)]
    pub prefix: Option<String>,

    #[serde(rename = "@lnClass")]
    pub ln_class: String,

    #[serde(rename = "@inst", default)]
    pub inst: String,

    #[serde(rename = "@lnType")]
    pub ln_type: String,

    #[serde(rename = "DOI", default)]
    pub dois: Vec<DataInstance>,
}

/// Represents `<DOI name="...">` and `<SDI name="...">`.
#[derive(Debug, Deserialize)]
pub struct DataInstance {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@ix", default)]
    pub ix: Option<u32>,

    #[serde(rename = "$value", default)]
    pub children: Vec<DataInstanceChild>,
}

/// The `xsd:choice` of DOI and SDI content.
#[derive(Debug, Deserialize)]
pub enum DataInstanceChild {
    #[serde(rename = "Text")]
    Text(Text),
    #[serde(rename = "Private")]
    Private(Private),
    #[serde(rename = "SDI")]
    Sdi(DataInstance),
    #[serde(rename = "DAI")]
    Dai(Dai),
}

/// Represents `<DAI name="..." valImport="...">`.
#[derive(Debug, Deserialize)]
pub struct Dai {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@valImport", default)]
    pub val_import: Option<bool>,

    #[serde(rename = "@valKind", default)]
    pub val_kind: Option<String>,

    #[serde(rename = "@sAddr", default)]
    pub s_addr: Option<String>,

    #[serde(rename = "Val", default)]
    pub vals: Vec<Val>,
}
