// crates/scl-dtt-xml/src/model/templates.rs

//! Contains model structs related to `<DataTypeTemplates>`.
//! (Schema: `SCL_DataTypeTemplates.xsd`)

use super::common::{Private, Val};
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// The `<DataTypeTemplates>` section. Kinds appear in schema order.
#[derive(Debug, Deserialize, Default)]
pub struct DataTypeTemplates {
    #[serde(rename = "LNodeType", default)]
    pub ln_node_types: Vec<LNodeType>,

    #[serde(rename = "DOType", default)]
    pub do_types: Vec<DoType>,

    #[serde(rename = "DAType", default)]
    pub da_types: Vec<DaType>,

    #[serde(rename = "EnumType", default)]
    pub enum_types: Vec<EnumType>,
}

/// Represents `<LNodeType id="..." lnClass="...">`.
#[derive(Debug, Deserialize)]
pub struct LNodeType {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@lnClass")]
    pub ln_class: String,

    #[serde(rename = "@iedType", default)]
    pub ied_type: Option<String>,

    #[serde(rename = "Private", default)]
    pub privates: Vec<Private>,

    #[serde(rename = "DO", default)]
    pub dos: Vec<Do>,
}

/// Represents `<DO name="..." type="..."/>` inside an LNodeType.
#[derive(Debug, Deserialize)]
pub struct Do {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@type")]
    pub type_id: String,

    #[serde(rename = "@transient", default)]
    pub transient: bool,

    #[serde(rename = "@accessControl", default)]
    pub access_control: Option<String>,
}

/// Represents `<DOType id="..." cdc="...">`.
#[derive(Debug, Deserialize)]
pub struct DoType {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@cdc")]
    pub cdc: String,

    #[serde(rename = "@iedType", default)]
    pub ied_type: Option<String>,

    /// SDOs and DAs interleave; their relative order is kept.
    #[serde(rename = "$value", default)]
    pub children: Vec<DoTypeChild>,
}

/// The `xsd:choice` of DOType content.
#[derive(Debug, Deserialize)]
pub enum DoTypeChild {
    #[serde(rename = "Text")]
    Text(Text),
    #[serde(rename = "Private")]
    Private(Private),
    #[serde(rename = "SDO")]
    Sdo(Sdo),
    #[serde(rename = "DA")]
    Da(Da),
}

/// Represents `<Text>` documentation, which the loader ignores.
#[derive(Debug, Deserialize, Default)]
pub struct Text {
    #[serde(rename = "@source", default)]
    pub source: Option<String>,

    #[serde(rename = "$text", default)]
    pub value: String,
}

/// Represents `<SDO name="..." type="..."/>`.
#[derive(Debug, Deserialize)]
pub struct Sdo {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@type")]
    pub type_id: String,

    #[serde(rename = "@count", default)]
    pub count: Option<String>,
}

/// Borrowed view of the attributes shared by `<DA>` and `<BDA>` (`agAbstractDataAttribute`).
#[derive(Debug, Clone, Copy)]
pub struct AttributeFields<'a> {
    pub name: &'a str,
    pub b_type: &'a str,
    pub type_id: Option<&'a str>,
    pub count: Option<&'a str>,
    pub s_addr: Option<&'a str>,
    pub val_kind: Option<&'a str>,
    pub val_import: bool,
    pub vals: &'a [Val],
}

/// Represents `<DA name="..." bType="..." fc="...">` inside a DOType.
#[derive(Debug, Deserialize)]
pub struct Da {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@bType")]
    pub b_type: String,

    #[serde(rename = "@type", default)]
    pub type_id: Option<String>,

    #[serde(rename = "@count", default)]
    pub count: Option<String>,

    #[serde(rename = "@sAddr", default)]
    pub s_addr: Option<String>,

    #[serde(rename = "@valKind", default)]
    pub val_kind: Option<String>,

    #[serde(rename = "@valImport", default)]
    pub val_import: bool,

    #[serde(rename = "@fc")]
    pub fc: String,

    #[serde(rename = "@dchg", default)]
    pub dchg: bool,

    #[serde(rename = "@qchg", default)]
    pub qchg: bool,

    #[serde(rename = "@dupd", default)]
    pub dupd: bool,

    #[serde(rename = "Val", default)]
    pub vals: Vec<Val>,

    #[serde(rename = "ProtNs", default)]
    pub prot_ns: Vec<ProtNs>,
}

impl Da {
    pub fn fields(&self) -> AttributeFields<'_> {
        AttributeFields {
            name: &self.name,
            b_type: &self.b_type,
            type_id: self.type_id.as_deref(),
            count: self.count.as_deref(),
            s_addr: self.s_addr.as_deref(),
            val_kind: self.val_kind.as_deref(),
            val_import: self.val_import,
            vals: &self.vals,
        }
    }
}

/// Represents `<BDA name="..." bType="...">` inside a DAType.
#[derive(Debug, Deserialize)]
pub struct Bda {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@bType")]
    pub b_type: String,

    #[serde(rename = "@type", default)]
    pub type_id: Option<String>,

    #[serde(rename = "@count", default)]
    pub count: Option<String>,

    #[serde(rename = "@sAddr", default)]
    pub s_addr: Option<String>,

    #[serde(rename = "@valKind", default)]
    pub val_kind: Option<String>,

    #[serde(rename = "@valImport", default)]
    pub val_import: bool,

    #[serde(rename = "Val", default)]
    pub vals: Vec<Val>,
}

impl Bda {
    pub fn fields(&self) -> AttributeFields<'_> {
        AttributeFields {
            name: &self.name,
            b_type: &self.b_type,
            type_id: self.type_id.as_deref(),
            count: self.count.as_deref(),
            s_addr: self.s_addr.as_deref(),
            val_kind: self.val_kind.as_deref(),
            val_import: self.val_import,
            vals: &self.vals,
        }
    }
}

/// Represents `<ProtNs type="8-MMS">IEC 61850-8-1:2003</ProtNs>`.
#[derive(Debug, Deserialize)]
pub struct ProtNs {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,

    #[serde(rename = "$text", default)]
    pub namespace: String,
}

/// Represents `<DAType id="...">`.
#[derive(Debug, Deserialize)]
pub struct DaType {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@iedType", default)]
    pub ied_type: Option<String>,

    #[serde(rename = "Private", default)]
    pub privates: Vec<Private>,

    #[serde(rename = "BDA", default)]
    pub bdas: Vec<Bda>,

    #[serde(rename = "ProtNs", default)]
    pub prot_ns: Vec<ProtNs>,
}

/// Represents `<EnumType id="...">`.
#[derive(Debug, Deserialize)]
pub struct EnumType {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "Private", default)]
    pub privates: Vec<Private>,

    #[serde(rename = "EnumVal", default)]
    pub values: Vec<EnumVal>,
}

/// Represents `<EnumVal ord="1">on</EnumVal>`. The value may be empty.
#[derive(Debug, Deserialize)]
pub struct EnumVal {
    #[serde(rename = "@ord")]
    pub ord: i32,

    #[serde(rename = "$text", default)]
    pub value: String,
}
