// crates/scl-dtt/src/attribute.rs
//! Resolved data attributes and the query types used to select them.

use crate::error::DttError;
use crate::log::LogMetadata;
use crate::types::{BasicType, Cdc, Fc, ValKind};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Splits a dotted data reference into its segments.
///
/// An empty reference or an empty segment (`"a..b"`, `"a."`) is an `InvalidPath`.
pub fn split_path(path: &str) -> Result<Vec<&str>, DttError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DttError::InvalidPath {
            path: path.to_string(),
            reason: "empty path segment".to_string(),
        });
    }
    Ok(segments)
}

/// Identity of a logical node instance and the LNodeType it instantiates.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LnRef {
    pub prefix: String,
    pub ln_class: String,
    pub ln_inst: String,
    pub ln_type: String,
}

impl LnRef {
    pub fn new(ln_class: &str, ln_inst: &str, ln_type: &str) -> Self {
        Self {
            prefix: String::new(),
            ln_class: ln_class.to_string(),
            ln_inst: ln_inst.to_string(),
            ln_type: ln_type.to_string(),
        }
    }

    /// A reference to an LNodeType alone, with no instance identity.
    /// The resolver fills `ln_class` from the LNodeType.
    pub fn of_type(ln_type: &str) -> Self {
        Self {
            ln_type: ln_type.to_string(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn is_ln0(&self) -> bool {
        self.ln_class == "LLN0"
    }

    /// `LLN0` for the LN0, otherwise `prefix + lnClass + inst`.
    pub fn name(&self) -> String {
        if self.is_ln0() {
            "LLN0".to_string()
        } else {
            format!("{}{}{}", self.prefix, self.ln_class, self.ln_inst)
        }
    }
}

impl fmt::Display for LnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl LogMetadata for LnRef {
    fn meta(&self) -> String {
        format!("LN {} type={}", self.name(), self.ln_type)
    }
}

/// One step of a DO path: a DO or SDO name and the CDC of its DOType.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStep {
    pub name: String,
    pub cdc: Cdc,
}

/// A fully resolved leaf attribute of a logical node.
///
/// Computed per query from the type library and never stored in it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRef {
    pub ln: LnRef,
    /// The DO followed by any SDOs.
    pub do_path: Vec<DoStep>,
    /// The DA followed by any BDAs. The last entry is a non-STRUCT leaf.
    pub da_path: Vec<String>,
    pub b_type: BasicType,
    pub fc: Fc,
    /// The EnumType of an ENUM leaf.
    pub type_id: Option<String>,
    pub val_import: bool,
    pub val_kind: Option<ValKind>,
    /// Literal values keyed by setting group (`0` when no `sGroup`).
    pub values: BTreeMap<u32, String>,
}

impl AttributeRef {
    /// Name of the top-level DO.
    pub fn do_name(&self) -> &str {
        self.do_path.first().map(|s| s.name.as_str()).unwrap_or_default()
    }

    /// Name of the top-level DA.
    pub fn da_name(&self) -> &str {
        self.da_path.first().map(String::as_str).unwrap_or_default()
    }

    /// `DO.sdo...`
    pub fn do_ref(&self) -> String {
        let names: Vec<&str> = self.do_path.iter().map(|s| s.name.as_str()).collect();
        names.join(".")
    }

    /// `DA.bda...`
    pub fn da_ref(&self) -> String {
        self.da_path.join(".")
    }

    /// `DO.sdo....DA.bda...`
    pub fn data_ref(&self) -> String {
        format!("{}.{}", self.do_ref(), self.da_ref())
    }

    pub fn ln_ref(&self) -> String {
        self.ln.name()
    }

    /// `ldInst/LN.DO.DA`
    pub fn object_ref(&self, ld_inst: &str) -> String {
        format!("{}/{}.{}", ld_inst, self.ln_ref(), self.data_ref())
    }

    /// CDC of the innermost DO or SDO.
    pub fn cdc(&self) -> Option<&Cdc> {
        self.do_path.last().map(|s| &s.cdc)
    }

    pub fn enum_type_id(&self) -> Option<&str> {
        match self.b_type {
            BasicType::Enum => self.type_id.as_deref(),
            _ => None,
        }
    }

    /// `true` for the `Mod.stVal` attribute, which is always writable.
    pub fn is_mod_st_val(&self) -> bool {
        self.do_path.len() == 1
            && self.do_name() == "Mod"
            && self.da_path.len() == 1
            && self.da_name() == "stVal"
    }

    /// Whether instance values may be imported into this attribute.
    pub fn is_updatable(&self) -> bool {
        self.is_mod_st_val() || (self.val_import && self.fc.is_importable())
    }

    /// Value of the given setting group.
    pub fn value(&self, s_group: u32) -> Option<&str> {
        self.values.get(&s_group).map(String::as_str)
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ln_ref(), self.data_ref())
    }
}

/// Selects attributes of an LNodeType by DO path prefix, DA path prefix and fc.
///
/// Unlike full-path resolution, a segment that matches nothing selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    pub do_path: Vec<String>,
    pub da_path: Vec<String>,
    pub fc: Option<Fc>,
}

impl AttributeFilter {
    /// Selects every attribute.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects the attributes under `DO[.sdo...]`.
    pub fn for_do(do_path: &str) -> Result<Self, DttError> {
        Ok(Self {
            do_path: split_path(do_path)?.into_iter().map(String::from).collect(),
            ..Self::default()
        })
    }

    /// Restricts the selection to attributes under `DA[.bda...]`.
    pub fn with_da(mut self, da_path: &str) -> Result<Self, DttError> {
        self.da_path = split_path(da_path)?.into_iter().map(String::from).collect();
        Ok(self)
    }

    pub fn with_fc(mut self, fc: Fc) -> Self {
        self.fc = Some(fc);
        self
    }

    /// Whether a DA name and fc pass the DA-level constraints.
    pub(crate) fn accepts_da(&self, name: &str, fc: Fc) -> bool {
        self.fc.is_none_or(|f| f == fc) && self.da_path.first().is_none_or(|n| n == name)
    }

    /// Whether a BDA at `depth` (1 = first BDA below the DA) passes the DA-path prefix.
    pub(crate) fn accepts_bda(&self, depth: usize, name: &str) -> bool {
        self.da_path.get(depth).is_none_or(|n| n == name)
    }
}
