//! Definitions of the `DataTypeTemplates` section: LNodeType, DOType, DAType and EnumType.
//!
//! Definitions are plain values. They reference each other by type id only;
//! the owning `TypeLibrary` resolves those ids.

use crate::types::{BasicType, Cdc, Fc, TypeKind, ValKind, NO_SETTING_GROUP};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Normalizes a `count` attribute: surrounding whitespace is dropped and an
/// empty count is the same as no count at all.
fn normalize_count(count: &str) -> Option<String> {
    let trimmed = count.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A `<Private type="..." source="...">` element attached to a definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Private {
    pub kind: String,
    pub source: Option<String>,
}

impl Private {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

/// A declared `<Val>` default, optionally bound to a setting group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Val {
    pub s_group: Option<u32>,
    pub value: String,
}

impl Val {
    pub fn new(value: &str) -> Self {
        Self {
            s_group: None,
            value: value.to_string(),
        }
    }

    pub fn in_group(s_group: u32, value: &str) -> Self {
        Self {
            s_group: Some(s_group),
            value: value.to_string(),
        }
    }

    /// The setting-group key of this value (`0` when no `sGroup` is set).
    pub fn group_key(&self) -> u32 {
        self.s_group.unwrap_or(NO_SETTING_GROUP)
    }
}

/// A `<ProtNs>` protocol namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtNs {
    pub namespace: String,
    pub kind: Option<String>,
}

/// The attributes shared by DA and BDA.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub name: String,
    pub b_type: BasicType,
    /// Referenced DAType (STRUCT) or EnumType (ENUM).
    pub type_id: Option<String>,
    count: Option<String>,
    pub val_import: bool,
    pub val_kind: Option<ValKind>,
    pub s_addr: Option<String>,
    pub vals: Vec<Val>,
}

impl AttributeDef {
    pub fn new(name: &str, b_type: BasicType) -> Self {
        Self {
            name: name.to_string(),
            b_type,
            type_id: None,
            count: None,
            val_import: false,
            val_kind: None,
            s_addr: None,
            vals: Vec::new(),
        }
    }

    pub fn with_type(mut self, type_id: &str) -> Self {
        self.type_id = Some(type_id.to_string());
        self
    }

    /// Sets the array count. An empty count is stored as no count.
    pub fn with_count(mut self, count: &str) -> Self {
        self.count = normalize_count(count);
        self
    }

    pub fn with_val_import(mut self, val_import: bool) -> Self {
        self.val_import = val_import;
        self
    }

    pub fn with_val_kind(mut self, val_kind: ValKind) -> Self {
        self.val_kind = Some(val_kind);
        self
    }

    pub fn with_s_addr(mut self, s_addr: &str) -> Self {
        self.s_addr = Some(s_addr.to_string());
        self
    }

    pub fn with_val(mut self, val: Val) -> Self {
        self.vals.push(val);
        self
    }

    pub fn count(&self) -> Option<&str> {
        self.count.as_deref()
    }

    /// The definition kind referenced through `type_id`, if the `bType` requires one.
    pub fn referenced_kind(&self) -> Option<TypeKind> {
        match self.b_type {
            BasicType::Struct => Some(TypeKind::DaType),
            BasicType::Enum => Some(TypeKind::EnumType),
            _ => None,
        }
    }

    /// Declared defaults keyed by setting group.
    pub fn default_values(&self) -> BTreeMap<u32, String> {
        self.vals
            .iter()
            .map(|v| (v.group_key(), v.value.clone()))
            .collect()
    }
}

/// A BDA carries exactly the shared attribute set.
pub type BdaDef = AttributeDef;

/// A `<DA>` inside a DOType.
#[derive(Debug, Clone, PartialEq)]
pub struct DaDef {
    pub attr: AttributeDef,
    pub fc: Fc,
    pub dchg: bool,
    pub qchg: bool,
    pub dupd: bool,
    pub prot_ns: Vec<ProtNs>,
}

impl DaDef {
    pub fn new(attr: AttributeDef, fc: Fc) -> Self {
        Self {
            attr,
            fc,
            dchg: false,
            qchg: false,
            dupd: false,
            prot_ns: Vec::new(),
        }
    }

    pub fn with_triggers(mut self, dchg: bool, qchg: bool, dupd: bool) -> Self {
        self.dchg = dchg;
        self.qchg = qchg;
        self.dupd = dupd;
        self
    }

    pub fn name(&self) -> &str {
        &self.attr.name
    }
}

/// An `<SDO>` inside a DOType.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdoDef {
    pub name: String,
    pub type_id: String,
    count: Option<String>,
}

impl SdoDef {
    pub fn new(name: &str, type_id: &str) -> Self {
        Self {
            name: name.to_string(),
            type_id: type_id.to_string(),
            count: None,
        }
    }

    /// Sets the array count. An empty count is stored as no count.
    pub fn with_count(mut self, count: &str) -> Self {
        self.count = normalize_count(count);
        self
    }

    pub fn count(&self) -> Option<&str> {
        self.count.as_deref()
    }
}

/// A child of a DOType, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum DoChild {
    Sdo(SdoDef),
    Da(DaDef),
}

impl DoChild {
    pub fn name(&self) -> &str {
        match self {
            DoChild::Sdo(sdo) => &sdo.name,
            DoChild::Da(da) => da.name(),
        }
    }
}

/// A `<DO>` reference inside an LNodeType.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoRef {
    pub name: String,
    pub type_id: String,
    pub transient: bool,
    pub access_control: Option<String>,
}

impl DoRef {
    pub fn new(name: &str, type_id: &str) -> Self {
        Self {
            name: name.to_string(),
            type_id: type_id.to_string(),
            transient: false,
            access_control: None,
        }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LNodeTypeDef {
    pub id: String,
    pub ln_class: String,
    pub ied_type: Option<String>,
    pub dos: Vec<DoRef>,
    pub privates: Vec<Private>,
}

impl LNodeTypeDef {
    pub fn new(id: &str, ln_class: &str) -> Self {
        Self {
            id: id.to_string(),
            ln_class: ln_class.to_string(),
            ied_type: None,
            dos: Vec::new(),
            privates: Vec::new(),
        }
    }

    pub fn with_do(mut self, do_ref: DoRef) -> Self {
        self.dos.push(do_ref);
        self
    }

    pub fn with_private(mut self, private: Private) -> Self {
        self.privates.push(private);
        self
    }

    /// First DO declared with `name`.
    pub fn do_named(&self, name: &str) -> Option<&DoRef> {
        self.dos.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoTypeDef {
    pub id: String,
    pub cdc: Cdc,
    pub ied_type: Option<String>,
    pub children: Vec<DoChild>,
    pub privates: Vec<Private>,
}

impl DoTypeDef {
    pub fn new(id: &str, cdc: Cdc) -> Self {
        Self {
            id: id.to_string(),
            cdc,
            ied_type: None,
            children: Vec::new(),
            privates: Vec::new(),
        }
    }

    pub fn with_da(mut self, da: DaDef) -> Self {
        self.children.push(DoChild::Da(da));
        self
    }

    pub fn with_sdo(mut self, sdo: SdoDef) -> Self {
        self.children.push(DoChild::Sdo(sdo));
        self
    }

    pub fn with_ied_type(mut self, ied_type: &str) -> Self {
        self.ied_type = Some(ied_type.to_string());
        self
    }

    pub fn with_private(mut self, private: Private) -> Self {
        self.privates.push(private);
        self
    }

    /// First DA declared with `name`.
    pub fn da_named(&self, name: &str) -> Option<&DaDef> {
        self.children.iter().find_map(|c| match c {
            DoChild::Da(da) if da.name() == name => Some(da),
            _ => None,
        })
    }

    /// First SDO declared with `name`.
    pub fn sdo_named(&self, name: &str) -> Option<&SdoDef> {
        self.children.iter().find_map(|c| match c {
            DoChild::Sdo(sdo) if sdo.name == name => Some(sdo),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaTypeDef {
    pub id: String,
    pub ied_type: Option<String>,
    pub bdas: Vec<BdaDef>,
    pub prot_ns: Vec<ProtNs>,
    pub privates: Vec<Private>,
}

impl DaTypeDef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ied_type: None,
            bdas: Vec::new(),
            prot_ns: Vec::new(),
            privates: Vec::new(),
        }
    }

    pub fn with_bda(mut self, bda: BdaDef) -> Self {
        self.bdas.push(bda);
        self
    }

    pub fn with_private(mut self, private: Private) -> Self {
        self.privates.push(private);
        self
    }

    pub fn bda_named(&self, name: &str) -> Option<&BdaDef> {
        self.bdas.iter().find(|b| b.name == name)
    }
}

/// An `<EnumVal ord="...">value</EnumVal>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EnumVal {
    pub ord: i32,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumTypeDef {
    pub id: String,
    pub values: Vec<EnumVal>,
    pub privates: Vec<Private>,
}

impl EnumTypeDef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            values: Vec::new(),
            privates: Vec::new(),
        }
    }

    pub fn with_value(mut self, ord: i32, value: &str) -> Self {
        self.values.push(EnumVal {
            ord,
            value: value.to_string(),
        });
        self
    }

    pub fn with_private(mut self, private: Private) -> Self {
        self.privates.push(private);
        self
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.value == value)
    }
}

// --- Common Definition Behavior ---

/// Behavior shared by the four definition kinds.
pub trait TemplateDef: Clone {
    const KIND: TypeKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn privates(&self) -> &[Private];

    /// Every type id this definition references, in declaration order.
    fn references(&self) -> Vec<(TypeKind, &str)>;

    /// Replaces references to ids of `kind` found in `renames`.
    fn rewrite_references(&mut self, kind: TypeKind, renames: &BTreeMap<String, String>);
}

fn attribute_reference(attr: &AttributeDef) -> Option<(TypeKind, &str)> {
    match (attr.referenced_kind(), attr.type_id.as_deref()) {
        (Some(kind), Some(id)) => Some((kind, id)),
        _ => None,
    }
}

fn rewrite_attribute(attr: &mut AttributeDef, kind: TypeKind, renames: &BTreeMap<String, String>) {
    if attr.referenced_kind() != Some(kind) {
        return;
    }
    if let Some(new_id) = attr.type_id.as_ref().and_then(|id| renames.get(id)) {
        attr.type_id = Some(new_id.clone());
    }
}

impl TemplateDef for LNodeTypeDef {
    const KIND: TypeKind = TypeKind::LNodeType;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn privates(&self) -> &[Private] {
        &self.privates
    }

    fn references(&self) -> Vec<(TypeKind, &str)> {
        self.dos
            .iter()
            .map(|d| (TypeKind::DoType, d.type_id.as_str()))
            .collect()
    }

    fn rewrite_references(&mut self, kind: TypeKind, renames: &BTreeMap<String, String>) {
        if kind != TypeKind::DoType {
            return;
        }
        for do_ref in &mut self.dos {
            if let Some(new_id) = renames.get(&do_ref.type_id) {
                do_ref.type_id = new_id.clone();
            }
        }
    }
}

impl TemplateDef for DoTypeDef {
    const KIND: TypeKind = TypeKind::DoType;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn privates(&self) -> &[Private] {
        &self.privates
    }

    fn references(&self) -> Vec<(TypeKind, &str)> {
        self.children
            .iter()
            .filter_map(|c| match c {
                DoChild::Sdo(sdo) => Some((TypeKind::DoType, sdo.type_id.as_str())),
                DoChild::Da(da) => attribute_reference(&da.attr),
            })
            .collect()
    }

    fn rewrite_references(&mut self, kind: TypeKind, renames: &BTreeMap<String, String>) {
        for child in &mut self.children {
            match child {
                DoChild::Sdo(sdo) if kind == TypeKind::DoType => {
                    if let Some(new_id) = renames.get(&sdo.type_id) {
                        sdo.type_id = new_id.clone();
                    }
                }
                DoChild::Sdo(_) => {}
                DoChild::Da(da) => rewrite_attribute(&mut da.attr, kind, renames),
            }
        }
    }
}

impl TemplateDef for DaTypeDef {
    const KIND: TypeKind = TypeKind::DaType;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn privates(&self) -> &[Private] {
        &self.privates
    }

    fn references(&self) -> Vec<(TypeKind, &str)> {
        self.bdas.iter().filter_map(attribute_reference).collect()
    }

    fn rewrite_references(&mut self, kind: TypeKind, renames: &BTreeMap<String, String>) {
        for bda in &mut self.bdas {
            rewrite_attribute(bda, kind, renames);
        }
    }
}

impl TemplateDef for EnumTypeDef {
    const KIND: TypeKind = TypeKind::EnumType;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn privates(&self) -> &[Private] {
        &self.privates
    }

    fn references(&self) -> Vec<(TypeKind, &str)> {
        Vec::new()
    }

    fn rewrite_references(&mut self, _kind: TypeKind, _renames: &BTreeMap<String, String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_count_is_normalized_on_construction() {
        let none = AttributeDef::new("a", BasicType::Int32);
        let empty = AttributeDef::new("a", BasicType::Int32).with_count("");
        let blank = AttributeDef::new("a", BasicType::Int32).with_count("  ");
        let three = AttributeDef::new("a", BasicType::Int32).with_count(" 3 ");

        assert_eq!(none.count(), None);
        assert_eq!(empty.count(), None);
        assert_eq!(blank.count(), None);
        assert_eq!(three.count(), Some("3"));
        assert_eq!(none, empty);
        assert_eq!(SdoDef::new("s", "T").with_count(""), SdoDef::new("s", "T"));
    }

    #[test]
    fn test_default_values_are_keyed_by_setting_group() {
        let attr = AttributeDef::new("setVal", BasicType::Int32)
            .with_val(Val::new("5"))
            .with_val(Val::in_group(2, "7"));
        let values = attr.default_values();
        assert_eq!(values.get(&0).map(String::as_str), Some("5"));
        assert_eq!(values.get(&2).map(String::as_str), Some("7"));
    }

    #[test]
    fn test_do_type_lookups_follow_declaration_order() {
        let do_type = DoTypeDef::new("DT", Cdc::Wye)
            .with_sdo(SdoDef::new("phsA", "CMV_1"))
            .with_da(DaDef::new(AttributeDef::new("q", BasicType::Quality), Fc::Mx))
            .with_da(DaDef::new(AttributeDef::new("q", BasicType::Int8), Fc::Cf));

        assert_eq!(do_type.sdo_named("phsA").map(|s| s.type_id.as_str()), Some("CMV_1"));
        assert_eq!(do_type.da_named("q").map(|d| d.fc), Some(Fc::Mx));
        assert!(do_type.da_named("phsA").is_none());
    }

    #[test]
    fn test_references_and_rewrite() {
        let mut do_type = DoTypeDef::new("DT", Cdc::Ens)
            .with_sdo(SdoDef::new("sub", "SubDT"))
            .with_da(DaDef::new(
                AttributeDef::new("stVal", BasicType::Enum).with_type("Beh"),
                Fc::St,
            ))
            .with_da(DaDef::new(
                AttributeDef::new("origin", BasicType::Struct).with_type("Originator"),
                Fc::St,
            ))
            .with_da(DaDef::new(AttributeDef::new("q", BasicType::Quality), Fc::St));

        assert_eq!(
            do_type.references(),
            vec![
                (TypeKind::DoType, "SubDT"),
                (TypeKind::EnumType, "Beh"),
                (TypeKind::DaType, "Originator"),
            ]
        );

        let mut renames = BTreeMap::new();
        renames.insert("Beh".to_string(), "IED_Beh".to_string());
        renames.insert("SubDT".to_string(), "IED_SubDT".to_string());

        // Only references of the requested kind are rewritten.
        do_type.rewrite_references(TypeKind::EnumType, &renames);
        assert_eq!(
            do_type.references(),
            vec![
                (TypeKind::DoType, "SubDT"),
                (TypeKind::EnumType, "IED_Beh"),
                (TypeKind::DaType, "Originator"),
            ]
        );
        do_type.rewrite_references(TypeKind::DoType, &renames);
        assert_eq!(do_type.references()[0], (TypeKind::DoType, "IED_SubDT"));
    }
}
