// crates/scl-dtt-xml/src/converter.rs

//! Converts the schema-based `model` structs into the `scl-dtt` core types:
//! a `TypeLibrary` for `<DataTypeTemplates>` and one `LnInstance` per logical node.

use crate::error::SclXmlError;
use crate::model::common;
use crate::model::instance::{DataInstance, DataInstanceChild, Ln};
use crate::model::templates::{
    AttributeFields, DaType, DataTypeTemplates, DoType, DoTypeChild, EnumType, LNodeType,
    ProtNs,
};
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, warn};
use scl_dtt::instance::InstanceId;
use scl_dtt::library::defs::{
    AttributeDef, DaDef, DaTypeDef, DoRef, DoTypeDef, EnumTypeDef, LNodeTypeDef, Private, SdoDef,
    Val,
};
use scl_dtt::types::NO_SETTING_GROUP;
use scl_dtt::{BasicType, Cdc, Fc, LnInstance, LnRef, TypeLibrary, ValKind};

/// Builds the `TypeLibrary` of one document.
pub fn to_type_library(dtt: &DataTypeTemplates) -> Result<TypeLibrary, SclXmlError> {
    let mut library = TypeLibrary::new();
    for t in &dtt.enum_types {
        library.insert_enum_type(map_enum_type(t))?;
    }
    for t in &dtt.da_types {
        library.insert_da_type(map_da_type(t)?)?;
    }
    for t in &dtt.do_types {
        library.insert_do_type(map_do_type(t)?)?;
    }
    for t in &dtt.ln_node_types {
        library.insert_ln_node_type(map_ln_node_type(t))?;
    }
    debug!(
        "Loaded {} LNodeTypes, {} DOTypes, {} DATypes, {} EnumTypes",
        dtt.ln_node_types.len(),
        dtt.do_types.len(),
        dtt.da_types.len(),
        dtt.enum_types.len()
    );
    for issue in library.dangling_references() {
        warn!("Inconsistent templates: {}", issue);
    }
    Ok(library)
}

fn map_private(p: &common::Private) -> Private {
    Private {
        kind: p.kind.clone(),
        source: p.source.clone(),
    }
}

fn map_privates(privates: &[common::Private]) -> Vec<Private> {
    privates.iter().map(map_private).collect()
}

fn map_val(v: &common::Val) -> Val {
    Val {
        s_group: v.s_group,
        value: v.value.clone(),
    }
}

fn map_prot_ns(p: &ProtNs) -> scl_dtt::library::defs::ProtNs {
    scl_dtt::library::defs::ProtNs {
        namespace: p.namespace.clone(),
        kind: p.kind.clone(),
    }
}

fn map_ln_node_type(t: &LNodeType) -> LNodeTypeDef {
    let mut def = LNodeTypeDef::new(&t.id, &t.ln_class);
    def.ied_type = t.ied_type.clone();
    def.privates = map_privates(&t.privates);
    for d in &t.dos {
        let mut do_ref = DoRef::new(&d.name, &d.type_id);
        do_ref.transient = d.transient;
        do_ref.access_control = d.access_control.clone();
        def.dos.push(do_ref);
    }
    def
}

/// Maps the attributes shared by DA and BDA.
fn map_attribute(f: AttributeFields<'_>) -> Result<AttributeDef, SclXmlError> {
    let b_type: BasicType = f.b_type.parse()?;
    let mut attr = AttributeDef::new(f.name, b_type).with_val_import(f.val_import);
    if let Some(type_id) = f.type_id {
        attr = attr.with_type(type_id);
    }
    if let Some(count) = f.count {
        attr = attr.with_count(count);
    }
    if let Some(s_addr) = f.s_addr {
        attr = attr.with_s_addr(s_addr);
    }
    if let Some(val_kind) = f.val_kind {
        attr = attr.with_val_kind(val_kind.parse::<ValKind>()?);
    }
    attr.vals = f.vals.iter().map(map_val).collect();
    Ok(attr)
}

fn map_do_type(t: &DoType) -> Result<DoTypeDef, SclXmlError> {
    let mut def = DoTypeDef::new(&t.id, Cdc::parse(&t.cdc));
    def.ied_type = t.ied_type.clone();
    if let Cdc::Other(cdc) = &def.cdc {
        debug!("DOType '{}' uses non-standard CDC '{}'", t.id, cdc);
    }
    for child in &t.children {
        match child {
            DoTypeChild::Text(_) => {}
            DoTypeChild::Private(p) => def.privates.push(map_private(p)),
            DoTypeChild::Sdo(sdo) => {
                let mut sdo_def = SdoDef::new(&sdo.name, &sdo.type_id);
                if let Some(count) = &sdo.count {
                    sdo_def = sdo_def.with_count(count);
                }
                def = def.with_sdo(sdo_def);
            }
            DoTypeChild::Da(da) => {
                let fc: Fc = da.fc.parse()?;
                let mut da_def =
                    DaDef::new(map_attribute(da.fields())?, fc).with_triggers(da.dchg, da.qchg, da.dupd);
                da_def.prot_ns = da.prot_ns.iter().map(map_prot_ns).collect();
                def = def.with_da(da_def);
            }
        }
    }
    Ok(def)
}

fn map_da_type(t: &DaType) -> Result<DaTypeDef, SclXmlError> {
    let mut def = DaTypeDef::new(&t.id);
    def.ied_type = t.ied_type.clone();
    def.privates = map_privates(&t.privates);
    def.prot_ns = t.prot_ns.iter().map(map_prot_ns).collect();
    for bda in &t.bdas {
        def.bdas.push(map_attribute(bda.fields())?);
    }
    Ok(def)
}

fn map_enum_type(t: &EnumType) -> EnumTypeDef {
    let mut def = EnumTypeDef::new(&t.id);
    def.privates = map_privates(&t.privates);
    for v in &t.values {
        def = def.with_value(v.ord, &v.value);
    }
    def
}

/// Builds the instance tree of one `<LN0>` or `<LN>`.
pub fn to_ln_instance(ln: &Ln) -> Result<LnInstance, SclXmlError> {
    let mut ln_ref = LnRef::new(&ln.ln_class, &ln.inst, &ln.ln_type);
    if let Some(prefix) = &ln.prefix {
        ln_ref = ln_ref.with_prefix(prefix);
    }
    let mut instance = LnInstance::new(ln_ref);
    for doi in &ln.dois {
        let id = instance.add_doi(&doi.name);
        add_children(&mut instance, id, doi)?;
    }
    Ok(instance)
}

fn add_children(
    instance: &mut LnInstance,
    parent: InstanceId,
    node: &DataInstance,
) -> Result<(), SclXmlError> {
    for child in &node.children {
        match child {
            DataInstanceChild::Text(_) | DataInstanceChild::Private(_) => {}
            DataInstanceChild::Sdi(sdi) => {
                let id = instance.add_sdi(parent, &sdi.name)?;
                add_children(instance, id, sdi)?;
            }
            DataInstanceChild::Dai(dai) => {
                let handle = instance.add_dai(parent, &dai.name, dai.val_import)?;
                for val in &dai.vals {
                    let s_group = val.s_group.unwrap_or(NO_SETTING_GROUP);
                    instance.set_value(handle, s_group, &val.value)?;
                }
            }
        }
    }
    Ok(())
}

/// Display name of a logical node, for log messages.
pub(crate) fn ln_label(ln: &Ln) -> String {
    LnRef::new(&ln.ln_class, &ln.inst, &ln.ln_type)
        .with_prefix(ln.prefix.as_deref().unwrap_or_default())
        .name()
}
