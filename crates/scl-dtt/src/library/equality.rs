//! Structural equality of definitions, ignoring their own ids.
//!
//! Private elements, `<Val>` defaults and enum values are compared as sets.
//! Children of composite definitions are compared in order.

use super::defs::{
    AttributeDef, DaDef, DaTypeDef, DoChild, DoTypeDef, EnumTypeDef, LNodeTypeDef, Private, Val,
};
use alloc::collections::BTreeSet;

/// Content comparison that ignores the definition's own id.
pub trait StructuralEq {
    fn structurally_eq(&self, other: &Self) -> bool;
}

fn private_set(privates: &[Private]) -> BTreeSet<(&str, Option<&str>)> {
    privates
        .iter()
        .map(|p| (p.kind.as_str(), p.source.as_deref()))
        .collect()
}

fn same_privates(a: &[Private], b: &[Private]) -> bool {
    private_set(a) == private_set(b)
}

fn val_set(vals: &[Val]) -> BTreeSet<(Option<u32>, &str)> {
    vals.iter().map(|v| (v.s_group, v.value.as_str())).collect()
}

fn same_vals(a: &[Val], b: &[Val]) -> bool {
    val_set(a) == val_set(b)
}

fn same_sequence<T: StructuralEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_eq(y))
}

impl StructuralEq for AttributeDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.b_type == other.b_type
            && self.type_id == other.type_id
            && self.count() == other.count()
            && self.s_addr == other.s_addr
            && self.val_kind == other.val_kind
            && self.val_import == other.val_import
            && same_vals(&self.vals, &other.vals)
    }
}

impl StructuralEq for DaDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        self.attr.structurally_eq(&other.attr)
            && self.fc == other.fc
            && self.dchg == other.dchg
            && self.qchg == other.qchg
            && self.dupd == other.dupd
            && self.prot_ns == other.prot_ns
    }
}

impl StructuralEq for DoChild {
    fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DoChild::Sdo(a), DoChild::Sdo(b)) => a == b,
            (DoChild::Da(a), DoChild::Da(b)) => a.structurally_eq(b),
            _ => false,
        }
    }
}

impl StructuralEq for LNodeTypeDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        self.ln_class == other.ln_class
            && self.ied_type == other.ied_type
            && self.dos == other.dos
            && same_privates(&self.privates, &other.privates)
    }
}

impl StructuralEq for DoTypeDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        self.cdc == other.cdc
            && self.ied_type == other.ied_type
            && same_sequence(&self.children, &other.children)
            && same_privates(&self.privates, &other.privates)
    }
}

impl StructuralEq for DaTypeDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        self.ied_type == other.ied_type
            && self.prot_ns == other.prot_ns
            && same_sequence(&self.bdas, &other.bdas)
            && same_privates(&self.privates, &other.privates)
    }
}

impl StructuralEq for EnumTypeDef {
    fn structurally_eq(&self, other: &Self) -> bool {
        let a: BTreeSet<_> = self.values.iter().collect();
        let b: BTreeSet<_> = other.values.iter().collect();
        a == b && same_privates(&self.privates, &other.privates)
    }
}
