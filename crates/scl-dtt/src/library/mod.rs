// crates/scl-dtt/src/library/mod.rs
//! Indexed storage of the definitions of one document's `DataTypeTemplates`.
//!
//! Each kind is an arena (`Vec`) in declaration order plus an id index.
//! Definitions reference each other by id only, never by pointer.
//!
//! Ids are unique per kind, not across kinds: a DOType and a DAType may share
//! an id. Inserting a second definition with an existing id of the same kind
//! fails with `DuplicateTypeId` and leaves the library unchanged.
//!
//! The library does not reject dangling references on insert, because a
//! document may declare types in any order. Call `dangling_references` once
//! loading is complete.

pub mod defs;
pub mod equality;

use crate::error::DttError;
use crate::types::TypeKind;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use defs::{
    DaTypeDef, DoChild, DoTypeDef, EnumTypeDef, LNodeTypeDef, Private, TemplateDef,
};
use log::trace;

/// One kind's definitions: insertion-ordered entries and an id index.
#[derive(Debug, Clone)]
struct Registry<T> {
    entries: Vec<T>,
    index: BTreeMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<T: TemplateDef> Registry<T> {
    fn insert(&mut self, def: T) -> Result<(), DttError> {
        if self.index.contains_key(def.id()) {
            return Err(DttError::DuplicateTypeId {
                kind: T::KIND,
                id: def.id().to_string(),
            });
        }
        trace!("Inserting {} '{}'", T::KIND, def.id());
        self.index.insert(def.id().to_string(), self.entries.len());
        self.entries.push(def);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    fn require(&self, id: &str) -> Result<&T, DttError> {
        self.get(id).ok_or_else(|| DttError::NotFoundInTypeLibrary {
            kind: T::KIND,
            id: id.to_string(),
        })
    }
}

/// A borrowed definition of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeDef<'a> {
    LNodeType(&'a LNodeTypeDef),
    DoType(&'a DoTypeDef),
    DaType(&'a DaTypeDef),
    EnumType(&'a EnumTypeDef),
}

impl<'a> TypeDef<'a> {
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDef::LNodeType(_) => TypeKind::LNodeType,
            TypeDef::DoType(_) => TypeKind::DoType,
            TypeDef::DaType(_) => TypeKind::DaType,
            TypeDef::EnumType(_) => TypeKind::EnumType,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            TypeDef::LNodeType(d) => &d.id,
            TypeDef::DoType(d) => &d.id,
            TypeDef::DaType(d) => &d.id,
            TypeDef::EnumType(d) => &d.id,
        }
    }

    pub fn privates(&self) -> &'a [Private] {
        match self {
            TypeDef::LNodeType(d) => &d.privates,
            TypeDef::DoType(d) => &d.privates,
            TypeDef::DaType(d) => &d.privates,
            TypeDef::EnumType(d) => &d.privates,
        }
    }

    pub fn references(&self) -> Vec<(TypeKind, &'a str)> {
        match self {
            TypeDef::LNodeType(d) => d.references(),
            TypeDef::DoType(d) => d.references(),
            TypeDef::DaType(d) => d.references(),
            TypeDef::EnumType(d) => d.references(),
        }
    }
}

/// The type definitions of one document.
#[derive(Debug, Clone, Default)]
pub struct TypeLibrary {
    ln_node_types: Registry<LNodeTypeDef>,
    do_types: Registry<DoTypeDef>,
    da_types: Registry<DaTypeDef>,
    enum_types: Registry<EnumTypeDef>,
}

impl TypeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Insertion ---

    /// Adds an LNodeType. Fails with `DuplicateTypeId` if the id is taken.
    pub fn insert_ln_node_type(&mut self, def: LNodeTypeDef) -> Result<(), DttError> {
        self.ln_node_types.insert(def)
    }

    pub fn insert_do_type(&mut self, def: DoTypeDef) -> Result<(), DttError> {
        self.do_types.insert(def)
    }

    pub fn insert_da_type(&mut self, def: DaTypeDef) -> Result<(), DttError> {
        self.da_types.insert(def)
    }

    pub fn insert_enum_type(&mut self, def: EnumTypeDef) -> Result<(), DttError> {
        self.enum_types.insert(def)
    }

    // --- Lookup ---

    /// Looks a definition up by kind and id. Absence is `None`, never a default.
    pub fn lookup(&self, kind: TypeKind, id: &str) -> Option<TypeDef<'_>> {
        match kind {
            TypeKind::LNodeType => self.ln_node_types.get(id).map(TypeDef::LNodeType),
            TypeKind::DoType => self.do_types.get(id).map(TypeDef::DoType),
            TypeKind::DaType => self.da_types.get(id).map(TypeDef::DaType),
            TypeKind::EnumType => self.enum_types.get(id).map(TypeDef::EnumType),
        }
    }

    pub fn contains(&self, kind: TypeKind, id: &str) -> bool {
        self.lookup(kind, id).is_some()
    }

    /// Every definition of `kind`, in insertion order.
    pub fn list_all(&self, kind: TypeKind) -> Vec<TypeDef<'_>> {
        match kind {
            TypeKind::LNodeType => self.ln_node_types.entries.iter().map(TypeDef::LNodeType).collect(),
            TypeKind::DoType => self.do_types.entries.iter().map(TypeDef::DoType).collect(),
            TypeKind::DaType => self.da_types.entries.iter().map(TypeDef::DaType).collect(),
            TypeKind::EnumType => self.enum_types.entries.iter().map(TypeDef::EnumType).collect(),
        }
    }

    pub fn ln_node_type(&self, id: &str) -> Option<&LNodeTypeDef> {
        self.ln_node_types.get(id)
    }

    pub fn do_type(&self, id: &str) -> Option<&DoTypeDef> {
        self.do_types.get(id)
    }

    pub fn da_type(&self, id: &str) -> Option<&DaTypeDef> {
        self.da_types.get(id)
    }

    pub fn enum_type(&self, id: &str) -> Option<&EnumTypeDef> {
        self.enum_types.get(id)
    }

    /// Like `ln_node_type`, but absence is `NotFoundInTypeLibrary`.
    pub fn require_ln_node_type(&self, id: &str) -> Result<&LNodeTypeDef, DttError> {
        self.ln_node_types.require(id)
    }

    pub fn require_do_type(&self, id: &str) -> Result<&DoTypeDef, DttError> {
        self.do_types.require(id)
    }

    pub fn require_da_type(&self, id: &str) -> Result<&DaTypeDef, DttError> {
        self.da_types.require(id)
    }

    pub fn require_enum_type(&self, id: &str) -> Result<&EnumTypeDef, DttError> {
        self.enum_types.require(id)
    }

    pub fn ln_node_types(&self) -> &[LNodeTypeDef] {
        &self.ln_node_types.entries
    }

    pub fn do_types(&self) -> &[DoTypeDef] {
        &self.do_types.entries
    }

    pub fn da_types(&self) -> &[DaTypeDef] {
        &self.da_types.entries
    }

    pub fn enum_types(&self) -> &[EnumTypeDef] {
        &self.enum_types.entries
    }

    pub fn len(&self, kind: TypeKind) -> usize {
        match kind {
            TypeKind::LNodeType => self.ln_node_types.entries.len(),
            TypeKind::DoType => self.do_types.entries.len(),
            TypeKind::DaType => self.da_types.entries.len(),
            TypeKind::EnumType => self.enum_types.entries.len(),
        }
    }

    /// Number of definitions across all four kinds.
    pub fn total_len(&self) -> usize {
        TypeKind::MERGE_ORDER.iter().map(|&k| self.len(k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Declared literal values of an EnumType, in declaration order.
    pub fn enum_values(&self, id: &str) -> Option<Vec<&str>> {
        self.enum_types
            .get(id)
            .map(|e| e.values.iter().map(|v| v.value.as_str()).collect())
    }

    // --- Integrity ---

    /// Checks that every referenced type id resolves in this library and that
    /// every STRUCT or ENUM attribute names its type.
    ///
    /// Returns one `NotFoundInTypeLibrary` per dangling reference and one
    /// `MissingTypeId` per untyped attribute; an empty list means the library
    /// is referentially complete.
    pub fn dangling_references(&self) -> Vec<DttError> {
        let mut errors = Vec::new();
        for kind in TypeKind::MERGE_ORDER {
            for def in self.list_all(kind) {
                for (ref_kind, ref_id) in def.references() {
                    if !self.contains(ref_kind, ref_id) {
                        errors.push(DttError::NotFoundInTypeLibrary {
                            kind: ref_kind,
                            id: ref_id.to_string(),
                        });
                    }
                }
            }
        }
        let untyped = self
            .do_types
            .entries
            .iter()
            .flat_map(|d| {
                d.children.iter().filter_map(move |c| match c {
                    DoChild::Da(da) => Some((d.id.as_str(), &da.attr)),
                    DoChild::Sdo(_) => None,
                })
            })
            .chain(
                self.da_types
                    .entries
                    .iter()
                    .flat_map(|d| d.bdas.iter().map(move |b| (d.id.as_str(), b))),
            );
        for (owner, attr) in untyped {
            if let (Some(kind), None) = (attr.referenced_kind(), &attr.type_id) {
                errors.push(DttError::MissingTypeId {
                    kind,
                    attribute: format!("{}.{}", owner, attr.name),
                });
            }
        }
        errors
    }

    /// DOTypes in which two children share a name, with the repeated name.
    ///
    /// Path resolution tries DA names before SDO names, so such a DOType makes
    /// some of its children unreachable.
    pub fn ambiguous_children(&self) -> Vec<(&str, &str)> {
        let mut found = Vec::new();
        for do_type in &self.do_types.entries {
            let mut seen = BTreeSet::new();
            for child in &do_type.children {
                if !seen.insert(child.name()) {
                    found.push((do_type.id.as_str(), child.name()));
                }
            }
        }
        found
    }

    /// Definitions that reference `id` of `kind`.
    pub fn referrers(&self, kind: TypeKind, id: &str) -> Vec<TypeDef<'_>> {
        TypeKind::MERGE_ORDER
            .iter()
            .flat_map(|&k| self.list_all(k))
            .filter(|def| def.references().iter().any(|&(k, r)| k == kind && r == id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::defs::{AttributeDef, DaDef, DoRef, SdoDef};
    use super::*;
    use crate::types::{BasicType, Cdc, Fc};

    fn sample_library() -> TypeLibrary {
        let mut lib = TypeLibrary::new();
        lib.insert_enum_type(
            EnumTypeDef::new("BehaviourModeKind")
                .with_value(1, "on")
                .with_value(2, "blocked")
                .with_value(3, "test"),
        )
        .unwrap();
        lib.insert_do_type(
            DoTypeDef::new("ENS_Beh", Cdc::Ens).with_da(DaDef::new(
                AttributeDef::new("stVal", BasicType::Enum).with_type("BehaviourModeKind"),
                Fc::St,
            )),
        )
        .unwrap();
        lib.insert_ln_node_type(
            LNodeTypeDef::new("LLN0_1", "LLN0").with_do(DoRef::new("Beh", "ENS_Beh")),
        )
        .unwrap();
        lib
    }

    #[test]
    fn test_lookup_returns_inserted_content() {
        let enum_def = EnumTypeDef::new("E").with_value(0, "a");
        let mut lib = TypeLibrary::new();
        lib.insert_enum_type(enum_def.clone()).unwrap();

        assert_eq!(
            lib.lookup(TypeKind::EnumType, "E"),
            Some(TypeDef::EnumType(&enum_def))
        );
        assert_eq!(lib.lookup(TypeKind::DaType, "E"), None);
    }

    #[test]
    fn test_duplicate_id_rejected_within_kind_only() {
        let mut lib = sample_library();
        let err = lib
            .insert_enum_type(EnumTypeDef::new("BehaviourModeKind"))
            .unwrap_err();
        assert_eq!(
            err,
            DttError::DuplicateTypeId {
                kind: TypeKind::EnumType,
                id: "BehaviourModeKind".to_string()
            }
        );
        // Same id, different kind.
        lib.insert_da_type(DaTypeDef::new("BehaviourModeKind")).unwrap();
        assert_eq!(lib.total_len(), 4);
    }

    #[test]
    fn test_require_reports_not_found() {
        let lib = sample_library();
        assert!(lib.require_do_type("ENS_Beh").is_ok());
        assert_eq!(
            lib.require_da_type("Missing").unwrap_err(),
            DttError::NotFoundInTypeLibrary {
                kind: TypeKind::DaType,
                id: "Missing".to_string()
            }
        );
    }

    #[test]
    fn test_list_all_keeps_insertion_order() {
        let mut lib = TypeLibrary::new();
        for id in ["Z", "A", "M"] {
            lib.insert_da_type(DaTypeDef::new(id)).unwrap();
        }
        let ids: Vec<&str> = lib.list_all(TypeKind::DaType).iter().map(|d| d.id()).collect();
        assert_eq!(ids, ["Z", "A", "M"]);
    }

    #[test]
    fn test_enum_values() {
        let lib = sample_library();
        assert_eq!(
            lib.enum_values("BehaviourModeKind"),
            Some(alloc::vec!["on", "blocked", "test"])
        );
        assert_eq!(lib.enum_values("Nope"), None);
    }

    #[test]
    fn test_dangling_references() {
        let mut lib = sample_library();
        assert!(lib.dangling_references().is_empty());

        lib.insert_do_type(
            DoTypeDef::new("WYE_1", Cdc::Wye)
                .with_sdo(SdoDef::new("phsA", "CMV_missing"))
                .with_da(DaDef::new(AttributeDef::new("origin", BasicType::Struct), Fc::St)),
        )
        .unwrap();
        let errors = lib.dangling_references();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&DttError::NotFoundInTypeLibrary {
            kind: TypeKind::DoType,
            id: "CMV_missing".to_string()
        }));
        assert!(errors.contains(&DttError::MissingTypeId {
            kind: TypeKind::DaType,
            attribute: "WYE_1.origin".to_string()
        }));
    }

    #[test]
    fn test_ambiguous_children() {
        let mut lib = sample_library();
        assert!(lib.ambiguous_children().is_empty());
        lib.insert_do_type(
            DoTypeDef::new("Odd", Cdc::Wye)
                .with_sdo(SdoDef::new("res", "ENS_Beh"))
                .with_da(DaDef::new(AttributeDef::new("res", BasicType::Int32), Fc::Mx)),
        )
        .unwrap();
        assert_eq!(lib.ambiguous_children(), [("Odd", "res")]);
    }

    #[test]
    fn test_referrers() {
        let lib = sample_library();
        let users = lib.referrers(TypeKind::EnumType, "BehaviourModeKind");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id(), "ENS_Beh");
        assert_eq!(lib.referrers(TypeKind::DoType, "ENS_Beh")[0].kind(), TypeKind::LNodeType);
    }
}
