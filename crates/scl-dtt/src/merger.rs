// crates/scl-dtt/src/merger.rs
//! Import of one `TypeLibrary` into another.
//!
//! Kinds are processed in `TypeKind::MERGE_ORDER`. A source definition whose
//! id is free in the destination is copied, one structurally equal to the
//! occupant is skipped, and any other is copied under a generated id. Every
//! rename is applied to the source references still to be copied.
//!
//! Merging is two-phase: `TemplateMerger::plan` only reads both libraries and
//! returns a `MergePlan`, which `MergePlan::apply` appends to the destination.
//! A failed plan therefore leaves the destination untouched.
//!
//! Generated ids take the form `<prefix>_<id>`, with a numeric suffix when
//! that id is also taken, and never exceed `MAX_TYPE_ID_LEN` characters.

use crate::error::DttError;
use crate::library::TypeLibrary;
use crate::library::defs::{DaTypeDef, DoTypeDef, EnumTypeDef, LNodeTypeDef, TemplateDef};
use crate::library::equality::StructuralEq;
use crate::types::{MAX_TYPE_ID_LEN, TypeKind};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use log::{debug, info};

/// Old id to new id, per definition kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Renames {
    pub enum_types: BTreeMap<String, String>,
    pub da_types: BTreeMap<String, String>,
    pub do_types: BTreeMap<String, String>,
    pub ln_node_types: BTreeMap<String, String>,
}

impl Renames {
    pub fn of(&self, kind: TypeKind) -> &BTreeMap<String, String> {
        match kind {
            TypeKind::EnumType => &self.enum_types,
            TypeKind::DaType => &self.da_types,
            TypeKind::DoType => &self.do_types,
            TypeKind::LNodeType => &self.ln_node_types,
        }
    }

    fn of_mut(&mut self, kind: TypeKind) -> &mut BTreeMap<String, String> {
        match kind {
            TypeKind::EnumType => &mut self.enum_types,
            TypeKind::DaType => &mut self.da_types,
            TypeKind::DoType => &mut self.do_types,
            TypeKind::LNodeType => &mut self.ln_node_types,
        }
    }

    /// New id of a renamed definition.
    pub fn get(&self, kind: TypeKind, old_id: &str) -> Option<&str> {
        self.of(kind).get(old_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        TypeKind::MERGE_ORDER.iter().map(|&k| self.of(k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Definitions to append to a destination library, computed by `TemplateMerger::plan`.
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    enum_types: Vec<EnumTypeDef>,
    da_types: Vec<DaTypeDef>,
    do_types: Vec<DoTypeDef>,
    ln_node_types: Vec<LNodeTypeDef>,
    renames: Renames,
    skipped: usize,
}

impl MergePlan {
    pub fn enum_types(&self) -> &[EnumTypeDef] {
        &self.enum_types
    }

    pub fn da_types(&self) -> &[DaTypeDef] {
        &self.da_types
    }

    pub fn do_types(&self) -> &[DoTypeDef] {
        &self.do_types
    }

    pub fn ln_node_types(&self) -> &[LNodeTypeDef] {
        &self.ln_node_types
    }

    pub fn renames(&self) -> &Renames {
        &self.renames
    }

    /// Number of definitions the plan appends.
    pub fn len(&self) -> usize {
        self.enum_types.len() + self.da_types.len() + self.do_types.len() + self.ln_node_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn new_ids(&self) -> impl Iterator<Item = (TypeKind, &str)> {
        let enums = self.enum_types.iter().map(|d| (TypeKind::EnumType, d.id.as_str()));
        let das = self.da_types.iter().map(|d| (TypeKind::DaType, d.id.as_str()));
        let dos = self.do_types.iter().map(|d| (TypeKind::DoType, d.id.as_str()));
        let lns = self.ln_node_types.iter().map(|d| (TypeKind::LNodeType, d.id.as_str()));
        enums.chain(das).chain(dos).chain(lns)
    }

    /// Appends the planned definitions to `dest`.
    ///
    /// Fails without modifying `dest` if one of the new ids is already taken,
    /// which happens when `dest` changed since the plan was computed.
    pub fn apply(self, dest: &mut TypeLibrary) -> Result<MergeReport, DttError> {
        if let Some((kind, id)) = self.new_ids().find(|&(kind, id)| dest.contains(kind, id)) {
            return Err(DttError::DuplicateTypeId {
                kind,
                id: id.to_string(),
            });
        }
        let imported = self.len();
        for def in self.enum_types {
            dest.insert_enum_type(def)?;
        }
        for def in self.da_types {
            dest.insert_da_type(def)?;
        }
        for def in self.do_types {
            dest.insert_do_type(def)?;
        }
        for def in self.ln_node_types {
            dest.insert_ln_node_type(def)?;
        }
        Ok(MergeReport {
            renames: self.renames,
            imported,
            skipped: self.skipped,
        })
    }
}

/// Outcome of an applied merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub renames: Renames,
    /// Definitions appended to the destination.
    pub imported: usize,
    /// Source definitions already present in the destination.
    pub skipped: usize,
}

impl MergeReport {
    /// The id an imported logical node must now use as its `lnType`.
    pub fn ln_type<'a>(&'a self, old_ln_type: &'a str) -> &'a str {
        self.renames.get(TypeKind::LNodeType, old_ln_type).unwrap_or(old_ln_type)
    }
}

/// Per-kind access used by the merge passes.
trait Mergeable: TemplateDef + StructuralEq {
    fn entries(library: &TypeLibrary) -> &[Self];

    fn find<'l>(library: &'l TypeLibrary, id: &str) -> Option<&'l Self>;
}

impl Mergeable for EnumTypeDef {
    fn entries(library: &TypeLibrary) -> &[Self] {
        library.enum_types()
    }

    fn find<'l>(library: &'l TypeLibrary, id: &str) -> Option<&'l Self> {
        library.enum_type(id)
    }
}

impl Mergeable for DaTypeDef {
    fn entries(library: &TypeLibrary) -> &[Self] {
        library.da_types()
    }

    fn find<'l>(library: &'l TypeLibrary, id: &str) -> Option<&'l Self> {
        library.da_type(id)
    }
}

impl Mergeable for DoTypeDef {
    fn entries(library: &TypeLibrary) -> &[Self] {
        library.do_types()
    }

    fn find<'l>(library: &'l TypeLibrary, id: &str) -> Option<&'l Self> {
        library.do_type(id)
    }
}

impl Mergeable for LNodeTypeDef {
    fn entries(library: &TypeLibrary) -> &[Self] {
        library.ln_node_types()
    }

    fn find<'l>(library: &'l TypeLibrary, id: &str) -> Option<&'l Self> {
        library.ln_node_type(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Source definitions ordered so that same-kind dependencies come first,
/// ties in declaration order.
fn dependency_order<T: Mergeable>(defs: &[T]) -> Result<Vec<&T>, DttError> {
    let index: BTreeMap<&str, usize> = defs.iter().enumerate().map(|(i, d)| (d.id(), i)).collect();
    let mut state = vec![Visit::New; defs.len()];
    let mut order = Vec::with_capacity(defs.len());
    for i in 0..defs.len() {
        visit(defs, &index, i, &mut state, &mut order)?;
    }
    Ok(order)
}

fn visit<'d, T: Mergeable>(
    defs: &'d [T],
    index: &BTreeMap<&str, usize>,
    i: usize,
    state: &mut [Visit],
    order: &mut Vec<&'d T>,
) -> Result<(), DttError> {
    match state[i] {
        Visit::Done => return Ok(()),
        Visit::Active => {
            return Err(DttError::CyclicTypeReference {
                kind: T::KIND,
                id: defs[i].id().to_string(),
            });
        }
        Visit::New => {}
    }
    state[i] = Visit::Active;
    for (kind, id) in defs[i].references() {
        if kind != T::KIND {
            continue;
        }
        if let Some(&j) = index.get(id) {
            visit(defs, index, j, state, order)?;
        }
    }
    state[i] = Visit::Done;
    order.push(&defs[i]);
    Ok(())
}

/// Keeps at most `max` characters of `id`.
fn truncate_id(id: &str, max: usize) -> String {
    id.chars().take(max).collect()
}

/// Definition already holding `id`: planned entries first, then the destination.
fn occupant<'x, T: Mergeable>(dest: &'x TypeLibrary, added: &'x [T], id: &str) -> Option<&'x T> {
    added.iter().find(|d| d.id() == id).or_else(|| T::find(dest, id))
}

/// Merges libraries, renaming colliding definitions to `<prefix>_<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMerger {
    prefix: String,
}

impl TemplateMerger {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Computes what merging `source` into `dest` appends and renames.
    pub fn plan(&self, dest: &TypeLibrary, source: &TypeLibrary) -> Result<MergePlan, DttError> {
        let mut plan = MergePlan::default();
        plan.enum_types = self.plan_kind(dest, source, &mut plan.renames, &mut plan.skipped)?;
        plan.da_types = self.plan_kind(dest, source, &mut plan.renames, &mut plan.skipped)?;
        plan.do_types = self.plan_kind(dest, source, &mut plan.renames, &mut plan.skipped)?;
        plan.ln_node_types = self.plan_kind(dest, source, &mut plan.renames, &mut plan.skipped)?;
        debug!(
            "Merge plan for prefix '{}': {} new, {} renamed, {} already present",
            self.prefix,
            plan.len(),
            plan.renames.len(),
            plan.skipped
        );
        Ok(plan)
    }

    /// Plans and applies the merge of `source` into `dest`.
    pub fn merge(&self, dest: &mut TypeLibrary, source: &TypeLibrary) -> Result<MergeReport, DttError> {
        let report = self.plan(dest, source)?.apply(dest)?;
        info!(
            "Merged templates with prefix '{}': {} imported, {} skipped",
            self.prefix, report.imported, report.skipped
        );
        Ok(report)
    }

    fn plan_kind<T: Mergeable>(
        &self,
        dest: &TypeLibrary,
        source: &TypeLibrary,
        renames: &mut Renames,
        skipped: &mut usize,
    ) -> Result<Vec<T>, DttError> {
        let defs = T::entries(source);
        for def in defs {
            if let Some((kind, id)) = def.references().into_iter().find(|&(k, id)| !source.contains(k, id)) {
                return Err(DttError::NotFoundInTypeLibrary {
                    kind,
                    id: id.to_string(),
                });
            }
        }

        let mut added: Vec<T> = Vec::new();
        for def in dependency_order(defs)? {
            let mut candidate = def.clone();
            for kind in TypeKind::MERGE_ORDER {
                candidate.rewrite_references(kind, renames.of(kind));
            }
            let old_id = def.id();
            let same = occupant(dest, &added, old_id).map(|o| o.structurally_eq(&candidate));
            match same {
                None => {
                    debug!("Importing {} '{}'", T::KIND, old_id);
                    added.push(candidate);
                }
                Some(true) => {
                    debug!("{} '{}' already present", T::KIND, old_id);
                    *skipped += 1;
                }
                Some(false) => {
                    let (new_id, reuse) = self.free_id(dest, &added, &candidate);
                    debug!("Renaming {} '{}' to '{}'", T::KIND, old_id, new_id);
                    renames.of_mut(T::KIND).insert(old_id.to_string(), new_id.clone());
                    if reuse {
                        *skipped += 1;
                    } else {
                        candidate.set_id(new_id);
                        added.push(candidate);
                    }
                }
            }
        }
        Ok(added)
    }

    /// First generated id for `def` that is free or held by an equal definition.
    ///
    /// The second field is `true` when the id is held by an equal definition.
    fn free_id<T: Mergeable>(&self, dest: &TypeLibrary, added: &[T], def: &T) -> (String, bool) {
        let base = truncate_id(&format!("{}_{}", self.prefix, def.id()), MAX_TYPE_ID_LEN);
        let mut id = base.clone();
        let mut n = 0usize;
        loop {
            match occupant(dest, added, &id).map(|o| o.structurally_eq(def)) {
                None => return (id, false),
                Some(true) => return (id, true),
                Some(false) => {
                    n += 1;
                    let suffix = format!("_{}", n);
                    id = truncate_id(&base, MAX_TYPE_ID_LEN - suffix.len());
                    id.push_str(&suffix);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::defs::{AttributeDef, DaDef, DoRef, Private};
    use crate::types::{BasicType, Cdc, Fc};

    fn do_type(id: &str, das: &[&str]) -> DoTypeDef {
        das.iter().fold(DoTypeDef::new(id, Cdc::Sps), |t, name| {
            t.with_da(DaDef::new(AttributeDef::new(name, BasicType::Boolean), Fc::St))
        })
    }

    fn ln_type(id: &str, do_type: &str) -> LNodeTypeDef {
        LNodeTypeDef::new(id, "GGIO").with_do(DoRef::new("Ind", do_type))
    }

    #[test]
    fn test_colliding_do_type_is_renamed_and_referrer_rewritten() {
        let mut dest = TypeLibrary::new();
        dest.insert_do_type(do_type("X", &["a"])).unwrap();
        let mut source = TypeLibrary::new();
        source.insert_do_type(do_type("X", &["a", "b"])).unwrap();
        source.insert_ln_node_type(ln_type("GGIO_1", "X")).unwrap();

        let report = TemplateMerger::new("IED2").merge(&mut dest, &source).unwrap();

        let renamed = dest.do_type("IED2_X").unwrap();
        assert!(renamed.structurally_eq(&do_type("IED2_X", &["a", "b"])));
        assert!(dest.do_type("X").unwrap().structurally_eq(&do_type("X", &["a"])));
        assert_eq!(dest.ln_node_type("GGIO_1").unwrap().dos[0].type_id, "IED2_X");
        assert_eq!(report.renames.get(TypeKind::DoType, "X"), Some("IED2_X"));
        assert_eq!(report.renames.len(), 1);
        assert_eq!(report.imported, 2);
        assert_eq!(report.ln_type("GGIO_1"), "GGIO_1");
    }

    #[test]
    fn test_identical_import_changes_nothing() {
        let mut dest = TypeLibrary::new();
        dest.insert_enum_type(EnumTypeDef::new("E").with_value(1, "on")).unwrap();
        dest.insert_do_type(do_type("X", &["a"])).unwrap();
        dest.insert_ln_node_type(ln_type("GGIO_1", "X")).unwrap();
        let source = dest.clone();

        let report = TemplateMerger::new("IED2").merge(&mut dest, &source).unwrap();
        assert_eq!(dest.total_len(), 3);
        assert!(report.renames.is_empty());
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn test_enum_rename_escalates_to_do_types() {
        let mut dest = TypeLibrary::new();
        dest.insert_enum_type(EnumTypeDef::new("Beh").with_value(1, "on")).unwrap();
        let mut source = TypeLibrary::new();
        source
            .insert_enum_type(EnumTypeDef::new("Beh").with_value(1, "on").with_value(5, "off"))
            .unwrap();
        source
            .insert_do_type(DoTypeDef::new("ENS_Beh", Cdc::Ens).with_da(DaDef::new(
                AttributeDef::new("stVal", BasicType::Enum).with_type("Beh"),
                Fc::St,
            )))
            .unwrap();

        let report = TemplateMerger::new("P").merge(&mut dest, &source).unwrap();
        assert_eq!(report.renames.get(TypeKind::EnumType, "Beh"), Some("P_Beh"));
        let st_val = dest.do_type("ENS_Beh").unwrap().da_named("stVal").unwrap();
        assert_eq!(st_val.attr.type_id.as_deref(), Some("P_Beh"));
    }

    #[test]
    fn test_same_kind_dependencies_are_rewritten_first() {
        let inner = |b_type| DaTypeDef::new("Inner").with_bda(AttributeDef::new("v", b_type));
        let outer = DaTypeDef::new("Outer")
            .with_bda(AttributeDef::new("in", BasicType::Struct).with_type("Inner"));

        let mut dest = TypeLibrary::new();
        dest.insert_da_type(inner(BasicType::Int32)).unwrap();
        dest.insert_da_type(outer.clone()).unwrap();
        let mut source = TypeLibrary::new();
        // Declared before the type it references.
        source.insert_da_type(outer).unwrap();
        source.insert_da_type(inner(BasicType::Float32)).unwrap();

        let plan = TemplateMerger::new("B").plan(&dest, &source).unwrap();
        assert_eq!(plan.renames().get(TypeKind::DaType, "Inner"), Some("B_Inner"));
        assert_eq!(plan.renames().get(TypeKind::DaType, "Outer"), Some("B_Outer"));
        let ids: Vec<&str> = plan.da_types().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["B_Inner", "B_Outer"]);
        assert_eq!(plan.da_types()[1].bdas[0].type_id.as_deref(), Some("B_Inner"));
    }

    #[test]
    fn test_generated_id_collisions() {
        let mut dest = TypeLibrary::new();
        dest.insert_do_type(do_type("X", &["a"])).unwrap();
        dest.insert_do_type(do_type("P_X", &["c"])).unwrap();
        let mut source = TypeLibrary::new();
        source.insert_do_type(do_type("X", &["b"])).unwrap();

        let report = TemplateMerger::new("P").merge(&mut dest, &source).unwrap();
        assert_eq!(report.renames.get(TypeKind::DoType, "X"), Some("P_X_1"));
        assert!(dest.contains(TypeKind::DoType, "P_X_1"));

        // A second import finds its generated id already holding equal content.
        let before = dest.total_len();
        let report = TemplateMerger::new("P").merge(&mut dest, &source).unwrap();
        assert_eq!(report.renames.get(TypeKind::DoType, "X"), Some("P_X_1"));
        assert_eq!(dest.total_len(), before);
    }

    #[test]
    fn test_generated_ids_are_truncated() {
        let long_id: String = core::iter::repeat_n('x', MAX_TYPE_ID_LEN).collect();
        let mut dest = TypeLibrary::new();
        dest.insert_do_type(do_type(&long_id, &["a"])).unwrap();
        let mut source = TypeLibrary::new();
        source.insert_do_type(do_type(&long_id, &["b"])).unwrap();

        let report = TemplateMerger::new("IED").merge(&mut dest, &source).unwrap();
        let new_id = report.renames.get(TypeKind::DoType, &long_id).unwrap();
        assert_eq!(new_id.chars().count(), MAX_TYPE_ID_LEN);
        assert!(new_id.starts_with("IED_xxx"));
        assert_ne!(new_id, long_id);
    }

    #[test]
    fn test_privates_compare_as_sets() {
        let mut dest = TypeLibrary::new();
        dest.insert_enum_type(
            EnumTypeDef::new("E")
                .with_value(1, "on")
                .with_private(Private::new("a"))
                .with_private(Private::new("b")),
        )
        .unwrap();
        let mut source = TypeLibrary::new();
        source
            .insert_enum_type(
                EnumTypeDef::new("E")
                    .with_value(1, "on")
                    .with_private(Private::new("b"))
                    .with_private(Private::new("a")),
            )
            .unwrap();
        let plan = TemplateMerger::new("P").plan(&dest, &source).unwrap();
        assert!(plan.is_empty());
        assert!(plan.renames().is_empty());
    }

    #[test]
    fn test_missing_source_reference_is_fatal() {
        let mut source = TypeLibrary::new();
        source.insert_ln_node_type(ln_type("GGIO_1", "Missing")).unwrap();
        let mut dest = TypeLibrary::new();
        let err = TemplateMerger::new("P").merge(&mut dest, &source).unwrap_err();
        assert_eq!(
            err,
            DttError::NotFoundInTypeLibrary {
                kind: TypeKind::DoType,
                id: "Missing".to_string(),
            }
        );
        assert!(dest.is_empty());
    }

    #[test]
    fn test_same_kind_cycle_is_fatal() {
        let mut source = TypeLibrary::new();
        source
            .insert_da_type(DaTypeDef::new("A").with_bda(AttributeDef::new("b", BasicType::Struct).with_type("B")))
            .unwrap();
        source
            .insert_da_type(DaTypeDef::new("B").with_bda(AttributeDef::new("a", BasicType::Struct).with_type("A")))
            .unwrap();
        let err = TemplateMerger::new("P").plan(&TypeLibrary::new(), &source).unwrap_err();
        assert!(matches!(err, DttError::CyclicTypeReference { kind: TypeKind::DaType, .. }));
    }

    #[test]
    fn test_plan_does_not_mutate_and_stale_plan_is_rejected() {
        let dest = TypeLibrary::new();
        let mut source = TypeLibrary::new();
        source.insert_do_type(do_type("X", &["a"])).unwrap();

        let merger = TemplateMerger::new("P");
        let plan = merger.plan(&dest, &source).unwrap();
        assert!(dest.is_empty());
        assert_eq!(plan.len(), 1);

        let mut changed = dest.clone();
        changed.insert_do_type(do_type("X", &["z"])).unwrap();
        assert!(matches!(plan.apply(&mut changed), Err(DttError::DuplicateTypeId { .. })));
        assert_eq!(changed.total_len(), 1);
    }
}
