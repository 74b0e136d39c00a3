// crates/scl-dtt/src/resolver.rs
//! Resolution of dotted data references against the type library.
//!
//! A reference such as `A.phsA.cVal.mag.f` does not say where the DO path
//! ends and the DA path starts. At every DOType the next segment is matched
//! against the DA names first and against the SDO names second. Paths that
//! stop above a leaf expand to every leaf below them, in declaration order.

use crate::attribute::{split_path, AttributeFilter, AttributeRef, DoStep, LnRef};
use crate::error::DttError;
use crate::library::TypeLibrary;
use crate::library::defs::{AttributeDef, DaTypeDef, DoChild, DoTypeDef, LNodeTypeDef};
use crate::log::ctx_trace;
use crate::types::{BasicType, Fc, TypeKind};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Read-only path resolution over one `TypeLibrary`.
#[derive(Debug, Clone, Copy)]
pub struct TypePathResolver<'a> {
    library: &'a TypeLibrary,
}

impl<'a> TypePathResolver<'a> {
    pub fn new(library: &'a TypeLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &'a TypeLibrary {
        self.library
    }

    /// Resolves a full `DO[.sdo...][.DA[.bda...]]` reference.
    ///
    /// A reference ending at a DO, SDO or STRUCT attribute yields every leaf
    /// below it. A segment matching no declared child is an `InvalidPath`;
    /// an unresolvable type id is `NotFoundInTypeLibrary`.
    pub fn resolve(&self, ln: &LnRef, path: &str) -> Result<Vec<AttributeRef>, DttError> {
        let segments = split_path(path)?;
        let ln_type = self.library.require_ln_node_type(&ln.ln_type)?;
        let ln = complete_ln(ln, ln_type);
        let mut walk = Walk::new(self.library, &ln, path, None);

        let (first, rest) = walk.split_first(&segments)?;
        let do_ref = ln_type.do_named(first).ok_or_else(|| {
            walk.invalid(format!("'{}' is not a DO of LNodeType '{}'", first, ln_type.id))
        })?;
        let do_type = walk.enter_do(&do_ref.name, &do_ref.type_id)?;
        walk.descend_do_type(do_type, rest)?;

        ctx_trace!(ln, "Resolved '{}' to {} attribute(s)", path, walk.out.len());
        Ok(walk.out)
    }

    /// Resolves a reference that must designate exactly one leaf attribute.
    pub fn resolve_one(&self, ln: &LnRef, path: &str) -> Result<AttributeRef, DttError> {
        let mut found = self.resolve(ln, path)?;
        if found.len() != 1 {
            return Err(DttError::InvalidPath {
                path: path.to_string(),
                reason: format!("designates {} attributes instead of one leaf", found.len()),
            });
        }
        found.pop().ok_or_else(|| DttError::InvalidPath {
            path: path.to_string(),
            reason: "designates no attribute".to_string(),
        })
    }

    /// Resolves a reference whose DO/DA boundary is given by the caller,
    /// as in an FCDA's `doName` and `daName`.
    pub fn resolve_split(
        &self,
        ln: &LnRef,
        do_ref: &str,
        da_ref: &str,
    ) -> Result<Vec<AttributeRef>, DttError> {
        let path = format!("{}.{}", do_ref, da_ref);
        let do_segments = split_path(do_ref)?;
        let da_segments = split_path(da_ref)?;
        let ln_type = self.library.require_ln_node_type(&ln.ln_type)?;
        let ln = complete_ln(ln, ln_type);
        let mut walk = Walk::new(self.library, &ln, &path, None);

        let (first, sdos) = walk.split_first(&do_segments)?;
        let do_ref = ln_type.do_named(first).ok_or_else(|| {
            walk.invalid(format!("'{}' is not a DO of LNodeType '{}'", first, ln_type.id))
        })?;
        let mut do_type = walk.enter_do(&do_ref.name, &do_ref.type_id)?;
        for &name in sdos {
            let sdo = do_type.sdo_named(name).ok_or_else(|| {
                walk.invalid(format!("'{}' is not an SDO of DOType '{}'", name, do_type.id))
            })?;
            do_type = walk.enter_do(&sdo.name, &sdo.type_id)?;
        }

        let (da_name, bdas) = walk.split_first(&da_segments)?;
        let da = do_type.da_named(da_name).ok_or_else(|| {
            walk.invalid(format!("'{}' is not a DA of DOType '{}'", da_name, do_type.id))
        })?;
        walk.da_path.push(da.attr.name.clone());
        walk.descend_attribute(&da.attr, da.fc, bdas)?;
        Ok(walk.out)
    }

    /// Selects attributes of an LN by DO prefix, DA prefix and fc.
    ///
    /// Prefix segments that match nothing select nothing, but an unresolvable
    /// type id is still `NotFoundInTypeLibrary`.
    pub fn filter(
        &self,
        ln: &LnRef,
        filter: &AttributeFilter,
    ) -> Result<Vec<AttributeRef>, DttError> {
        let ln_type = self.library.require_ln_node_type(&ln.ln_type)?;
        let ln = complete_ln(ln, ln_type);
        let mut walk = Walk::new(self.library, &ln, "", Some(filter));

        let (do_name, sdo_prefix) = match filter.do_path.split_first() {
            Some((name, rest)) => (Some(name.as_str()), rest),
            None => (None, &[][..]),
        };
        for do_ref in &ln_type.dos {
            if do_name.is_some_and(|n| n != do_ref.name) {
                continue;
            }
            let do_type = walk.enter_do(&do_ref.name, &do_ref.type_id)?;
            walk.follow_sdos(do_type, sdo_prefix)?;
            walk.leave_do();
        }

        ctx_trace!(ln, "Filter {:?} selected {} attribute(s)", filter, walk.out.len());
        Ok(walk.out)
    }

    /// Every leaf attribute of an LN, in declaration order.
    pub fn all_attributes(&self, ln: &LnRef) -> Result<Vec<AttributeRef>, DttError> {
        self.filter(ln, &AttributeFilter::all())
    }
}

/// Fills in the LN class from the LNodeType when the caller left it out.
fn complete_ln(ln: &LnRef, ln_type: &LNodeTypeDef) -> LnRef {
    let mut ln = ln.clone();
    if ln.ln_class.is_empty() {
        ln.ln_class = ln_type.ln_class.clone();
    }
    ln
}

/// State of one resolution: the path walked so far and the leaves found.
struct Walk<'a, 'q> {
    library: &'a TypeLibrary,
    ln: &'q LnRef,
    path: &'q str,
    filter: Option<&'q AttributeFilter>,
    /// Types currently being walked, outermost first.
    stack: Vec<(TypeKind, &'a str)>,
    do_path: Vec<DoStep>,
    da_path: Vec<String>,
    out: Vec<AttributeRef>,
}

impl<'a, 'q> Walk<'a, 'q> {
    fn new(
        library: &'a TypeLibrary,
        ln: &'q LnRef,
        path: &'q str,
        filter: Option<&'q AttributeFilter>,
    ) -> Self {
        Self {
            library,
            ln,
            path,
            filter,
            stack: Vec::new(),
            do_path: Vec::new(),
            da_path: Vec::new(),
            out: Vec::new(),
        }
    }

    fn invalid(&self, reason: String) -> DttError {
        DttError::InvalidPath {
            path: self.path.to_string(),
            reason,
        }
    }

    fn split_first<'s>(&self, segments: &'s [&'s str]) -> Result<(&'s str, &'s [&'s str]), DttError> {
        segments
            .split_first()
            .map(|(first, rest)| (*first, rest))
            .ok_or_else(|| self.invalid("empty reference".to_string()))
    }

    fn guard(&mut self, kind: TypeKind, id: &'a str) -> Result<(), DttError> {
        if self.stack.contains(&(kind, id)) {
            return Err(DttError::CyclicTypeReference {
                kind,
                id: id.to_string(),
            });
        }
        self.stack.push((kind, id));
        Ok(())
    }

    fn enter_do(&mut self, name: &str, type_id: &str) -> Result<&'a DoTypeDef, DttError> {
        let do_type = self.library.require_do_type(type_id)?;
        self.guard(TypeKind::DoType, &do_type.id)?;
        self.do_path.push(DoStep {
            name: name.to_string(),
            cdc: do_type.cdc.clone(),
        });
        Ok(do_type)
    }

    fn leave_do(&mut self) {
        self.do_path.pop();
        self.stack.pop();
    }

    /// The `type` of a STRUCT or ENUM attribute already on the DA path.
    fn type_id<'d>(&self, attr: &'d AttributeDef, kind: TypeKind) -> Result<&'d str, DttError> {
        attr.type_id.as_deref().ok_or_else(|| {
            let do_names: Vec<&str> = self.do_path.iter().map(|s| s.name.as_str()).collect();
            DttError::MissingTypeId {
                kind,
                attribute: format!("{}.{}.{}", self.ln, do_names.join("."), self.da_path.join(".")),
            }
        })
    }

    fn enter_da_type(&mut self, attr: &AttributeDef) -> Result<&'a DaTypeDef, DttError> {
        let id = self.type_id(attr, TypeKind::DaType)?;
        let da_type = self.library.require_da_type(id)?;
        self.guard(TypeKind::DaType, &da_type.id)?;
        Ok(da_type)
    }

    fn emit(&mut self, attr: &AttributeDef, fc: Fc) -> Result<(), DttError> {
        let type_id = match attr.b_type {
            BasicType::Enum => {
                let id = self.type_id(attr, TypeKind::EnumType)?;
                self.library.require_enum_type(id)?;
                Some(id.to_string())
            }
            _ => None,
        };
        self.out.push(AttributeRef {
            ln: self.ln.clone(),
            do_path: self.do_path.clone(),
            da_path: self.da_path.clone(),
            b_type: attr.b_type,
            fc,
            type_id,
            val_import: attr.val_import,
            val_kind: attr.val_kind,
            values: attr.default_values(),
        });
        Ok(())
    }

    // --- Full-path resolution ---

    fn descend_do_type(&mut self, do_type: &'a DoTypeDef, rest: &[&str]) -> Result<(), DttError> {
        let Some((&segment, tail)) = rest.split_first() else {
            return self.expand_do_type(do_type);
        };

        if let Some(da) = do_type.da_named(segment) {
            ctx_trace!(self.ln, "'{}' is a DA of DOType '{}'", segment, do_type.id);
            self.da_path.push(da.attr.name.clone());
            self.descend_attribute(&da.attr, da.fc, tail)?;
            self.da_path.pop();
            return Ok(());
        }
        if let Some(sdo) = do_type.sdo_named(segment) {
            ctx_trace!(self.ln, "'{}' is an SDO of DOType '{}'", segment, do_type.id);
            let sub_type = self.enter_do(&sdo.name, &sdo.type_id)?;
            self.descend_do_type(sub_type, tail)?;
            self.leave_do();
            return Ok(());
        }
        Err(self.invalid(format!(
            "'{}' is neither a DA nor an SDO of DOType '{}'",
            segment, do_type.id
        )))
    }

    /// `attr` is already on the DA path.
    fn descend_attribute(&mut self, attr: &AttributeDef, fc: Fc, rest: &[&str]) -> Result<(), DttError> {
        if attr.b_type != BasicType::Struct {
            if let Some(segment) = rest.first() {
                return Err(self.invalid(format!(
                    "'{}' is a {} leaf and has no member '{}'",
                    attr.name, attr.b_type, segment
                )));
            }
            return self.emit(attr, fc);
        }

        let da_type = self.enter_da_type(attr)?;
        match rest.split_first() {
            None => self.expand_da_type(da_type, fc)?,
            Some((&segment, tail)) => {
                let bda = da_type.bda_named(segment).ok_or_else(|| {
                    self.invalid(format!("'{}' is not a BDA of DAType '{}'", segment, da_type.id))
                })?;
                self.da_path.push(bda.name.clone());
                self.descend_attribute(bda, fc, tail)?;
                self.da_path.pop();
            }
        }
        self.stack.pop();
        Ok(())
    }

    // --- Expansion ---

    fn follow_sdos(&mut self, do_type: &'a DoTypeDef, prefix: &[String]) -> Result<(), DttError> {
        let Some((name, tail)) = prefix.split_first() else {
            return self.expand_do_type(do_type);
        };
        match do_type.sdo_named(name) {
            Some(sdo) => {
                let sub_type = self.enter_do(&sdo.name, &sdo.type_id)?;
                self.follow_sdos(sub_type, tail)?;
                self.leave_do();
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn expand_do_type(&mut self, do_type: &'a DoTypeDef) -> Result<(), DttError> {
        for child in &do_type.children {
            match child {
                DoChild::Da(da) => {
                    if self.filter.is_some_and(|f| !f.accepts_da(da.name(), da.fc)) {
                        continue;
                    }
                    self.da_path.push(da.attr.name.clone());
                    self.expand_attribute(&da.attr, da.fc)?;
                    self.da_path.pop();
                }
                DoChild::Sdo(sdo) => {
                    let sub_type = self.enter_do(&sdo.name, &sdo.type_id)?;
                    self.expand_do_type(sub_type)?;
                    self.leave_do();
                }
            }
        }
        Ok(())
    }

    fn expand_attribute(&mut self, attr: &AttributeDef, fc: Fc) -> Result<(), DttError> {
        if attr.b_type != BasicType::Struct {
            return self.emit(attr, fc);
        }
        let da_type = self.enter_da_type(attr)?;
        self.expand_da_type(da_type, fc)?;
        self.stack.pop();
        Ok(())
    }

    fn expand_da_type(&mut self, da_type: &'a DaTypeDef, fc: Fc) -> Result<(), DttError> {
        let depth = self.da_path.len();
        for bda in &da_type.bdas {
            if self.filter.is_some_and(|f| !f.accepts_bda(depth, &bda.name)) {
                continue;
            }
            self.da_path.push(bda.name.clone());
            self.expand_attribute(bda, fc)?;
            self.da_path.pop();
        }
        Ok(())
    }
}
