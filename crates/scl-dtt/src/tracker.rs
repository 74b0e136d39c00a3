// crates/scl-dtt/src/tracker.rs
//! Lockstep walk of a logical node's instance tree along a resolved attribute.

use crate::attribute::{AttributeFilter, AttributeRef};
use crate::error::{DttError, ValidationReport};
use crate::instance::{DaiHandle, InstanceId, LnInstance};
use crate::library::TypeLibrary;
use crate::log::{ctx_debug, ctx_trace, ctx_warn};
use crate::resolver::TypePathResolver;
use crate::types::NO_SETTING_GROUP;
use crate::validator::{parse_numeric, NumericRange, ValueValidator};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Outcome of walking an instance tree along an attribute's DO and DA path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Every DO, SDO, DA and BDA has an instance node.
    FullMatch,
    /// The DOI exists but some SDI or DAI below it does not.
    PartialMatch,
    /// The logical node has no DOI for the attribute's DO.
    Failed,
}

/// Result of a read-only walk.
enum Walked {
    Full(DaiHandle),
    Partial,
    Failed,
}

/// Tracks one resolved attribute through logical-node instances.
#[derive(Debug, Clone, Copy)]
pub struct InstanceTracker<'r> {
    attr: &'r AttributeRef,
}

impl<'r> InstanceTracker<'r> {
    pub fn new(attr: &'r AttributeRef) -> Self {
        Self { attr }
    }

    pub fn attribute(&self) -> &'r AttributeRef {
        self.attr
    }

    /// Names of the SDIs below the DOI, then below the SDI of a structured DA, and the DAI name.
    fn inner_path(&self) -> (Vec<&'r str>, &'r str) {
        let mut sdis: Vec<&str> = self.attr.do_path.iter().skip(1).map(|s| s.name.as_str()).collect();
        let (dai, structs) = match self.attr.da_path.split_last() {
            Some((last, structs)) => (last.as_str(), structs),
            None => ("", &[][..]),
        };
        sdis.extend(structs.iter().map(String::as_str));
        (sdis, dai)
    }

    fn walk(&self, ln: &LnInstance) -> Walked {
        let Some(mut parent) = ln.doi(self.attr.do_name()) else {
            return Walked::Failed;
        };
        let (sdis, dai) = self.inner_path();
        for name in sdis {
            match ln.child_sdi(parent, name) {
                Some(id) => parent = id,
                None => return Walked::Partial,
            }
        }
        match ln.child_dai(parent, dai) {
            Some(handle) => Walked::Full(handle),
            None => Walked::Partial,
        }
    }

    /// Classifies how much of the attribute's path is instantiated. Read-only.
    pub fn search(&self, ln: &LnInstance) -> MatchState {
        let state = match self.walk(ln) {
            Walked::Full(_) => MatchState::FullMatch,
            Walked::Partial => MatchState::PartialMatch,
            Walked::Failed => MatchState::Failed,
        };
        ctx_trace!(ln.ln(), "{} -> {:?}", self.attr.data_ref(), state);
        state
    }

    /// The DAI of the attribute, when the whole path is instantiated.
    pub fn locate(&self, ln: &LnInstance) -> Option<DaiHandle> {
        match self.walk(ln) {
            Walked::Full(handle) => Some(handle),
            _ => None,
        }
    }

    /// Returns the attribute's DAI, creating the missing DOI, SDI and DAI nodes.
    ///
    /// Existing nodes are reused as they are. A new DAI takes its `valImport`
    /// from the attribute's updatability.
    pub fn create_if_absent(&self, ln: &mut LnInstance) -> Result<DaiHandle, DttError> {
        let mut parent = match ln.doi(self.attr.do_name()) {
            Some(id) => id,
            None => {
                ctx_debug!(ln.ln(), "Creating DOI {}", self.attr.do_name());
                ln.add_doi(self.attr.do_name())
            }
        };
        let (sdis, dai) = self.inner_path();
        for name in sdis {
            parent = match ln.child_sdi(parent, name) {
                Some(id) => id,
                None => {
                    self.check_free(ln, parent, name)?;
                    ctx_debug!(ln.ln(), "Creating SDI {} for {}", name, self.attr.data_ref());
                    ln.add_sdi(parent, name)?
                }
            };
        }
        match ln.child_dai(parent, dai) {
            Some(handle) => Ok(handle),
            None => {
                self.check_free(ln, parent, dai)?;
                ctx_debug!(ln.ln(), "Creating DAI {}", self.attr.data_ref());
                ln.add_dai(parent, dai, Some(self.attr.is_updatable()))
            }
        }
    }

    /// Fails if `parent` already has a child of another kind named `name`.
    fn check_free(&self, ln: &LnInstance, parent: InstanceId, name: &str) -> Result<(), DttError> {
        match ln.child(parent, name) {
            Some(_) => Err(DttError::InvalidInstanceNode {
                name: name.to_string(),
                reason: "an instance node of another kind already uses this name",
            }),
            None => Ok(()),
        }
    }

    /// Whether the attribute accepts new values on this instance, once the
    /// instance's explicit `valImport` overrides the template's.
    pub fn is_updatable_on(&self, ln: &LnInstance) -> bool {
        let explicit = self.locate(ln).and_then(|h| ln.dai(h)).and_then(|d| d.val_import);
        match explicit {
            Some(val_import) => {
                self.attr.is_mod_st_val() || (val_import && self.attr.fc.is_importable())
            }
            None => self.attr.is_updatable(),
        }
    }

    /// Writes values into the attribute's DAI, creating it if needed.
    ///
    /// Refused with `NotUpdatable` when the attribute does not accept values.
    /// When several values are given and one has no setting group, only that one is written.
    pub fn update(
        &self,
        ln: &mut LnInstance,
        values: &BTreeMap<u32, String>,
    ) -> Result<DaiHandle, DttError> {
        if !self.is_updatable_on(ln) {
            ctx_warn!(ln.ln(), "Refusing to update {}: value import not allowed", self.attr.data_ref());
            return Err(DttError::NotUpdatable {
                attribute: self.attr.to_string(),
            });
        }
        let handle = self.create_if_absent(ln)?;
        let only_ungrouped = values.len() > 1 && values.contains_key(&NO_SETTING_GROUP);
        for (&s_group, value) in values {
            if only_ungrouped && s_group != NO_SETTING_GROUP {
                continue;
            }
            ln.set_value(handle, s_group, value)?;
        }
        Ok(handle)
    }

    /// Validates every value held by the DAI behind `handle`.
    ///
    /// Enum membership and numeric kind are always checked. For `ING` and `ASG`
    /// settings the `minVal`, `maxVal` and `stepSize` of the same DO bound the
    /// value, instance values taking precedence over template defaults.
    pub fn validate_bounded_dai(
        &self,
        library: &TypeLibrary,
        ln: &LnInstance,
        handle: DaiHandle,
    ) -> Result<ValidationReport, DttError> {
        let dai = ln.dai(handle).ok_or_else(|| DttError::InvalidInstanceNode {
            name: self.attr.data_ref(),
            reason: "handle does not designate a DAI of this logical node",
        })?;
        let validator = ValueValidator::new(library);
        let mut report = ValidationReport::new();

        let range = if self.attr.cdc().is_some_and(|c| c.has_bounded_setting()) {
            let (range, bound_issues) = self.setting_range(library, ln)?;
            report.extend(bound_issues);
            Some(range)
        } else {
            None
        };
        ctx_trace!(ln.ln(), "Validating {} against {:?}", self.attr.data_ref(), range);

        report.extend(validator.check_values(self.attr, &dai.values, range.as_ref())?);
        Ok(report)
    }

    fn setting_range(
        &self,
        library: &TypeLibrary,
        ln: &LnInstance,
    ) -> Result<(NumericRange, ValidationReport), DttError> {
        let filter = AttributeFilter {
            do_path: self.attr.do_path.iter().map(|s| s.name.clone()).collect(),
            ..AttributeFilter::default()
        };
        let siblings = TypePathResolver::new(library).filter(&self.attr.ln, &filter)?;
        let mut issues = ValidationReport::new();
        let mut bound = |name: &str| -> Option<f64> {
            let sibling = siblings.iter().find(|s| {
                s.do_path.len() == self.attr.do_path.len() && s.da_name() == name && s.b_type.is_numeric()
            })?;
            let instance_values = InstanceTracker::new(sibling)
                .locate(ln)
                .and_then(|h| ln.dai(h))
                .map(|d| &d.values)
                .filter(|v| !v.is_empty());
            let literal = instance_values.unwrap_or(&sibling.values).values().next()?;
            match parse_numeric(sibling, literal) {
                Ok(number) => number,
                Err(e) => {
                    issues.push(e);
                    None
                }
            }
        };
        let range = NumericRange {
            min: bound("minVal"),
            max: bound("maxVal"),
            step: bound("stepSize"),
        };
        Ok((range, issues))
    }
}

/// Template attributes of a logical node, overlaid with its instance values.
///
/// A DAI's explicit `valImport` and its values replace the template's. A
/// setting-group attribute holding only values without `sGroup` is reported
/// and treated as not importable. With `updatable_only`, attributes that do
/// not accept values are left out.
pub fn instance_attributes(
    library: &TypeLibrary,
    ln: &LnInstance,
    filter: &AttributeFilter,
    updatable_only: bool,
) -> Result<Vec<AttributeRef>, DttError> {
    let mut attrs = TypePathResolver::new(library).filter(ln.ln(), filter)?;
    for attr in &mut attrs {
        let dai = InstanceTracker::new(attr).locate(ln).and_then(|h| ln.dai(h));
        if let Some(dai) = dai {
            if let Some(val_import) = dai.val_import {
                attr.val_import = val_import;
            }
            if !dai.values.is_empty() {
                attr.values = dai.values.clone();
            }
        }
        let ungrouped_only = !attr.values.is_empty()
            && attr.values.keys().all(|&k| k == NO_SETTING_GROUP);
        if attr.fc.is_setting_group() && attr.val_import && ungrouped_only {
            ctx_warn!(
                ln.ln(),
                "{} is a setting-group attribute without setting-group values; not importable",
                attr.data_ref()
            );
            attr.val_import = false;
        }
    }
    if updatable_only {
        attrs.retain(AttributeRef::is_updatable);
    }
    Ok(attrs)
}
