// crates/scl-dtt-xml/src/document.rs

//! A loaded SCL document: its type library and its logical-node instances.

use crate::error::SclXmlError;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::info;
use scl_dtt::{
    AttributeFilter, InstanceTracker, LnInstance, MergeReport, TemplateMerger, TypeLibrary,
    ValidationReport, instance_attributes,
};

/// A logical node instance and where it lives in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLn {
    pub ied_name: String,
    pub ld_inst: String,
    pub ln: LnInstance,
}

impl LocatedLn {
    /// `ldInst/LN`, e.g. `LDPROT/PTOC1` or `LDPROT/LLN0`.
    pub fn ln_path(&self) -> String {
        alloc::format!("{}/{}", self.ld_inst, self.ln.ln().name())
    }
}

/// The parts of an SCL document the template engine works on.
#[derive(Debug, Clone, Default)]
pub struct SclDocument {
    pub templates: TypeLibrary,
    pub lns: Vec<LocatedLn>,
}

impl SclDocument {
    /// Names of the IEDs that hold logical nodes, in document order.
    pub fn ied_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for ln in &self.lns {
            if !names.contains(&ln.ied_name.as_str()) {
                names.push(&ln.ied_name);
            }
        }
        names
    }

    pub fn lns_of<'a>(&'a self, ied_name: &'a str) -> impl Iterator<Item = &'a LocatedLn> + 'a {
        self.lns.iter().filter(move |l| l.ied_name == ied_name)
    }

    /// The logical node `ld_inst/ln_name` of an IED, `ln_name` being e.g. `LLN0` or `ProtPTOC1`.
    pub fn find_ln(&self, ied_name: &str, ld_inst: &str, ln_name: &str) -> Option<&LocatedLn> {
        self.lns.iter().find(|l| {
            l.ied_name == ied_name && l.ld_inst == ld_inst && l.ln.ln().name() == ln_name
        })
    }

    pub fn find_ln_mut(&mut self, ied_name: &str, ld_inst: &str, ln_name: &str) -> Option<&mut LocatedLn> {
        self.lns.iter_mut().find(|l| {
            l.ied_name == ied_name && l.ld_inst == ld_inst && l.ln.ln().name() == ln_name
        })
    }

    /// Imports the IED `ied_name` of `source` into this document.
    ///
    /// The source templates are merged with `ied_name` as rename prefix, then the
    /// IED's logical nodes are appended with their `lnType` following any rename.
    ///
    /// # Errors
    /// `MissingElement` if `source` has no logical node for `ied_name`,
    /// `DuplicateIed` if this document already has one, and `Library` for
    /// inconsistent source templates.
    pub fn import_ied(&mut self, source: &SclDocument, ied_name: &str) -> Result<MergeReport, SclXmlError> {
        if self.lns.iter().any(|l| l.ied_name == ied_name) {
            return Err(SclXmlError::DuplicateIed {
                name: ied_name.to_string(),
            });
        }
        let imported: Vec<&LocatedLn> = source.lns_of(ied_name).collect();
        if imported.is_empty() {
            return Err(SclXmlError::MissingElement { element: "IED" });
        }

        let report = TemplateMerger::new(ied_name).merge(&mut self.templates, &source.templates)?;
        for located in imported {
            let mut located = located.clone();
            let ln_type = report.ln_type(&located.ln.ln().ln_type).to_string();
            located.ln.set_ln_type(&ln_type);
            self.lns.push(located);
        }
        info!(
            "Imported IED {}: {} types added, {} renamed",
            ied_name,
            report.imported,
            report.renames.len()
        );
        Ok(report)
    }

    /// Validates every instantiated value of every logical node against the templates.
    ///
    /// Value defects are collected. A logical node whose type cannot be
    /// resolved aborts with `Library`.
    pub fn validate_instances(&self) -> Result<ValidationReport, SclXmlError> {
        let mut report = ValidationReport::new();
        for located in &self.lns {
            let attrs = instance_attributes(&self.templates, &located.ln, &AttributeFilter::all(), false)?;
            for attr in &attrs {
                let tracker = InstanceTracker::new(attr);
                if let Some(handle) = tracker.locate(&located.ln) {
                    report.extend(tracker.validate_bounded_dai(&self.templates, &located.ln, handle)?);
                }
            }
        }
        Ok(report)
    }
}
