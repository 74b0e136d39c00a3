// crates/scl-dtt-xml/src/parser.rs

use crate::converter::{ln_label, to_ln_instance, to_type_library};
use crate::document::{LocatedLn, SclDocument};
use crate::error::SclXmlError;
use crate::model::{self, LDevice};
use alloc::vec::Vec;
use log::{debug, trace};
use scl_dtt::TypeLibrary;

/// Parses an SCL document and builds the `TypeLibrary` of its `<DataTypeTemplates>`.
///
/// # Errors
/// Returns an `SclXmlError` if the XML is malformed, the section is missing,
/// an attribute holds an unknown literal, or an id is defined twice.
pub fn load_templates_from_str(xml_content: &str) -> Result<TypeLibrary, SclXmlError> {
    let scl: model::Scl = quick_xml::de::from_str(xml_content)?;
    templates_of(&scl)
}

/// Parses an SCL document and extracts the instance tree of every logical node,
/// located by IED name and LDevice inst.
pub fn load_ln_instances_from_str(xml_content: &str) -> Result<Vec<LocatedLn>, SclXmlError> {
    let scl: model::Scl = quick_xml::de::from_str(xml_content)?;
    located_lns(&scl)
}

/// Parses an SCL document into its templates and logical-node instances.
pub fn load_scl_from_str(xml_content: &str) -> Result<SclDocument, SclXmlError> {
    let scl: model::Scl = quick_xml::de::from_str(xml_content)?;
    Ok(SclDocument {
        templates: templates_of(&scl)?,
        lns: located_lns(&scl)?,
    })
}

fn templates_of(scl: &model::Scl) -> Result<TypeLibrary, SclXmlError> {
    let dtt = scl
        .data_type_templates
        .as_ref()
        .ok_or(SclXmlError::MissingElement {
            element: "DataTypeTemplates",
        })?;
    to_type_library(dtt)
}

fn located_lns(scl: &model::Scl) -> Result<Vec<LocatedLn>, SclXmlError> {
    let mut lns = Vec::new();
    for ied in &scl.ieds {
        let before = lns.len();
        let ldevices = ied
            .access_points
            .iter()
            .filter_map(|ap| ap.server.as_ref())
            .flat_map(|server| &server.ldevices);
        for ldevice in ldevices {
            collect_ldevice(&ied.name, ldevice, &mut lns)?;
        }
        debug!("IED {}: {} logical nodes", ied.name, lns.len() - before);
    }
    Ok(lns)
}

fn collect_ldevice(ied_name: &str, ldevice: &LDevice, out: &mut Vec<LocatedLn>) -> Result<(), SclXmlError> {
    for ln in ldevice.ln0.iter().chain(&ldevice.lns) {
        trace!("Loading {} {}/{} ({} DOI)", ied_name, ldevice.inst, ln_label(ln), ln.dois.len());
        out.push(LocatedLn {
            ied_name: ied_name.into(),
            ld_inst: ldevice.inst.clone(),
            ln: to_ln_instance(ln)?,
        });
    }
    Ok(())
}
