// crates/scl-dtt-xml/tests/parsing.rs

use scl_dtt::{
    AttributeFilter, BasicType, Bound, Cdc, DttError, InstanceTracker, MatchState, TypeKind,
    TypePathResolver, instance_attributes,
};
use scl_dtt_xml::{
    SclXmlError, load_ln_instances_from_str, load_scl_from_str, load_templates_from_str,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Helper function to load a test file from the `tests/data/` directory.
fn load_test_file(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_load_templates() {
    init_logging();
    let xml_content = load_test_file("protection.scd");
    let lib = load_templates_from_str(&xml_content).expect("Failed to load templates");

    assert_eq!(lib.len(TypeKind::LNodeType), 3);
    assert_eq!(lib.len(TypeKind::DoType), 5);
    assert_eq!(lib.len(TypeKind::DaType), 2);
    assert_eq!(lib.len(TypeKind::EnumType), 2);
    assert!(lib.dangling_references().is_empty());

    // The <Private> and the <DA> children of ENC_Mod are both kept.
    let enc_mod = lib.do_type("ENC_Mod").expect("ENC_Mod missing");
    assert_eq!(enc_mod.cdc, Cdc::Enc);
    assert_eq!(enc_mod.privates.len(), 1);
    assert_eq!(enc_mod.privates[0].kind, "test-tool");

    assert_eq!(
        lib.enum_values("CtlModelKind").expect("CtlModelKind missing"),
        ["status-only", "direct-with-normal-security", "sbo-with-enhanced-security"]
    );
}

#[test]
fn test_loaded_templates_resolve() {
    let xml_content = load_test_file("protection.scd");
    let lib = load_templates_from_str(&xml_content).expect("Failed to load templates");
    let resolver = TypePathResolver::new(&lib);
    let ln = scl_dtt::LnRef::new("PTOC", "1", "PTOC_Prot").with_prefix("I");

    let set_val = resolver
        .resolve_one(&ln, "OpDlTmms.setVal")
        .expect("Failed to resolve setVal");
    assert_eq!(set_val.b_type, BasicType::Int32);
    assert!(set_val.val_import);
    assert_eq!(set_val.value(1), Some("100"));
    assert_eq!(set_val.value(2), Some("200"));
    assert_eq!(set_val.value(0), None);

    let ctl_model = resolver
        .resolve_one(&ln, "Mod.ctlModel")
        .expect("Failed to resolve ctlModel");
    assert_eq!(ctl_model.enum_type_id(), Some("CtlModelKind"));
    assert_eq!(ctl_model.value(0), Some("status-only"));
}

#[test]
fn test_load_ln_instances() {
    init_logging();
    let xml_content = load_test_file("protection.scd");
    let lns = load_ln_instances_from_str(&xml_content).expect("Failed to load instances");

    let paths: Vec<String> = lns.iter().map(|l| l.ln_path()).collect();
    assert_eq!(paths, ["LDPROT/LLN0", "LDPROT/IPTOC1", "LDPROT/MMXU1"]);
    assert!(lns.iter().all(|l| l.ied_name == "IED_PROT"));

    let lln0 = &lns[0].ln;
    assert!(lln0.ln().is_ln0());
    assert_eq!(lln0.dai_refs(), ["Beh.stVal", "Mod.ctlModel"]);

    let ptoc = &lns[1].ln;
    assert_eq!(ptoc.ln().prefix, "I");
    assert_eq!(ptoc.ln().ln_type, "PTOC_Prot");

    let mmxu = &lns[2].ln;
    assert_eq!(mmxu.dai_refs(), ["A.phsA.cVal.mag.f"]);
}

#[test]
fn test_instance_values_keyed_by_setting_group() {
    let xml_content = load_test_file("protection.scd");
    let doc = load_scl_from_str(&xml_content).expect("Failed to load document");
    let located = doc
        .find_ln("IED_PROT", "LDPROT", "IPTOC1")
        .expect("IPTOC1 missing");
    let resolver = TypePathResolver::new(&doc.templates);
    let attr = resolver
        .resolve_one(located.ln.ln(), "OpDlTmms.setVal")
        .expect("Failed to resolve setVal");

    let tracker = InstanceTracker::new(&attr);
    assert_eq!(tracker.search(&located.ln), MatchState::FullMatch);
    let handle = tracker.locate(&located.ln).expect("setVal DAI missing");
    let dai = located.ln.dai(handle).expect("Handle does not designate a DAI");
    assert_eq!(dai.val_import, None);
    assert_eq!(dai.values.get(&1).map(String::as_str), Some("100"));
    assert_eq!(dai.values.get(&2).map(String::as_str), Some("250"));
    assert!(!dai.values.contains_key(&0));
}

/// `valImport="false"` on the LLN0's ctlModel DAI overrides the template.
#[test]
fn test_dai_val_import_overrides_template() {
    init_logging();
    let xml_content = load_test_file("protection.scd");
    let doc = load_scl_from_str(&xml_content).expect("Failed to load document");
    let lln0 = doc.find_ln("IED_PROT", "LDPROT", "LLN0").expect("LLN0 missing");

    let updatable: Vec<String> =
        instance_attributes(&doc.templates, &lln0.ln, &AttributeFilter::all(), true)
            .expect("Failed to list attributes")
            .iter()
            .map(|a| a.data_ref())
            .collect();
    assert_eq!(updatable, ["Mod.stVal"]);

    let resolver = TypePathResolver::new(&doc.templates);
    let ctl_model = resolver
        .resolve_one(lln0.ln.ln(), "Mod.ctlModel")
        .expect("Failed to resolve ctlModel");
    assert!(ctl_model.val_import, "The template itself allows import");
    assert!(!InstanceTracker::new(&ctl_model).is_updatable_on(&lln0.ln));
}

#[test]
fn test_update_refused_on_val_import_false() {
    let xml_content = load_test_file("protection.scd");
    let mut doc = load_scl_from_str(&xml_content).expect("Failed to load document");
    let ln_ref = doc
        .find_ln("IED_PROT", "LDPROT", "LLN0")
        .expect("LLN0 missing")
        .ln
        .ln()
        .clone();
    let attr = TypePathResolver::new(&doc.templates)
        .resolve_one(&ln_ref, "Mod.ctlModel")
        .expect("Failed to resolve ctlModel");

    let lln0 = doc.find_ln_mut("IED_PROT", "LDPROT", "LLN0").expect("LLN0 missing");
    let before = lln0.ln.clone();
    let values: BTreeMap<u32, String> = [(0, "sbo-with-enhanced-security".to_string())].into();
    let result = InstanceTracker::new(&attr).update(&mut lln0.ln, &values);

    assert!(matches!(result, Err(DttError::NotUpdatable { .. })));
    assert_eq!(lln0.ln, before, "A refused update must not touch the instance");
}

#[test]
fn test_validate_instances() {
    init_logging();
    let xml_content = load_test_file("protection.scd");
    let mut doc = load_scl_from_str(&xml_content).expect("Failed to load document");

    let report = doc.validate_instances().expect("Validation aborted");
    assert!(report.is_ok(), "Unexpected issues: {:?}", report.issues());

    // Break the step size of setting group 2.
    let ln_ref = doc
        .find_ln("IED_PROT", "LDPROT", "IPTOC1")
        .expect("IPTOC1 missing")
        .ln
        .ln()
        .clone();
    let attr = TypePathResolver::new(&doc.templates)
        .resolve_one(&ln_ref, "OpDlTmms.setVal")
        .expect("Failed to resolve setVal");
    let ptoc = doc.find_ln_mut("IED_PROT", "LDPROT", "IPTOC1").expect("IPTOC1 missing");
    let values: BTreeMap<u32, String> = [(2, "255".to_string())].into();
    InstanceTracker::new(&attr)
        .update(&mut ptoc.ln, &values)
        .expect("setVal should be updatable");

    let report = doc.validate_instances().expect("Validation aborted");
    assert_eq!(report.issues().len(), 1);
    match &report.issues()[0] {
        DttError::OutOfBound { value, bound, .. } => {
            assert_eq!(value, "255");
            assert!(matches!(bound, Bound::Step(_)));
        }
        other => panic!("Unexpected issue {:?}", other),
    }
}

#[test]
fn test_import_ied_renames_conflicting_types() {
    init_logging();
    let mut doc =
        load_scl_from_str(&load_test_file("protection.scd")).expect("Failed to load protection");
    let source =
        load_scl_from_str(&load_test_file("measurement.scd")).expect("Failed to load measurement");
    let size_before = doc.templates.total_len();

    let report = doc.import_ied(&source, "IED_MEAS").expect("Import failed");

    // ENC_Mod differs (default ctlModel, no <Private>), LLN0_Prot follows it.
    assert_eq!(
        report.renames.get(TypeKind::DoType, "ENC_Mod"),
        Some("IED_MEAS_ENC_Mod")
    );
    assert_eq!(
        report.renames.get(TypeKind::LNodeType, "LLN0_Prot"),
        Some("IED_MEAS_LLN0_Prot")
    );
    assert_eq!(report.renames.len(), 2);
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 8);
    assert_eq!(doc.templates.total_len(), size_before + 2);

    let renamed = doc
        .templates
        .ln_node_type("IED_MEAS_LLN0_Prot")
        .expect("Renamed LNodeType missing");
    assert_eq!(renamed.dos[1].type_id, "IED_MEAS_ENC_Mod");

    assert_eq!(doc.ied_names(), ["IED_PROT", "IED_MEAS"]);
    let lln0 = doc.find_ln("IED_MEAS", "LDMEAS", "LLN0").expect("Imported LLN0 missing");
    assert_eq!(lln0.ln.ln().ln_type, "IED_MEAS_LLN0_Prot");
    let mmxu = doc.find_ln("IED_MEAS", "LDMEAS", "MMXU1").expect("Imported MMXU1 missing");
    assert_eq!(mmxu.ln.ln().ln_type, "MMXU_Meas");

    // The original IED still uses the original types.
    let own = doc.find_ln("IED_PROT", "LDPROT", "LLN0").expect("LLN0 missing");
    assert_eq!(own.ln.ln().ln_type, "LLN0_Prot");

    let report = doc.validate_instances().expect("Validation aborted");
    assert!(report.is_ok(), "Unexpected issues: {:?}", report.issues());
}

#[test]
fn test_import_ied_twice_is_rejected() {
    let mut doc =
        load_scl_from_str(&load_test_file("protection.scd")).expect("Failed to load protection");
    let source =
        load_scl_from_str(&load_test_file("measurement.scd")).expect("Failed to load measurement");

    doc.import_ied(&source, "IED_MEAS").expect("First import failed");
    let size = doc.templates.total_len();
    let result = doc.import_ied(&source, "IED_MEAS");

    assert!(matches!(result, Err(SclXmlError::DuplicateIed { ref name }) if name == "IED_MEAS"));
    assert_eq!(doc.templates.total_len(), size);
}

#[test]
fn test_import_unknown_ied() {
    let mut doc =
        load_scl_from_str(&load_test_file("protection.scd")).expect("Failed to load protection");
    let source =
        load_scl_from_str(&load_test_file("measurement.scd")).expect("Failed to load measurement");

    let result = doc.import_ied(&source, "IED_NONE");
    assert!(matches!(
        result,
        Err(SclXmlError::MissingElement { element: "IED" })
    ));
}
