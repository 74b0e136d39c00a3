// crates/scl-dtt/tests/common/mod.rs

#![allow(dead_code)]

use scl_dtt::library::defs::{
    AttributeDef, DaDef, DaTypeDef, DoRef, DoTypeDef, EnumTypeDef, LNodeTypeDef, SdoDef, Val,
};
use scl_dtt::{BasicType, Cdc, Fc, TypeLibrary};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn da(name: &str, b_type: BasicType, fc: Fc) -> DaDef {
    DaDef::new(AttributeDef::new(name, b_type), fc)
}

fn typed_da(name: &str, b_type: BasicType, type_id: &str, fc: Fc) -> DaDef {
    DaDef::new(AttributeDef::new(name, b_type).with_type(type_id), fc)
}

/// A protection IED's templates: LLN0, a PTOC with settings and an MMXU with measurements.
pub fn protection_library() -> TypeLibrary {
    protection_library_with_ctl_model("status-only")
}

/// Same templates, with another default for `Mod.ctlModel`.
pub fn protection_library_with_ctl_model(ctl_model: &str) -> TypeLibrary {
    let mut lib = TypeLibrary::new();

    lib.insert_enum_type(
        EnumTypeDef::new("BehaviourModeKind")
            .with_value(1, "on")
            .with_value(2, "on-blocked")
            .with_value(3, "test")
            .with_value(4, "test/blocked")
            .with_value(5, "off"),
    )
    .expect("enum");
    lib.insert_enum_type(
        EnumTypeDef::new("CtlModelKind")
            .with_value(0, "status-only")
            .with_value(1, "direct-with-normal-security")
            .with_value(4, "sbo-with-enhanced-security"),
    )
    .expect("enum");

    lib.insert_da_type(
        DaTypeDef::new("AnalogueValue")
            .with_bda(AttributeDef::new("f", BasicType::Float32).with_val_import(true)),
    )
    .expect("da type");
    lib.insert_da_type(
        DaTypeDef::new("Vector")
            .with_bda(AttributeDef::new("mag", BasicType::Struct).with_type("AnalogueValue"))
            .with_bda(AttributeDef::new("ang", BasicType::Struct).with_type("AnalogueValue")),
    )
    .expect("da type");

    lib.insert_do_type(
        DoTypeDef::new("ENS_Beh", Cdc::Ens)
            .with_da(typed_da("stVal", BasicType::Enum, "BehaviourModeKind", Fc::St))
            .with_da(da("q", BasicType::Quality, Fc::St))
            .with_da(da("t", BasicType::Timestamp, Fc::St)),
    )
    .expect("do type");
    lib.insert_do_type(
        DoTypeDef::new("ENC_Mod", Cdc::Enc)
            .with_da(typed_da("stVal", BasicType::Enum, "BehaviourModeKind", Fc::St))
            .with_da(da("q", BasicType::Quality, Fc::St))
            .with_da(DaDef::new(
                AttributeDef::new("ctlModel", BasicType::Enum)
                    .with_type("CtlModelKind")
                    .with_val_import(true)
                    .with_val(Val::new(ctl_model)),
                Fc::Cf,
            )),
    )
    .expect("do type");
    lib.insert_do_type(
        DoTypeDef::new("ING_Delay", Cdc::Ing)
            .with_da(DaDef::new(
                AttributeDef::new("setVal", BasicType::Int32)
                    .with_val_import(true)
                    .with_val(Val::in_group(1, "100"))
                    .with_val(Val::in_group(2, "200")),
                Fc::Sp,
            ))
            .with_da(DaDef::new(
                AttributeDef::new("minVal", BasicType::Int32).with_val(Val::new("0")),
                Fc::Cf,
            ))
            .with_da(DaDef::new(
                AttributeDef::new("maxVal", BasicType::Int32).with_val(Val::new("60000")),
                Fc::Cf,
            ))
            .with_da(DaDef::new(
                AttributeDef::new("stepSize", BasicType::Int32U).with_val(Val::new("10")),
                Fc::Cf,
            )),
    )
    .expect("do type");
    lib.insert_do_type(
        DoTypeDef::new("CMV_Phs", Cdc::Cmv)
            .with_da(typed_da("cVal", BasicType::Struct, "Vector", Fc::Mx))
            .with_da(da("q", BasicType::Quality, Fc::Mx)),
    )
    .expect("do type");
    lib.insert_do_type(
        DoTypeDef::new("WYE_A", Cdc::Wye)
            .with_sdo(SdoDef::new("phsA", "CMV_Phs"))
            .with_sdo(SdoDef::new("phsB", "CMV_Phs"))
            .with_sdo(SdoDef::new("phsC", "CMV_Phs")),
    )
    .expect("do type");

    lib.insert_ln_node_type(
        LNodeTypeDef::new("LLN0_Prot", "LLN0")
            .with_do(DoRef::new("Beh", "ENS_Beh"))
            .with_do(DoRef::new("Mod", "ENC_Mod")),
    )
    .expect("ln type");
    lib.insert_ln_node_type(
        LNodeTypeDef::new("PTOC_Prot", "PTOC")
            .with_do(DoRef::new("Beh", "ENS_Beh"))
            .with_do(DoRef::new("Mod", "ENC_Mod"))
            .with_do(DoRef::new("OpDlTmms", "ING_Delay")),
    )
    .expect("ln type");
    lib.insert_ln_node_type(
        LNodeTypeDef::new("MMXU_Meas", "MMXU")
            .with_do(DoRef::new("Beh", "ENS_Beh"))
            .with_do(DoRef::new("A", "WYE_A")),
    )
    .expect("ln type");

    lib
}
