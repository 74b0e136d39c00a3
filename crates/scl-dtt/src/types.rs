// crates/scl-dtt/src/types.rs
//! Vocabulary shared by every layer: definition kinds, basic types,
//! functional constraints, common data classes and value kinds.
//!
//! Each enum parses from and displays as its SCL token, so the loader can
//! hand attribute text straight to `FromStr` and report the rejected token
//! on failure. Tokens outside the standard sets (private CDCs, for example)
//! are kept rather than rejected where the schema allows extension.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

// --- Limits ---

/// Maximum length, in characters, of a type identifier generated during a merge.
pub const MAX_TYPE_ID_LEN: usize = 255;

/// Setting-group key used for values that carry no `sGroup` attribute.
pub const NO_SETTING_GROUP: u32 = 0;

// --- Definition Kinds ---

/// The four kinds of definitions stored in a `DataTypeTemplates` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    LNodeType,
    DoType,
    DaType,
    EnumType,
}

impl TypeKind {
    /// All kinds, in merge dependency order.
    pub const MERGE_ORDER: [TypeKind; 4] = [
        TypeKind::EnumType,
        TypeKind::DaType,
        TypeKind::DoType,
        TypeKind::LNodeType,
    ];

    /// The SCL element name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::LNodeType => "LNodeType",
            TypeKind::DoType => "DOType",
            TypeKind::DaType => "DAType",
            TypeKind::EnumType => "EnumType",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known SCL enumeration literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTypeError {
    /// The SCL attribute being parsed (e.g. "bType").
    pub attribute: &'static str,
    pub value: String,
}

impl fmt::Display for ParseTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} literal '{}'", self.attribute, self.value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseTypeError {}

// --- Basic Types (IEC 61850-6 tPredefinedBasicTypeEnum) ---

/// How a numeric basic type is parsed and bounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericKind {
    /// Integer kinds, with the inclusive range of the type.
    Integer { min: i128, max: i128 },
    Float32,
    Float64,
    /// A coded value with symbolic names (Dbpos, Tcmd) and numeric codes `0..=3`.
    Coded(&'static [&'static str; 4]),
}

const DBPOS_NAMES: [&str; 4] = ["intermediate", "off", "on", "bad"];
const TCMD_NAMES: [&str; 4] = ["stop", "lower", "higher", "reserved"];

/// The `bType` of a DA or BDA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BasicType {
    Boolean,
    Int8,
    Int16,
    Int24,
    Int32,
    Int64,
    Int128,
    Int8U,
    Int16U,
    Int24U,
    Int32U,
    Float32,
    Float64,
    Enum,
    Dbpos,
    Tcmd,
    Quality,
    Timestamp,
    VisString32,
    VisString64,
    VisString65,
    VisString129,
    VisString255,
    Octet64,
    Unicode255,
    Struct,
    EntryTime,
    Check,
    ObjRef,
    Currency,
    PhyComAddr,
    TrgOps,
    OptFlds,
    SvOptFlds,
    LogOptFlds,
    EntryId,
    Octet6,
    Octet16,
}

impl BasicType {
    /// The SCL literal of this basic type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicType::Boolean => "BOOLEAN",
            BasicType::Int8 => "INT8",
            BasicType::Int16 => "INT16",
            BasicType::Int24 => "INT24",
            BasicType::Int32 => "INT32",
            BasicType::Int64 => "INT64",
            BasicType::Int128 => "INT128",
            BasicType::Int8U => "INT8U",
            BasicType::Int16U => "INT16U",
            BasicType::Int24U => "INT24U",
            BasicType::Int32U => "INT32U",
            BasicType::Float32 => "FLOAT32",
            BasicType::Float64 => "FLOAT64",
            BasicType::Enum => "Enum",
            BasicType::Dbpos => "Dbpos",
            BasicType::Tcmd => "Tcmd",
            BasicType::Quality => "Quality",
            BasicType::Timestamp => "Timestamp",
            BasicType::VisString32 => "VisString32",
            BasicType::VisString64 => "VisString64",
            BasicType::VisString65 => "VisString65",
            BasicType::VisString129 => "VisString129",
            BasicType::VisString255 => "VisString255",
            BasicType::Octet64 => "Octet64",
            BasicType::Unicode255 => "Unicode255",
            BasicType::Struct => "Struct",
            BasicType::EntryTime => "EntryTime",
            BasicType::Check => "Check",
            BasicType::ObjRef => "ObjRef",
            BasicType::Currency => "Currency",
            BasicType::PhyComAddr => "PhyComAddr",
            BasicType::TrgOps => "TrgOps",
            BasicType::OptFlds => "OptFlds",
            BasicType::SvOptFlds => "SvOptFlds",
            BasicType::LogOptFlds => "LogOptFlds",
            BasicType::EntryId => "EntryID",
            BasicType::Octet6 => "Octet6",
            BasicType::Octet16 => "Octet16",
        }
    }

    /// Returns the numeric parsing rules for this type, or `None` for non-numeric types.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        let kind = match self {
            BasicType::Int8 => NumericKind::Integer { min: i8::MIN as i128, max: i8::MAX as i128 },
            BasicType::Int16 => NumericKind::Integer { min: i16::MIN as i128, max: i16::MAX as i128 },
            BasicType::Int24 => NumericKind::Integer { min: -(1 << 23), max: (1 << 23) - 1 },
            BasicType::Int32 => NumericKind::Integer { min: i32::MIN as i128, max: i32::MAX as i128 },
            BasicType::Int64 => NumericKind::Integer { min: i64::MIN as i128, max: i64::MAX as i128 },
            BasicType::Int128 => NumericKind::Integer { min: i128::MIN, max: i128::MAX },
            BasicType::Int8U => NumericKind::Integer { min: 0, max: u8::MAX as i128 },
            BasicType::Int16U => NumericKind::Integer { min: 0, max: u16::MAX as i128 },
            BasicType::Int24U => NumericKind::Integer { min: 0, max: (1 << 24) - 1 },
            BasicType::Int32U => NumericKind::Integer { min: 0, max: u32::MAX as i128 },
            BasicType::Float32 => NumericKind::Float32,
            BasicType::Float64 => NumericKind::Float64,
            BasicType::Dbpos => NumericKind::Coded(&DBPOS_NAMES),
            BasicType::Tcmd => NumericKind::Coded(&TCMD_NAMES),
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }

    /// `true` for the types whose `type` attribute must reference another definition.
    pub fn references_type(&self) -> bool {
        matches!(self, BasicType::Struct | BasicType::Enum)
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasicType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b_type = match s {
            "BOOLEAN" => BasicType::Boolean,
            "INT8" => BasicType::Int8,
            "INT16" => BasicType::Int16,
            "INT24" => BasicType::Int24,
            "INT32" => BasicType::Int32,
            "INT64" => BasicType::Int64,
            "INT128" => BasicType::Int128,
            "INT8U" => BasicType::Int8U,
            "INT16U" => BasicType::Int16U,
            "INT24U" => BasicType::Int24U,
            "INT32U" => BasicType::Int32U,
            "FLOAT32" => BasicType::Float32,
            "FLOAT64" => BasicType::Float64,
            "Enum" => BasicType::Enum,
            "Dbpos" => BasicType::Dbpos,
            "Tcmd" => BasicType::Tcmd,
            "Quality" => BasicType::Quality,
            "Timestamp" => BasicType::Timestamp,
            "VisString32" => BasicType::VisString32,
            "VisString64" => BasicType::VisString64,
            "VisString65" => BasicType::VisString65,
            "VisString129" => BasicType::VisString129,
            "VisString255" => BasicType::VisString255,
            "Octet64" => BasicType::Octet64,
            "Unicode255" => BasicType::Unicode255,
            "Struct" => BasicType::Struct,
            "EntryTime" => BasicType::EntryTime,
            "Check" => BasicType::Check,
            "ObjRef" => BasicType::ObjRef,
            "Currency" => BasicType::Currency,
            "PhyComAddr" => BasicType::PhyComAddr,
            "TrgOps" => BasicType::TrgOps,
            "OptFlds" => BasicType::OptFlds,
            "SvOptFlds" => BasicType::SvOptFlds,
            "LogOptFlds" => BasicType::LogOptFlds,
            "EntryID" => BasicType::EntryId,
            "Octet6" => BasicType::Octet6,
            "Octet16" => BasicType::Octet16,
            _ => {
                return Err(ParseTypeError {
                    attribute: "bType",
                    value: s.to_string(),
                });
            }
        };
        Ok(b_type)
    }
}

// --- Functional Constraints ---

/// The functional constraint (`fc`) of a DA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fc {
    St,
    Mx,
    Co,
    Sp,
    Sg,
    Se,
    Sv,
    Cf,
    Dc,
    Ex,
    Sr,
    Bl,
    Or,
    Br,
    Rp,
    Lg,
    Go,
    Ms,
    Us,
    Xx,
}

impl Fc {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fc::St => "ST",
            Fc::Mx => "MX",
            Fc::Co => "CO",
            Fc::Sp => "SP",
            Fc::Sg => "SG",
            Fc::Se => "SE",
            Fc::Sv => "SV",
            Fc::Cf => "CF",
            Fc::Dc => "DC",
            Fc::Ex => "EX",
            Fc::Sr => "SR",
            Fc::Bl => "BL",
            Fc::Or => "OR",
            Fc::Br => "BR",
            Fc::Rp => "RP",
            Fc::Lg => "LG",
            Fc::Go => "GO",
            Fc::Ms => "MS",
            Fc::Us => "US",
            Fc::Xx => "XX",
        }
    }

    /// Functional constraints whose values may be imported into an instance.
    pub fn is_importable(&self) -> bool {
        matches!(self, Fc::Cf | Fc::Dc | Fc::Sg | Fc::Sp | Fc::St | Fc::Se)
    }

    /// Setting-group constraints, whose values are keyed by `sGroup`.
    pub fn is_setting_group(&self) -> bool {
        matches!(self, Fc::Sg | Fc::Se)
    }
}

impl fmt::Display for Fc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fc {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fc = match s {
            "ST" => Fc::St,
            "MX" => Fc::Mx,
            "CO" => Fc::Co,
            "SP" => Fc::Sp,
            "SG" => Fc::Sg,
            "SE" => Fc::Se,
            "SV" => Fc::Sv,
            "CF" => Fc::Cf,
            "DC" => Fc::Dc,
            "EX" => Fc::Ex,
            "SR" => Fc::Sr,
            "BL" => Fc::Bl,
            "OR" => Fc::Or,
            "BR" => Fc::Br,
            "RP" => Fc::Rp,
            "LG" => Fc::Lg,
            "GO" => Fc::Go,
            "MS" => Fc::Ms,
            "US" => Fc::Us,
            "XX" => Fc::Xx,
            _ => {
                return Err(ParseTypeError {
                    attribute: "fc",
                    value: s.to_string(),
                });
            }
        };
        Ok(fc)
    }
}

// --- Common Data Classes ---

/// The common data class (`cdc`) of a DOType.
///
/// Classes outside the predefined list are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cdc {
    Sps,
    Dps,
    Ins,
    Ens,
    Act,
    Acd,
    Sec,
    Bcr,
    Hst,
    Vss,
    Mv,
    Cmv,
    Sav,
    Wye,
    Del,
    Seq,
    Hmv,
    Hwye,
    Hdel,
    Spc,
    Dpc,
    Inc,
    Enc,
    Bsc,
    Isc,
    Apc,
    Bac,
    Spg,
    Ing,
    Eng,
    Org,
    Tsg,
    Cug,
    Vsg,
    Asg,
    Curve,
    Csg,
    Dpl,
    Lpl,
    Csd,
    Other(String),
}

static PREDEFINED_CDCS: [(&str, Cdc); 40] = [
    ("SPS", Cdc::Sps),
    ("DPS", Cdc::Dps),
    ("INS", Cdc::Ins),
    ("ENS", Cdc::Ens),
    ("ACT", Cdc::Act),
    ("ACD", Cdc::Acd),
    ("SEC", Cdc::Sec),
    ("BCR", Cdc::Bcr),
    ("HST", Cdc::Hst),
    ("VSS", Cdc::Vss),
    ("MV", Cdc::Mv),
    ("CMV", Cdc::Cmv),
    ("SAV", Cdc::Sav),
    ("WYE", Cdc::Wye),
    ("DEL", Cdc::Del),
    ("SEQ", Cdc::Seq),
    ("HMV", Cdc::Hmv),
    ("HWYE", Cdc::Hwye),
    ("HDEL", Cdc::Hdel),
    ("SPC", Cdc::Spc),
    ("DPC", Cdc::Dpc),
    ("INC", Cdc::Inc),
    ("ENC", Cdc::Enc),
    ("BSC", Cdc::Bsc),
    ("ISC", Cdc::Isc),
    ("APC", Cdc::Apc),
    ("BAC", Cdc::Bac),
    ("SPG", Cdc::Spg),
    ("ING", Cdc::Ing),
    ("ENG", Cdc::Eng),
    ("ORG", Cdc::Org),
    ("TSG", Cdc::Tsg),
    ("CUG", Cdc::Cug),
    ("VSG", Cdc::Vsg),
    ("ASG", Cdc::Asg),
    ("CURVE", Cdc::Curve),
    ("CSG", Cdc::Csg),
    ("DPL", Cdc::Dpl),
    ("LPL", Cdc::Lpl),
    ("CSD", Cdc::Csd),
];

impl Cdc {
    /// Parses a cdc literal. Never fails: unknown classes become `Cdc::Other`.
    pub fn parse(s: &str) -> Cdc {
        PREDEFINED_CDCS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, cdc)| cdc.clone())
            .unwrap_or_else(|| Cdc::Other(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cdc::Other(name) => name,
            known => PREDEFINED_CDCS
                .iter()
                .find(|(_, cdc)| cdc == known)
                .map(|(name, _)| *name)
                .unwrap_or_default(),
        }
    }

    /// Setting classes whose `setVal`/`setMag` is bounded by sibling `minVal`/`maxVal`/`stepSize`.
    pub fn has_bounded_setting(&self) -> bool {
        matches!(self, Cdc::Ing | Cdc::Asg)
    }
}

impl fmt::Display for Cdc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Value Kind ---

/// The `valKind` attribute of a DA or BDA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValKind {
    Spec,
    Conf,
    Ro,
    Set,
}

impl ValKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValKind::Spec => "Spec",
            ValKind::Conf => "Conf",
            ValKind::Ro => "RO",
            ValKind::Set => "Set",
        }
    }
}

impl FromStr for ValKind {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spec" => Ok(ValKind::Spec),
            "Conf" => Ok(ValKind::Conf),
            "RO" => Ok(ValKind::Ro),
            "Set" => Ok(ValKind::Set),
            _ => Err(ParseTypeError {
                attribute: "valKind",
                value: s.to_string(),
            }),
        }
    }
}
