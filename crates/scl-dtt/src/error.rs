// crates/scl-dtt/src/error.rs
use crate::types::{BasicType, TypeKind};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A bound violated by an instance value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// The value is below the inclusive minimum.
    Min(String),
    /// The value is above the inclusive maximum.
    Max(String),
    /// The value is not a multiple of the step size, counted from zero.
    Step(String),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min(limit) => write!(f, "min={}", limit),
            Bound::Max(limit) => write!(f, "max={}", limit),
            Bound::Step(limit) => write!(f, "stepSize={}", limit),
        }
    }
}

/// Errors raised by the type library, the resolver, the validator,
/// the instance tracker and the merger.
#[derive(Debug, Clone, PartialEq)]
pub enum DttError {
    /// A referenced type id does not exist in the library. Indicates a corrupt document.
    NotFoundInTypeLibrary { kind: TypeKind, id: String },

    /// A caller-supplied data reference does not match the declared types.
    InvalidPath { path: String, reason: String },

    /// An ENUM attribute holds a value that its EnumType does not declare.
    UnknownEnumValue {
        value: String,
        enum_id: String,
        attribute: String,
    },

    /// A numeric attribute holds a literal that does not parse as its `bType`.
    NotANumber {
        value: String,
        b_type: BasicType,
        attribute: String,
    },

    /// A numeric attribute holds a value outside its bounds.
    OutOfBound {
        value: String,
        bound: Bound,
        attribute: String,
    },

    /// A STRUCT or ENUM attribute has no `type`, so the definition it needs cannot be named.
    MissingTypeId { kind: TypeKind, attribute: String },

    /// A second definition with an existing id was inserted into the same kind.
    DuplicateTypeId { kind: TypeKind, id: String },

    /// A definition contains itself, directly or through other definitions.
    CyclicTypeReference { kind: TypeKind, id: String },

    /// The attribute's instance forbids value import (`valImport="false"`).
    NotUpdatable { attribute: String },

    /// An instance node cannot be used or created at this position.
    InvalidInstanceNode { name: String, reason: &'static str },
}

impl DttError {
    /// `true` for value-validation failures, which are accumulated rather than fatal.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            DttError::UnknownEnumValue { .. }
                | DttError::NotANumber { .. }
                | DttError::OutOfBound { .. }
        )
    }
}

impl fmt::Display for DttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DttError::NotFoundInTypeLibrary { kind, id } => {
                write!(f, "{} '{}' not found in the type library", kind, id)
            }
            DttError::InvalidPath { path, reason } => {
                write!(f, "Invalid data reference '{}': {}", path, reason)
            }
            DttError::UnknownEnumValue {
                value,
                enum_id,
                attribute,
            } => write!(
                f,
                "Value '{}' of {} is not declared in EnumType '{}'",
                value, attribute, enum_id
            ),
            DttError::NotANumber {
                value,
                b_type,
                attribute,
            } => write!(f, "Value '{}' of {} is not a valid {}", value, attribute, b_type),
            DttError::OutOfBound {
                value,
                bound,
                attribute,
            } => write!(f, "Value '{}' of {} violates {}", value, attribute, bound),
            DttError::MissingTypeId { kind, attribute } => {
                write!(f, "{} has no type attribute naming its {}", attribute, kind)
            }
            DttError::DuplicateTypeId { kind, id } => {
                write!(f, "{} '{}' is already defined", kind, id)
            }
            DttError::CyclicTypeReference { kind, id } => {
                write!(f, "{} '{}' references itself", kind, id)
            }
            DttError::NotUpdatable { attribute } => {
                write!(f, "{} does not allow value import", attribute)
            }
            DttError::InvalidInstanceNode { name, reason } => {
                write!(f, "Instance node '{}': {}", name, reason)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DttError {}

/// The accumulated outcome of a batch of value checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    issues: Vec<DttError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: DttError) {
        self.issues.push(issue);
    }

    /// Records the error of `result`, if any.
    pub fn record(&mut self, result: Result<(), DttError>) {
        if let Err(e) = result {
            self.issues.push(e);
        }
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[DttError] {
        &self.issues
    }

    /// Returns `Ok(())` when no issue was recorded, otherwise every recorded issue.
    pub fn into_result(self) -> Result<(), Vec<DttError>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}
