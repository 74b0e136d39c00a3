// crates/scl-dtt/src/lib.rs
#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' backs the definition arenas and resolved attribute lists
extern crate alloc;

mod log;

// --- Foundation Modules ---
pub mod types;
pub mod error;

// --- Type Definitions ---
pub mod library;

// --- Resolution & Validation ---
pub mod attribute;
pub mod resolver;
pub mod validator;

// --- Instances ---
pub mod instance;
pub mod tracker;

// --- Import ---
pub mod merger;

// --- Top-level Exports ---
pub use types::{BasicType, Cdc, Fc, TypeKind, ValKind, MAX_TYPE_ID_LEN};
pub use error::{Bound, DttError, ValidationReport};
pub use library::{TypeDef, TypeLibrary};
pub use library::equality::StructuralEq;
pub use attribute::{AttributeFilter, AttributeRef, LnRef};
pub use resolver::TypePathResolver;
pub use validator::{Number, NumericRange, ValueValidator};
pub use instance::{DaiHandle, LnInstance};
pub use tracker::{instance_attributes, InstanceTracker, MatchState};
pub use merger::{MergePlan, MergeReport, Renames, TemplateMerger};
