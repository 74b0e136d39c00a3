// src/lib.rs

#![no_std]
#![doc = "Loads IEC 61850-6 SCL documents into the `scl-dtt` template engine."]
#![doc = ""]
#![doc = "This `no_std + alloc` library deserializes the `<DataTypeTemplates>` section"]
#![doc = "and the DOI/SDI/DAI trees of every logical node."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `load_templates_from_str`: Building the `TypeLibrary` of a document."]
#![doc = "- `load_ln_instances_from_str`: Extracting each logical node's `LnInstance`."]
#![doc = "- `load_scl_from_str`: Both, as an `SclDocument` that can import other IEDs."]

extern crate alloc;

// --- Crate Modules ---

mod converter;
mod document;
mod error;
mod model;
mod parser;

// --- Public API Re-exports ---

pub use converter::{to_ln_instance, to_type_library};
pub use document::{LocatedLn, SclDocument};
pub use error::SclXmlError;
pub use parser::{load_ln_instances_from_str, load_scl_from_str, load_templates_from_str};
