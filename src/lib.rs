// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod construct;
pub mod decl;
mod error;
mod guard;
pub mod iterator;
pub mod loader;
pub mod meta;
mod parser;
pub mod types;
mod value;

pub use construct::new_value;
pub use error::TypeError;
pub use guard::Guard;
pub use iterator::{Flow, IteratorValue, Step, ValueIterator};
pub use parser::{parse_type, parse_type_expr};
pub use types::Type;
pub use value::{ObjectValue, Value};
