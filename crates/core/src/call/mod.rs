//! Turning logged call lines into something the classifier can reason about.
//!
//! - `extract`: strip source annotations and module qualifiers.
//! - `safety`: reject calls that would block on interactive input.
//! - `value` / `parser`: a small parser for Python call expressions whose
//!   arguments are literals, falling back to opaque source text otherwise.

pub mod extract;
pub mod parser;
pub mod safety;
pub mod value;

pub use extract::{extract_call, has_call_shape};
pub use parser::{parse_call, parse_value, ParseError, ParsedCall};
pub use safety::is_safe;
pub use value::PyValue;
