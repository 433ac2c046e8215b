//! Query builder
//!
//! Filter parsing, clause construction and statement assembly.

pub mod clause;
pub mod filter;
pub mod params;
pub mod statement;


pub use clause::{build_where, build_where_for, build_where_named, prepare_post, prepare_post_for, Clause, MappingShape, PostFragments};
pub use filter::{FilterEntry, FilterValue, Operator};
pub use params::BoundParams;
pub use statement::{BuiltStatement, Statement};
