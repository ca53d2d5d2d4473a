//! KDL build-descriptor parsing for gradlite.
//!
//! This crate handles:
//! - Descriptor parsing (gradlite.kdl)
//! - Internal consistency validation
//! - Per-variant build-plan resolution
//!
//! The pipeline is `parse_descriptor` -> `validate` -> `resolve_variant`;
//! each step is a pure, synchronous function over its inputs.

pub mod descriptor;
pub mod error;
pub mod resolve;
pub mod validate;

pub use descriptor::{parse_descriptor, parse_descriptor_file};
pub use error::{ConfigError, ConfigResult};
pub use resolve::{merge_dependencies, resolve_variant};
pub use validate::{ValidatedConfig, validate};
