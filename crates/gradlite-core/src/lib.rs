//! Core domain types for gradlite build descriptors.
//!
//! This crate contains:
//! - Application identity and SDK toolchain levels
//! - Plugin, dependency, and signing declarations
//! - Build variants and the full parsed descriptor
//! - The resolved `BuildPlan` handed to the external build executor

pub mod descriptor;
pub mod plan;

pub use descriptor::{
    ApplicationIdentity, BuildDescriptor, BuildVariant, CompileOptions, Dependency,
    DependencyScope, KotlinOptions, Plugin, SdkVersions, SigningConfig,
};
pub use plan::BuildPlan;
