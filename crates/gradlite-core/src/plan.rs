//! Resolved build plans.

use serde::{Deserialize, Serialize};

use crate::descriptor::{
    ApplicationIdentity, CompileOptions, Dependency, KotlinOptions, Plugin, SdkVersions,
    SigningConfig,
};

/// The resolved output of applying one build variant over the base
/// descriptor data.
///
/// Transient and exclusively owned: produced per resolution request,
/// handed to the external build executor, and discarded. Variant settings
/// have already taken precedence over base defaults; the dependency set is
/// fully merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Name of the variant this plan was resolved for.
    pub variant: String,
    pub identity: ApplicationIdentity,
    pub sdk: SdkVersions,
    /// Plugins in application order.
    pub plugins: Vec<Plugin>,
    /// Merged dependency set; unique by (group, name).
    pub dependencies: Vec<Dependency>,
    /// Signing credentials reference, resolved from the variant's
    /// declared name.
    pub signing: SigningConfig,
    pub minify: bool,
    pub shrink_resources: bool,
    pub proguard_files: Vec<String>,
    pub compile_options: Option<CompileOptions>,
    pub kotlin_options: Option<KotlinOptions>,
    pub flutter_source: Option<String>,
}
