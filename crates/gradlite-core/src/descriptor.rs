//! Build-descriptor declarations.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Application identity carried unchanged into every build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationIdentity {
    /// Reverse-domain package namespace (e.g., "com.example.arva").
    pub namespace: String,
    /// Application id the artifact is published under.
    pub application_id: String,
    /// Monotonically increasing release counter.
    pub version_code: u32,
    /// Human-readable version (e.g., "1.0.0").
    pub version_name: String,
}

/// Platform toolchain levels selected for the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersions {
    /// SDK level the sources are compiled against.
    pub compile_sdk: u32,
    /// SDK level the application targets at runtime.
    pub target_sdk: u32,
    /// Lowest SDK level the application installs on.
    pub min_sdk: u32,
    /// Native toolchain version, consumed as an opaque identifier.
    pub ndk_version: String,
}

/// A build plugin applied to the project.
///
/// Declaration order matters: later plugins may rely on earlier ones
/// having been applied first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin id (e.g., "com.android.application").
    pub id: String,
    /// Pinned plugin version; resolved by the plugin registry when absent.
    pub version: Option<String>,
}

/// Scope a dependency is wired into. Only `implementation` is modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Implementation,
}

/// An artifact coordinate resolved by the external artifact repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{group}:{name}:{version}")]
pub struct Dependency {
    pub group: String,
    pub name: String,
    pub version: String,
    pub scope: DependencyScope,
}

impl Dependency {
    /// Merge identity. Two declarations with the same key refer to the
    /// same artifact; the version is deliberately excluded.
    pub fn key(&self) -> (&str, &str) {
        (self.group.as_str(), self.name.as_str())
    }
}

/// Named reference to code-signing credentials.
///
/// Credentials are owned by the external signing-credential store; the
/// descriptor records the reference and never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningConfig {
    pub name: String,
    pub keystore: Option<String>,
    pub key_alias: Option<String>,
}

impl SigningConfig {
    /// The signing config the external tool pre-defines for local builds,
    /// backed by the debug keystore. Available without being declared.
    pub fn builtin_debug() -> Self {
        Self {
            name: "debug".to_string(),
            keystore: None,
            key_alias: None,
        }
    }
}

/// JVM source/target compatibility recorded for the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub source_compatibility: String,
    pub target_compatibility: String,
}

/// Kotlin toolchain options recorded for the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KotlinOptions {
    pub jvm_target: String,
}

/// A named build configuration profile overriding base settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVariant {
    /// Variant name (e.g., "debug", "release").
    pub name: String,
    /// Signing config reference. Must be explicit; there is no implicit
    /// default for a variant that omits it.
    pub signing_config: Option<String>,
    /// Whether code minification is applied.
    pub minify: bool,
    /// Whether unused resources are stripped.
    pub shrink_resources: bool,
    /// Obfuscation rule files, in application order.
    pub proguard_files: Vec<String>,
    /// Variant-local coordinates overriding the base dependency set.
    pub dependencies: Vec<Dependency>,
}

/// The full parsed build descriptor.
///
/// Owns every declaration; `BuildPlan`s are transient projections of it,
/// produced per variant and discarded after the executor consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Plugins in declaration order.
    pub plugins: Vec<Plugin>,
    pub identity: ApplicationIdentity,
    pub sdk: SdkVersions,
    pub compile_options: Option<CompileOptions>,
    pub kotlin_options: Option<KotlinOptions>,
    /// Declared signing configs plus the builtin "debug" entry.
    pub signing_configs: Vec<SigningConfig>,
    /// Build variants in declaration order.
    pub variants: Vec<BuildVariant>,
    /// Path to the embedding framework source tree, recorded verbatim.
    pub flutter_source: Option<String>,
    /// Base dependency set shared by all variants.
    pub dependencies: Vec<Dependency>,
}

impl BuildDescriptor {
    pub fn signing_config(&self, name: &str) -> Option<&SigningConfig> {
        self.signing_configs.iter().find(|c| c.name == name)
    }

    /// Case-sensitive exact-match variant lookup.
    pub fn variant(&self, name: &str) -> Option<&BuildVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_names(&self) -> Vec<String> {
        self.variants.iter().map(|v| v.name.clone()).collect()
    }
}
