//! Descriptor consistency validation.

use crate::{ConfigError, ConfigResult};
use gradlite_core::{BuildDescriptor, Dependency};
use regex::Regex;
use std::sync::LazyLock;

// Dot-separated segments, each starting with a letter; at least two
// segments, matching reverse-domain package identifiers.
static REVERSE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

/// A descriptor that has passed [`validate`]. Resolution only accepts
/// this witness type, so an unchecked descriptor cannot reach it.
#[derive(Debug, Clone)]
pub struct ValidatedConfig(BuildDescriptor);

impl ValidatedConfig {
    pub fn descriptor(&self) -> &BuildDescriptor {
        &self.0
    }
}

/// Check internal consistency of a parsed descriptor.
///
/// Fail-fast: the first violation is returned and the rest of the
/// descriptor is not inspected.
pub fn validate(parsed: BuildDescriptor) -> ConfigResult<ValidatedConfig> {
    check_reverse_domain("android.namespace", &parsed.identity.namespace)?;
    check_reverse_domain(
        "defaultConfig.applicationId",
        &parsed.identity.application_id,
    )?;

    let sdk = &parsed.sdk;
    if sdk.min_sdk > sdk.target_sdk {
        return Err(ConfigError::Validation {
            field: "defaultConfig.minSdk".to_string(),
            reason: format!(
                "minSdk {} exceeds targetSdk {}",
                sdk.min_sdk, sdk.target_sdk
            ),
        });
    }
    if sdk.target_sdk > sdk.compile_sdk {
        return Err(ConfigError::Validation {
            field: "defaultConfig.targetSdk".to_string(),
            reason: format!(
                "targetSdk {} exceeds compileSdk {}",
                sdk.target_sdk, sdk.compile_sdk
            ),
        });
    }

    for variant in &parsed.variants {
        match &variant.signing_config {
            None => {
                return Err(ConfigError::Validation {
                    field: format!("buildTypes.{}.signingConfig", variant.name),
                    reason: "no signing config declared; an explicit reference is required"
                        .to_string(),
                });
            }
            Some(reference) if parsed.signing_config(reference).is_none() => {
                return Err(ConfigError::Validation {
                    field: format!("buildTypes.{}.signingConfig", variant.name),
                    reason: format!("references undefined signing config '{reference}'"),
                });
            }
            Some(_) => {}
        }
    }

    for dep in &parsed.dependencies {
        check_coordinate("dependencies", dep)?;
    }
    for variant in &parsed.variants {
        for dep in &variant.dependencies {
            check_coordinate(&format!("buildTypes.{}.dependencies", variant.name), dep)?;
        }
    }

    Ok(ValidatedConfig(parsed))
}

fn check_reverse_domain(field: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if !REVERSE_DOMAIN.is_match(value) {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            reason: format!("'{value}' is not a valid reverse-domain identifier"),
        });
    }
    Ok(())
}

fn check_coordinate(context: &str, dep: &Dependency) -> ConfigResult<()> {
    if dep.group.is_empty() || dep.name.is_empty() || dep.version.is_empty() {
        return Err(ConfigError::Validation {
            field: context.to_string(),
            reason: format!(
                "malformed coordinate '{}:{}:{}': group, name, and version are all required",
                dep.group, dep.name, dep.version
            ),
        });
    }
    Ok(())
}
