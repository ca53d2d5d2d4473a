//! Per-variant build-plan resolution.

use crate::validate::ValidatedConfig;
use crate::{ConfigError, ConfigResult};
use gradlite_core::{BuildPlan, Dependency};
use tracing::debug;

/// Materialize the build plan for a named variant.
///
/// Lookup is a case-sensitive exact match. Variant settings take
/// precedence over base defaults; the returned plan is a self-contained
/// value the external executor consumes directly.
pub fn resolve_variant(validated: &ValidatedConfig, variant: &str) -> ConfigResult<BuildPlan> {
    let descriptor = validated.descriptor();

    let Some(selected) = descriptor.variant(variant) else {
        return Err(ConfigError::UnknownVariant {
            requested: variant.to_string(),
            available: descriptor.variant_names(),
        });
    };

    // Validation guarantees the reference exists and resolves.
    let signing = selected
        .signing_config
        .as_deref()
        .and_then(|name| descriptor.signing_config(name))
        .cloned()
        .ok_or_else(|| ConfigError::Validation {
            field: format!("buildTypes.{}.signingConfig", selected.name),
            reason: "signing reference did not resolve".to_string(),
        })?;

    let dependencies = merge_dependencies(&descriptor.dependencies, &selected.dependencies);

    debug!(
        variant = %selected.name,
        signing = %signing.name,
        dependencies = dependencies.len(),
        "resolved build plan"
    );

    Ok(BuildPlan {
        variant: selected.name.clone(),
        identity: descriptor.identity.clone(),
        sdk: descriptor.sdk.clone(),
        plugins: descriptor.plugins.clone(),
        dependencies,
        signing,
        minify: selected.minify,
        shrink_resources: selected.shrink_resources,
        proguard_files: selected.proguard_files.clone(),
        compile_options: descriptor.compile_options.clone(),
        kotlin_options: descriptor.kotlin_options.clone(),
        flutter_source: descriptor.flutter_source.clone(),
    })
}

/// Merge two dependency lists into one set unique by (group, name).
///
/// A later declaration for an already-seen coordinate replaces the earlier
/// one in place, so the result keeps first-declaration order.
pub fn merge_dependencies(base: &[Dependency], overrides: &[Dependency]) -> Vec<Dependency> {
    let mut merged: Vec<Dependency> = Vec::with_capacity(base.len() + overrides.len());

    for dep in base.iter().chain(overrides) {
        if let Some(existing) = merged.iter_mut().find(|d| d.key() == dep.key()) {
            *existing = dep.clone();
        } else {
            merged.push(dep.clone());
        }
    }

    merged
}
