//! Build-descriptor parsing.

use crate::{ConfigError, ConfigResult};
use gradlite_core::{
    ApplicationIdentity, BuildDescriptor, BuildVariant, CompileOptions, Dependency,
    DependencyScope, KotlinOptions, Plugin, SdkVersions, SigningConfig,
};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// Parse a build descriptor from KDL text.
///
/// Fails on malformed syntax and on unrecognized keys; coordinate shape
/// problems are deferred to [`crate::validate`].
pub fn parse_descriptor(kdl: &str) -> ConfigResult<BuildDescriptor> {
    let doc: KdlDocument = kdl.parse()?;

    let mut plugins = Vec::new();
    let mut android = None;
    let mut flutter_source = None;
    let mut dependencies = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "plugins" => {
                plugins = parse_plugins(node)?;
            }
            "android" => {
                android = Some(parse_android(node)?);
            }
            "flutterSource" => {
                flutter_source = Some(get_first_string_arg(node).ok_or_else(|| {
                    ConfigError::MissingField("flutterSource path".to_string())
                })?);
            }
            "dependencies" => {
                dependencies = parse_dependencies(node, "dependencies")?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    let android =
        android.ok_or_else(|| ConfigError::MissingField("android block".to_string()))?;

    Ok(BuildDescriptor {
        plugins,
        identity: android.identity,
        sdk: android.sdk,
        compile_options: android.compile_options,
        kotlin_options: android.kotlin_options,
        signing_configs: android.signing_configs,
        variants: android.variants,
        flutter_source,
        dependencies,
    })
}

/// Read and parse a descriptor from its on-disk location.
pub fn parse_descriptor_file(path: impl AsRef<Path>) -> ConfigResult<BuildDescriptor> {
    let text = std::fs::read_to_string(path)?;
    parse_descriptor(&text)
}

fn parse_plugins(node: &KdlNode) -> ConfigResult<Vec<Plugin>> {
    let mut plugins = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "id" => {
                    let id = get_first_string_arg(child)
                        .ok_or_else(|| ConfigError::MissingField("plugin id".to_string()))?;
                    let version = get_string_prop(child, "version");
                    plugins.push(Plugin { id, version });
                }
                other => return Err(ConfigError::UnknownKey(format!("plugins.{other}"))),
            }
        }
    }

    Ok(plugins)
}

struct AndroidConfig {
    identity: ApplicationIdentity,
    sdk: SdkVersions,
    compile_options: Option<CompileOptions>,
    kotlin_options: Option<KotlinOptions>,
    signing_configs: Vec<SigningConfig>,
    variants: Vec<BuildVariant>,
}

fn parse_android(node: &KdlNode) -> ConfigResult<AndroidConfig> {
    let mut namespace = None;
    let mut compile_sdk = None;
    let mut ndk_version = None;
    let mut compile_options = None;
    let mut kotlin_options = None;
    let mut default_config = None;
    // The builtin debug config is always defined, declared or not.
    let mut signing_configs = vec![SigningConfig::builtin_debug()];
    let mut variants = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "namespace" => {
                    namespace = get_first_string_arg(child);
                }
                "compileSdk" => {
                    compile_sdk = Some(get_sdk_level(child, "android.compileSdk")?);
                }
                "ndkVersion" => {
                    ndk_version = get_first_string_arg(child);
                }
                "compileOptions" => {
                    compile_options = Some(parse_compile_options(child)?);
                }
                "kotlinOptions" => {
                    kotlin_options = Some(parse_kotlin_options(child)?);
                }
                "defaultConfig" => {
                    default_config = Some(parse_default_config(child)?);
                }
                "signingConfigs" => {
                    parse_signing_configs(child, &mut signing_configs)?;
                }
                "buildTypes" => {
                    variants = parse_build_types(child)?;
                }
                other => return Err(ConfigError::UnknownKey(format!("android.{other}"))),
            }
        }
    }

    let namespace = namespace
        .ok_or_else(|| ConfigError::MissingField("android.namespace".to_string()))?;
    let compile_sdk = compile_sdk
        .ok_or_else(|| ConfigError::MissingField("android.compileSdk".to_string()))?;
    let ndk_version = ndk_version
        .ok_or_else(|| ConfigError::MissingField("android.ndkVersion".to_string()))?;
    let default_config = default_config
        .ok_or_else(|| ConfigError::MissingField("android.defaultConfig".to_string()))?;

    Ok(AndroidConfig {
        identity: ApplicationIdentity {
            namespace,
            application_id: default_config.application_id,
            version_code: default_config.version_code,
            version_name: default_config.version_name,
        },
        sdk: SdkVersions {
            compile_sdk,
            target_sdk: default_config.target_sdk,
            min_sdk: default_config.min_sdk,
            ndk_version,
        },
        compile_options,
        kotlin_options,
        signing_configs,
        variants,
    })
}

fn parse_compile_options(node: &KdlNode) -> ConfigResult<CompileOptions> {
    let mut source_compatibility = None;
    let mut target_compatibility = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "sourceCompatibility" => source_compatibility = get_first_string_arg(child),
                "targetCompatibility" => target_compatibility = get_first_string_arg(child),
                other => {
                    return Err(ConfigError::UnknownKey(format!("compileOptions.{other}")));
                }
            }
        }
    }

    Ok(CompileOptions {
        source_compatibility: source_compatibility.ok_or_else(|| {
            ConfigError::MissingField("compileOptions.sourceCompatibility".to_string())
        })?,
        target_compatibility: target_compatibility.ok_or_else(|| {
            ConfigError::MissingField("compileOptions.targetCompatibility".to_string())
        })?,
    })
}

fn parse_kotlin_options(node: &KdlNode) -> ConfigResult<KotlinOptions> {
    let mut jvm_target = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "jvmTarget" => jvm_target = get_first_string_arg(child),
                other => return Err(ConfigError::UnknownKey(format!("kotlinOptions.{other}"))),
            }
        }
    }

    Ok(KotlinOptions {
        jvm_target: jvm_target
            .ok_or_else(|| ConfigError::MissingField("kotlinOptions.jvmTarget".to_string()))?,
    })
}

struct DefaultConfig {
    application_id: String,
    min_sdk: u32,
    target_sdk: u32,
    version_code: u32,
    version_name: String,
}

fn parse_default_config(node: &KdlNode) -> ConfigResult<DefaultConfig> {
    let mut application_id = None;
    let mut min_sdk = None;
    let mut target_sdk = None;
    let mut version_code = None;
    let mut version_name = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "applicationId" => application_id = get_first_string_arg(child),
                "minSdk" => min_sdk = Some(get_sdk_level(child, "defaultConfig.minSdk")?),
                "targetSdk" => {
                    target_sdk = Some(get_sdk_level(child, "defaultConfig.targetSdk")?);
                }
                "versionCode" => {
                    version_code = Some(get_sdk_level(child, "defaultConfig.versionCode")?);
                }
                "versionName" => version_name = get_first_string_arg(child),
                other => return Err(ConfigError::UnknownKey(format!("defaultConfig.{other}"))),
            }
        }
    }

    Ok(DefaultConfig {
        application_id: application_id.ok_or_else(|| {
            ConfigError::MissingField("defaultConfig.applicationId".to_string())
        })?,
        min_sdk: min_sdk
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.minSdk".to_string()))?,
        target_sdk: target_sdk
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.targetSdk".to_string()))?,
        version_code: version_code
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.versionCode".to_string()))?,
        version_name: version_name
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.versionName".to_string()))?,
    })
}

fn parse_signing_configs(node: &KdlNode, configs: &mut Vec<SigningConfig>) -> ConfigResult<()> {
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let name = child.name().value().to_string();
            let config = SigningConfig {
                name: name.clone(),
                keystore: get_string_prop(child, "keystore"),
                key_alias: get_string_prop(child, "keyAlias"),
            };
            // Last declaration for a name wins, including a redeclared
            // builtin "debug".
            if let Some(existing) = configs.iter_mut().find(|c| c.name == name) {
                *existing = config;
            } else {
                configs.push(config);
            }
        }
    }
    Ok(())
}

fn parse_build_types(node: &KdlNode) -> ConfigResult<Vec<BuildVariant>> {
    let mut variants = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            variants.push(parse_variant(child)?);
        }
    }

    Ok(variants)
}

fn parse_variant(node: &KdlNode) -> ConfigResult<BuildVariant> {
    let name = node.name().value().to_string();

    let mut signing_config = None;
    let mut minify = false;
    let mut shrink_resources = false;
    let mut proguard_files = Vec::new();
    let mut dependencies = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "signingConfig" => {
                    signing_config = get_first_string_arg(child);
                }
                "minifyEnabled" => {
                    minify = get_first_bool_arg(child).ok_or_else(|| {
                        ConfigError::Validation {
                            field: format!("buildTypes.{name}.minifyEnabled"),
                            reason: "expected a boolean argument".to_string(),
                        }
                    })?;
                }
                "shrinkResources" => {
                    shrink_resources = get_first_bool_arg(child).ok_or_else(|| {
                        ConfigError::Validation {
                            field: format!("buildTypes.{name}.shrinkResources"),
                            reason: "expected a boolean argument".to_string(),
                        }
                    })?;
                }
                "proguardFiles" => {
                    proguard_files.extend(get_all_string_args(child));
                }
                "dependencies" => {
                    dependencies = parse_dependencies(child, &format!("buildTypes.{name}"))?;
                }
                other => {
                    return Err(ConfigError::UnknownKey(format!("buildTypes.{name}.{other}")));
                }
            }
        }
    }

    Ok(BuildVariant {
        name,
        signing_config,
        minify,
        shrink_resources,
        proguard_files,
        dependencies,
    })
}

fn parse_dependencies(node: &KdlNode, context: &str) -> ConfigResult<Vec<Dependency>> {
    let mut dependencies = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "implementation" => {
                    let raw = get_first_string_arg(child).ok_or_else(|| {
                        ConfigError::MissingField(format!("{context} coordinate"))
                    })?;
                    dependencies.push(parse_coordinate(&raw));
                }
                other => return Err(ConfigError::UnknownKey(format!("{context}.{other}"))),
            }
        }
    }

    Ok(dependencies)
}

/// Split a gradle-style "group:name:version" coordinate. Missing pieces
/// come out empty and are caught by validation.
fn parse_coordinate(raw: &str) -> Dependency {
    let mut parts = raw.splitn(3, ':');
    Dependency {
        group: parts.next().unwrap_or_default().to_string(),
        name: parts.next().unwrap_or_default().to_string(),
        version: parts.next().unwrap_or_default().to_string(),
        scope: DependencyScope::Implementation,
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_sdk_level(node: &KdlNode, field: &str) -> ConfigResult<u32> {
    let value = node
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| ConfigError::MissingField(field.to_string()))?;

    u32::try_from(value).map_err(|_| ConfigError::Validation {
        field: field.to_string(),
        reason: format!("expected a non-negative integer, got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_descriptor() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }
            }
        "#;

        let descriptor = parse_descriptor(kdl).unwrap();
        assert_eq!(descriptor.identity.namespace, "com.example.arva");
        assert_eq!(descriptor.sdk.compile_sdk, 35);
        assert_eq!(descriptor.sdk.min_sdk, 26);
        assert_eq!(descriptor.identity.version_code, 1);
        assert!(descriptor.dependencies.is_empty());
        // Builtin debug signing config is always defined.
        assert!(descriptor.signing_config("debug").is_some());
    }

    #[test]
    fn test_plugin_order_preserved() {
        let kdl = r#"
            plugins {
                id "com.android.application"
                id "com.google.gms.google-services"
                id "org.jetbrains.kotlin.android" version="2.1.0"
                id "dev.flutter.flutter-gradle-plugin"
            }

            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }
            }
        "#;

        let descriptor = parse_descriptor(kdl).unwrap();
        let ids: Vec<&str> = descriptor.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "com.android.application",
                "com.google.gms.google-services",
                "org.jetbrains.kotlin.android",
                "dev.flutter.flutter-gradle-plugin",
            ]
        );
        assert_eq!(descriptor.plugins[2].version.as_deref(), Some("2.1.0"));
        assert_eq!(descriptor.plugins[3].version, None);
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }
            }

            publishing {
                repository "https://example.com/maven"
            }
        "#;

        let result = parse_descriptor(kdl);
        assert!(matches!(result.unwrap_err(), ConfigError::UnknownKey(key) if key == "publishing"));
    }

    #[test]
    fn test_malformed_syntax_is_parse_error() {
        let result = parse_descriptor("android { namespace ");
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_default_config_rejected() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"
            }
        "#;

        let result = parse_descriptor(kdl);
        assert!(matches!(result.unwrap_err(), ConfigError::MissingField(_)));
    }

    #[test]
    fn test_variant_flags_default_false() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }

                buildTypes {
                    debug {
                        signingConfig "debug"
                    }
                }
            }
        "#;

        let descriptor = parse_descriptor(kdl).unwrap();
        let debug = descriptor.variant("debug").unwrap();
        assert!(!debug.minify);
        assert!(!debug.shrink_resources);
        assert!(debug.proguard_files.is_empty());
    }

    #[test]
    fn test_parse_full_android_block() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                compileOptions {
                    sourceCompatibility "11"
                    targetCompatibility "11"
                }

                kotlinOptions {
                    jvmTarget "11"
                }

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }

                signingConfigs {
                    upload keystore="upload.jks" keyAlias="upload"
                }

                buildTypes {
                    release {
                        signingConfig "upload"
                        minifyEnabled #true
                        shrinkResources #true
                        proguardFiles "proguard-android-optimize.txt" "proguard-rules.pro"
                    }
                }
            }

            flutterSource "../.."

            dependencies {
                implementation "org.tensorflow:tensorflow-lite:2.16.1"
                implementation "androidx.appcompat:appcompat:1.6.1"
            }
        "#;

        let descriptor = parse_descriptor(kdl).unwrap();
        assert_eq!(descriptor.compile_options.as_ref().unwrap().source_compatibility, "11");
        assert_eq!(descriptor.kotlin_options.as_ref().unwrap().jvm_target, "11");
        assert_eq!(descriptor.flutter_source.as_deref(), Some("../.."));

        let upload = descriptor.signing_config("upload").unwrap();
        assert_eq!(upload.keystore.as_deref(), Some("upload.jks"));

        let release = descriptor.variant("release").unwrap();
        assert!(release.minify);
        assert!(release.shrink_resources);
        assert_eq!(
            release.proguard_files,
            vec!["proguard-android-optimize.txt", "proguard-rules.pro"]
        );

        assert_eq!(descriptor.dependencies.len(), 2);
        assert_eq!(descriptor.dependencies[0].group, "org.tensorflow");
        assert_eq!(descriptor.dependencies[0].name, "tensorflow-lite");
        assert_eq!(descriptor.dependencies[0].version, "2.16.1");
    }

    #[test]
    fn test_unknown_dependency_scope_rejected() {
        let kdl = r#"
            android {
                namespace "com.example.arva"
                compileSdk 35
                ndkVersion "27.0.12077973"

                defaultConfig {
                    applicationId "com.example.arva"
                    minSdk 26
                    targetSdk 34
                    versionCode 1
                    versionName "1.0.0"
                }
            }

            dependencies {
                api "org.tensorflow:tensorflow-lite:2.16.1"
            }
        "#;

        let result = parse_descriptor(kdl);
        assert!(
            matches!(result.unwrap_err(), ConfigError::UnknownKey(key) if key == "dependencies.api")
        );
    }
}
