//! Configuration tests

use super::*;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 3] = ["INTGEMM_PROVIDER", "INTGEMM_INITIAL_PAGES", "INTGEMM_MAXIMUM_PAGES"];

fn clear_env() {
    for var in &ENV_VARS {
        unsafe {
            env::remove_var(var);
        }
    }
}

#[test]
fn test_default_config() {
    let config = KernelConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.kernel.provider, ProviderPreference::Auto);
    assert_eq!(config.buffer.initial_pages, 1);
    assert_eq!(config.buffer.maximum_pages, Some(1));
}

#[test]
fn test_config_validation() {
    let mut config = KernelConfig::default();
    config.buffer.initial_pages = 4;
    assert!(config.validate().is_err());

    config.buffer.maximum_pages = None;
    assert!(config.validate().is_ok());

    config.buffer.initial_pages = MAX_PAGES + 1;
    assert!(config.validate().is_err());

    let mut config = KernelConfig::default();
    config.buffer.maximum_pages = Some(MAX_PAGES + 1);
    assert!(config.validate().is_err());
}

#[test]
fn test_toml_config_loading() {
    let toml_content = r#"
[kernel]
provider = "fallback"

[buffer]
initial_pages = 2
maximum_pages = 16
"#;

    let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();

    let config = KernelConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.kernel.provider, ProviderPreference::Fallback);
    assert_eq!(config.buffer.initial_pages, 2);
    assert_eq!(config.buffer.maximum_pages, Some(16));
}

#[test]
fn test_json_config_loading() {
    let json_content = r#"
{
    "kernel": { "provider": "avx2" },
    "buffer": { "maximum_pages": null }
}
"#;

    let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
    temp_file.write_all(json_content.as_bytes()).unwrap();

    let config = KernelConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.kernel.provider, ProviderPreference::Avx2);
    assert_eq!(config.buffer.initial_pages, 1);
    assert_eq!(config.buffer.maximum_pages, None);
}

#[test]
fn test_unknown_extension_rejected() {
    let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
    temp_file.write_all(b"kernel: {}").unwrap();
    let err = KernelConfig::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err, IntGemmError::Config(_)));
}

#[test]
fn test_invalid_file_values_rejected() {
    let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
    temp_file.write_all(b"[buffer]\ninitial_pages = 8\nmaximum_pages = 2\n").unwrap();
    assert!(KernelConfig::from_file(temp_file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    unsafe {
        env::set_var("INTGEMM_PROVIDER", "FALLBACK");
        env::set_var("INTGEMM_INITIAL_PAGES", "3");
        env::set_var("INTGEMM_MAXIMUM_PAGES", "none");
    }

    let config = KernelConfig::from_env().unwrap();
    assert_eq!(config.kernel.provider, ProviderPreference::Fallback);
    assert_eq!(config.buffer.initial_pages, 3);
    assert_eq!(config.buffer.maximum_pages, None);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values() {
    clear_env();

    unsafe {
        env::set_var("INTGEMM_PROVIDER", "gpu");
    }
    let mut config = KernelConfig::default();
    assert!(config.apply_env_overrides().is_err());
    clear_env();

    unsafe {
        env::set_var("INTGEMM_INITIAL_PAGES", "many");
    }
    let mut config = KernelConfig::default();
    assert!(config.apply_env_overrides().is_err());
    clear_env();

    unsafe {
        env::set_var("INTGEMM_MAXIMUM_PAGES", "-1");
    }
    let mut config = KernelConfig::default();
    assert!(config.apply_env_overrides().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_config_loader_precedence() {
    clear_env();

    let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
    temp_file
        .write_all(b"[kernel]\nprovider = \"avx2\"\n\n[buffer]\nmaximum_pages = 8\n")
        .unwrap();

    unsafe {
        env::set_var("INTGEMM_PROVIDER", "fallback");
    }
    let config = KernelConfig::load(Some(temp_file.path())).unwrap();
    // Environment wins over the file; untouched file values survive.
    assert_eq!(config.kernel.provider, ProviderPreference::Fallback);
    assert_eq!(config.buffer.maximum_pages, Some(8));

    clear_env();
}

#[test]
fn test_config_merging() {
    let mut base = KernelConfig::default();
    base.buffer.maximum_pages = Some(32);

    let mut other = KernelConfig::default();
    other.kernel.provider = ProviderPreference::Fallback;

    base.merge_with(other);
    assert_eq!(base.kernel.provider, ProviderPreference::Fallback);
    assert_eq!(base.buffer.maximum_pages, Some(32));
}

#[test]
fn test_buffer_from_config() {
    let config = BufferConfig { initial_pages: 2, maximum_pages: Some(4) };
    let buffer = crate::LinearBuffer::from_config(&config).unwrap();
    assert_eq!(buffer.pages(), 2);
    assert_eq!(buffer.maximum_pages(), Some(4));
}
