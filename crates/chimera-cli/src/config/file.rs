use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDistanceConfig {
    pub cutoff: Option<f64>,
    pub include_backbone: Option<bool>,
    pub calculate_overlap: Option<bool>,
    pub compressed: Option<bool>,
    pub legacy_overlap_reuse: Option<bool>,
    pub radii_path: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileAnnotationConfig {
    pub metric: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInteracdomeConfig {
    pub min_instances: Option<u32>,
    pub min_structures: Option<u32>,
    pub min_achieved_precision: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDomainsConfig {
    pub backend: Option<String>,
    pub hmmscan_bin: Option<String>,
    pub pfam_dir: Option<String>,
    pub dpuc2_dir: Option<String>,
    pub dpuc2_net: Option<String>,
    pub domstratstats_dir: Option<String>,
    pub web_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub full_domains: Option<bool>,
    pub interacdome: Option<FileInteracdomeConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub distance: Option<FileDistanceConfig>,
    pub annotation: Option<FileAnnotationConfig>,
    pub domains: Option<FileDomainsConfig>,
}

/// Expands `{NAME}` placeholders from the process environment; `{{` and `}}`
/// stand for literal braces.
pub fn expand_env_vars(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(CliError::Config(format!(
                                "Unterminated placeholder in '{}'",
                                value
                            )));
                        }
                    }
                }
                let resolved = std::env::var(&name).map_err(|_| {
                    CliError::Config(format!("Environment variable {} missing", name))
                })?;
                out.push_str(&resolved);
            }
            '}' => {
                return Err(CliError::Config(format!(
                    "Unmatched '}}' in '{}'",
                    value
                )));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn expand(field: &mut Option<String>) -> Result<()> {
    if let Some(value) = field.as_mut() {
        *value = expand_env_vars(value)?;
    }
    Ok(())
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let mut config: FileConfig = toml::from_str(&content).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.expand_env_vars()?;
        Ok(config)
    }

    pub fn from_optional_file(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(distance) = self.distance.as_mut() {
            expand(&mut distance.radii_path)?;
        }
        if let Some(annotation) = self.annotation.as_mut() {
            expand(&mut annotation.metric)?;
        }
        if let Some(domains) = self.domains.as_mut() {
            for field in [
                &mut domains.backend,
                &mut domains.hmmscan_bin,
                &mut domains.pfam_dir,
                &mut domains.dpuc2_dir,
                &mut domains.dpuc2_net,
                &mut domains.domstratstats_dir,
                &mut domains.web_url,
            ] {
                expand(field)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use serial_test::serial;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn sections_are_read_in_kebab_case() {
        let path = write_config_file(
            "full.toml",
            r#"
            [distance]
            cutoff = 8.5
            include-backbone = true
            legacy-overlap-reuse = true

            [annotation]
            metric = "meanvdw"

            [domains]
            backend = "dpuc2"
            pfam-dir = "/data/pfam"
            timeout-secs = 120

            [domains.interacdome]
            min-instances = 5
            "#,
        );
        let config = FileConfig::from_file(&path).unwrap();

        let distance = config.distance.unwrap();
        assert_eq!(distance.cutoff, Some(8.5));
        assert_eq!(distance.include_backbone, Some(true));
        assert_eq!(distance.compressed, None);
        assert_eq!(config.annotation.unwrap().metric.as_deref(), Some("meanvdw"));
        let domains = config.domains.unwrap();
        assert_eq!(domains.backend.as_deref(), Some("dpuc2"));
        assert_eq!(domains.timeout_secs, Some(120));
        assert_eq!(domains.interacdome.unwrap().min_instances, Some(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = write_config_file("unknown.toml", "[distance]\ncut-off = 4.0\n");
        let result = FileConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::ConfigFile { .. })));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let path = PathBuf::from("/nonexistent/chimera.toml");
        match FileConfig::from_file(&path) {
            Err(CliError::ConfigFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn placeholders_are_expanded_from_the_environment() {
        // SAFETY: serialized with the other tests that touch the environment.
        unsafe { std::env::set_var("CHIMERA_TEST_PFAM", "/opt/pfam") };
        let path = write_config_file(
            "env.toml",
            "[domains]\npfam-dir = \"{CHIMERA_TEST_PFAM}/35.0\"\nweb-url = \"https://x/{{literal}}\"\n",
        );
        let domains = FileConfig::from_file(&path).unwrap().domains.unwrap();
        assert_eq!(domains.pfam_dir.as_deref(), Some("/opt/pfam/35.0"));
        assert_eq!(domains.web_url.as_deref(), Some("https://x/{literal}"));
    }

    #[test]
    #[serial]
    fn missing_environment_variable_is_a_config_error() {
        // SAFETY: serialized with the other tests that touch the environment.
        unsafe { std::env::remove_var("CHIMERA_TEST_UNSET") };
        let err = expand_env_vars("{CHIMERA_TEST_UNSET}/pfam").unwrap_err();
        match err {
            CliError::Config(msg) => {
                assert_eq!(msg, "Environment variable CHIMERA_TEST_UNSET missing")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        assert!(expand_env_vars("{OPEN").is_err());
        assert!(expand_env_vars("close}").is_err());
        assert_eq!(expand_env_vars("plain").unwrap(), "plain");
    }

    #[test]
    fn missing_file_yields_defaults_when_optional() {
        assert_eq!(FileConfig::from_optional_file(None).unwrap(), FileConfig::default());
    }
}
