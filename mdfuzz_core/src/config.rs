use crate::decoder::DecodeLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct DecoderSettings {
    /// Cap on bytes decoded into a text payload. Unbounded when absent.
    #[serde(default)]
    pub max_text_len: Option<usize>,
    /// Cap on bytes passed through as a byte payload. Unbounded when absent.
    #[serde(default)]
    pub max_bytes_len: Option<usize>,
}

impl DecoderSettings {
    pub fn limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_text_len: self.max_text_len.unwrap_or(usize::MAX),
            max_bytes_len: self.max_bytes_len.unwrap_or(usize::MAX),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ReplaySettings {
    /// Files or directories of saved inputs.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    #[serde(default)]
    pub stop_on_first_crash: bool,
    #[serde(default)]
    pub report_format: ReportFormat,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub decoder: DecoderSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
}

impl HarnessConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        debug!(?path, ?config, "loaded harness config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let config = HarnessConfig::load_from_file(file.path()).expect("empty config is valid");
        assert_eq!(config.decoder.limits(), DecodeLimits::UNBOUNDED);
        assert!(config.replay.inputs.is_empty());
        assert!(!config.replay.stop_on_first_crash);
        assert_eq!(config.replay.report_format, ReportFormat::Text);
    }

    #[test]
    fn full_file_is_parsed() {
        let file = write_config(
            r#"
[decoder]
max-text-len = 4096

[replay]
inputs = ["crashes/", "seed.bin"]
stop-on-first-crash = true
report-format = "json"
"#,
        );
        let config = HarnessConfig::load_from_file(file.path()).expect("valid config");
        assert_eq!(
            config.decoder.limits(),
            DecodeLimits {
                max_text_len: 4096,
                max_bytes_len: usize::MAX,
            }
        );
        assert_eq!(
            config.replay.inputs,
            vec![PathBuf::from("crashes/"), PathBuf::from("seed.bin")]
        );
        assert!(config.replay.stop_on_first_crash);
        assert_eq!(config.replay.report_format, ReportFormat::Json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("[decoder]\nmax-float-len = 3\n");
        let err = HarnessConfig::load_from_file(file.path()).expect_err("unknown key");
        assert!(err.to_string().contains("Failed to parse TOML"), "got: {err}");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = HarnessConfig::load_from_file(&dir.path().join("mdfuzz.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("Failed to read config file"), "got: {err}");
    }
}
