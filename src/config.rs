use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "  |";
pub const DEFAULT_SUB_NUM: usize = 5;
pub const DEFAULT_LANGUAGE_TAG: &str = "zh";
pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    prefix: Option<String>,
    sub_num: Option<usize>,
    language_tag: Option<String>,
    max_archive_depth: Option<usize>,
    package_dirs: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub prefix: String,
    pub sub_num: usize,
    pub language_tag: String,
    pub max_archive_depth: usize,
    pub package_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            sub_num: DEFAULT_SUB_NUM,
            language_tag: DEFAULT_LANGUAGE_TAG.to_string(),
            max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
            package_dirs: Vec::new(),
        }
    }
}

impl Settings {
    fn from_file(file: ConfigFile) -> Self {
        let defaults = Settings::default();
        Self {
            prefix: file.prefix.unwrap_or(defaults.prefix),
            sub_num: file.sub_num.filter(|n| *n > 0).unwrap_or(defaults.sub_num),
            language_tag: file
                .language_tag
                .map(|tag| tag.trim_matches('.').to_string())
                .filter(|tag| !tag.is_empty())
                .unwrap_or(defaults.language_tag),
            max_archive_depth: file.max_archive_depth.unwrap_or(defaults.max_archive_depth),
            package_dirs: file.package_dirs.unwrap_or_default(),
        }
    }
}

/// Settings from `$GETSUB_CONFIG`, else `<config dir>/getsub/config.toml`.
/// A missing file means defaults; a broken one is an error.
pub fn load_settings() -> Result<Settings> {
    let config_path = env::var_os("GETSUB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &Path) -> Result<Settings> {
    if !config_path.exists() {
        log::debug!("no config file at {}, using defaults", config_path.display());
        return Ok(Settings::default());
    }

    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config: ConfigFile = toml::from_str(&config_content)
        .with_context(|| format!("Invalid config file {}", config_path.display()))?;
    Ok(Settings::from_file(config))
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("getsub"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = load_settings_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "prefix = \">>\"\nsub_num = 8\nlanguage_tag = \".chs\"\npackage_dirs = [\"/srv/subs\"]\n",
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.prefix, ">>");
        assert_eq!(settings.sub_num, 8);
        assert_eq!(settings.language_tag, "chs");
        assert_eq!(settings.max_archive_depth, DEFAULT_MAX_ARCHIVE_DEPTH);
        assert_eq!(settings.package_dirs, vec![PathBuf::from("/srv/subs")]);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "sub_num = \"many\"").unwrap();
        assert!(load_settings_from(&path).is_err());
    }
}
