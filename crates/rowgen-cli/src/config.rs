use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    #[allow(dead_code)]
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!("failed to read config file {}: {e}", config_path.display())
        })?;

        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("failed to parse config file {}: {e}", config_path.display())
        })?;

        file.validate()?;

        Ok(Self {
            config_path,
            config_dir,
            file,
        })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    pub catalog: CatalogConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    /// Pinned namespace codes, schema -> code. Schemas not listed here get an
    /// allocated code.
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Schema to build the model for.
    pub schema: String,
    /// Catalog dump file, relative to the config file.
    #[serde(default = "default_dump")]
    pub dump: String,
}

fn default_dump() -> String {
    ".rowgen/catalog.json".to_string()
}

/// Target project layout, relative to the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_generated")]
    pub generated: String,
    #[serde(default = "default_application")]
    pub application: String,
    /// Module subdirectory under the application dir, empty for none.
    #[serde(default)]
    pub modules: String,
}

fn default_library() -> String {
    "library".to_string()
}

fn default_generated() -> String {
    "library/Generated".to_string()
}

fn default_application() -> String {
    "application".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            generated: default_generated(),
            application: default_application(),
            modules: String::new(),
        }
    }
}

impl PathsConfig {
    /// Directories the project skeleton consists of, in creation order.
    pub fn skeleton(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            PathBuf::from(&self.library),
            PathBuf::from(&self.generated),
            PathBuf::from(&self.application),
        ];
        if !self.modules.is_empty() {
            dirs.push(Path::new(&self.application).join(&self.modules));
        }
        dirs
    }
}

impl ConfigFile {
    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.catalog.schema.trim().is_empty() {
            anyhow::bail!("catalog.schema must not be empty");
        }
        if self.catalog.dump.trim().is_empty() {
            anyhow::bail!("catalog.dump must not be empty");
        }
        for (schema, code) in &self.namespaces {
            if code.trim().is_empty() {
                anyhow::bail!("namespaces.{schema} must not be empty");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
version = "1"

[catalog]
schema = "app"
"#,
        )
        .unwrap();
        file.validate().unwrap();

        assert_eq!(file.catalog.dump, ".rowgen/catalog.json");
        assert_eq!(file.paths.generated, "library/Generated");
        assert!(file.namespaces.is_empty());
    }

    #[test]
    fn version_and_schema_are_checked() {
        let file: ConfigFile = toml::from_str(
            r#"
version = "2"

[catalog]
schema = "app"
"#,
        )
        .unwrap();
        assert!(file.validate().is_err());

        let file: ConfigFile = toml::from_str(
            r#"
version = "1"

[catalog]
schema = ""
"#,
        )
        .unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn skeleton_includes_module_dir_when_set() {
        let mut paths = PathsConfig::default();
        assert_eq!(paths.skeleton().len(), 3);

        paths.modules = "modules".to_string();
        let dirs = paths.skeleton();
        assert_eq!(dirs.len(), 4);
        assert_eq!(dirs[3], PathBuf::from("application/modules"));
    }
}
