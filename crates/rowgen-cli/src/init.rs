use crate::cli::InitArgs;
use crate::config::PathsConfig;
use crate::paths::ensure_dir;
use std::path::Path;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    write_template(&args.config)?;

    let base = args.config.parent().unwrap_or_else(|| Path::new("."));
    for dir in PathsConfig::default().skeleton() {
        let dir = base.join(dir);
        ensure_dir(&dir)?;
        println!("created {}", dir.display());
    }

    Ok(())
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let content = r#"
version = "1"

[catalog]
schema = "app"
dump = ".rowgen/catalog.json"

[paths]
library = "library"
generated = "library/Generated"
application = "application"
# Module subdirectory under the application dir, empty for none.
modules = ""

# Pin namespace codes per schema; unlisted schemas get an allocated code.
# [namespaces]
# app = "APP"
"#
    .trim_start_matches('\n');

    std::fs::write(path, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;

    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_config_and_skeleton() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("rowgen.toml");

        run(InitArgs {
            config: config.clone(),
        })
        .unwrap();

        assert!(config.is_file());
        assert!(tmp.path().join("library/Generated").is_dir());
        assert!(tmp.path().join("application").is_dir());

        // Template must load through the real config reader.
        crate::config::ProjectConfig::load(config).unwrap();
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("rowgen.toml");
        std::fs::write(&config, "existing").unwrap();

        assert!(run(InitArgs { config }).is_err());
    }
}
