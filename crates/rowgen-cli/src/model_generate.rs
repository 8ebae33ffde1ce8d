use crate::cli::ModelArgs;
use crate::config::ProjectConfig;
use crate::paths::ensure_dir;
use rowgen_schema::{CatalogDump, Emitter, JsonEmitter, ModelAssembler};
use std::path::PathBuf;

pub fn run(args: ModelArgs) -> anyhow::Result<()> {
    let config = ProjectConfig::load(args.config)?;

    let dump_path = args
        .dump
        .unwrap_or_else(|| config.resolve_path(&config.file.catalog.dump));
    let dump = CatalogDump::load(&dump_path)?;
    println!(
        "loaded catalog dump {} (schema '{}', {} tables, retrieved {})",
        dump_path.display(),
        dump.schema,
        dump.tables.len(),
        dump.retrieved_at
    );

    let schema = args
        .schema
        .unwrap_or_else(|| config.file.catalog.schema.clone());

    let mut assembler = ModelAssembler::new(dump);
    for (s, code) in &config.file.namespaces {
        assembler.set_namespace(s, code);
    }
    let model = assembler.build(&schema, !args.bare)?;
    println!(
        "built model for '{schema}': {} tables, {} triggers",
        model.tables.len(),
        model.triggers.len()
    );

    let out_dir: PathBuf = args
        .out
        .unwrap_or_else(|| config.resolve_path(&config.file.paths.generated));
    ensure_dir(&out_dir)?;

    let mut emitter = JsonEmitter::new(&out_dir);
    emitter.emit_schema(&model)?;
    for path in &emitter.written {
        println!("wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgen_schema::FieldMap;
    use serde_json::json;

    fn record(fields: &[(&str, serde_json::Value)]) -> FieldMap {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn model_command_builds_from_dump_and_writes_json() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("rowgen.toml");
        std::fs::write(
            &config_path,
            r#"
version = "1"

[catalog]
schema = "app"
dump = "catalog.json"

[namespaces]
app = "AP"
"#,
        )
        .unwrap();

        let mut dump = CatalogDump::new("app");
        dump.tables
            .push(record(&[("TABLE_NAME", json!("user_account"))]));
        dump.columns.insert(
            "user_account".to_string(),
            vec![record(&[
                ("COLUMN_NAME", json!("id")),
                ("DATA_TYPE", json!("int")),
                ("COLUMN_TYPE", json!("int(10) unsigned")),
                ("IS_NULLABLE", json!("NO")),
                ("EXTRA", json!("auto_increment")),
                ("ORDINAL_POSITION", json!(1)),
            ])],
        );
        dump.save(&tmp.path().join("catalog.json")).unwrap();

        run(ModelArgs {
            config: config_path,
            schema: None,
            dump: None,
            out: None,
            bare: false,
        })
        .unwrap();

        let out = tmp.path().join("library/Generated/app.model.json");
        let model: rowgen_schema::SchemaModel =
            serde_json::from_slice(&std::fs::read(out).unwrap()).unwrap();
        let table = model.table("user_account").unwrap();
        assert_eq!(table.namespace, "AP");
        assert_eq!(table.class_name, "UserAccount");
    }

    #[test]
    fn schema_mismatch_against_dump_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("rowgen.toml");
        std::fs::write(
            &config_path,
            r#"
version = "1"

[catalog]
schema = "other"
dump = "catalog.json"
"#,
        )
        .unwrap();
        CatalogDump::new("app")
            .save(&tmp.path().join("catalog.json"))
            .unwrap();

        assert!(
            run(ModelArgs {
                config: config_path,
                schema: None,
                dump: None,
                out: None,
                bare: false,
            })
            .is_err()
        );
    }
}
