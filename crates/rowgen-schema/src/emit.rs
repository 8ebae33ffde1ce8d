//! Emission interface.
//!
//! Source-file generation is an external concern: this crate hands the
//! assembled model to an [`Emitter`] and makes no assumption about what the
//! emitter writes. A JSON emitter is provided for dumping a model to disk,
//! which is what the CLI and template toolchains consume.

use crate::error::{SchemaError, SchemaResult};
use crate::model::{SchemaModel, TableDescriptor};
use std::path::PathBuf;

/// Consumer of assembled models. Implementations own all output formatting.
pub trait Emitter {
    /// Receive a whole schema model.
    fn emit_schema(&mut self, model: &SchemaModel) -> SchemaResult<()>;

    /// Receive a single table. The default emits nothing.
    fn emit_table(&mut self, _table: &TableDescriptor) -> SchemaResult<()> {
        Ok(())
    }
}

/// Writes the model as pretty-printed JSON, one file per schema.
#[derive(Debug, Clone)]
pub struct JsonEmitter {
    out_dir: PathBuf,
    /// Paths written so far, in emission order.
    pub written: Vec<PathBuf>,
}

impl JsonEmitter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }
}

impl Emitter for JsonEmitter {
    fn emit_schema(&mut self, model: &SchemaModel) -> SchemaResult<()> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| SchemaError::validation(format!("failed to create output dir: {e}")))?;

        let path = self.out_dir.join(format!("{}.model.json", model.schema));
        let data = serde_json::to_vec_pretty(model)
            .map_err(|e| SchemaError::Serialization(format!("failed to serialize model: {e}")))?;
        std::fs::write(&path, data).map_err(|e| {
            SchemaError::validation(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "emitted schema model");
        self.written.push(path);
        Ok(())
    }
}
