// Infrastructure implementations for archmap.

pub mod concurrency;
pub mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::api::dto::ReportDto;
use crate::application::AnalysisReport;
use crate::domain::model::ExtractedClass;
use crate::ports::{ModelSource, ReportExporter};

/// Accepted layouts of a model file: a bare list of classes, or an object
/// with a `classes` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelFile {
    Classes(Vec<ExtractedClass>),
    Wrapped { classes: Vec<ExtractedClass> },
}

/// Reads the extractor's JSON model from disk.
pub struct JsonModelLoader {
    path: PathBuf,
}

impl JsonModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a model from JSON text.
    pub fn parse(content: &str) -> Result<Vec<ExtractedClass>> {
        let model: ModelFile = serde_json::from_str(content).context("Invalid model JSON")?;
        Ok(match model {
            ModelFile::Classes(classes) => classes,
            ModelFile::Wrapped { classes } => classes,
        })
    }
}

impl ModelSource for JsonModelLoader {
    fn load(&self) -> Result<Vec<ExtractedClass>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read model {}", self.path.display()))?;
        let classes = Self::parse(&content)
            .with_context(|| format!("Failed to load model {}", self.path.display()))?;
        info!(path = %self.path.display(), classes = classes.len(), "loaded model");
        Ok(classes)
    }
}

/// Writes the report as pretty-printed JSON.
pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(&self, report: &AnalysisReport, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&ReportDto::from(report))?;
        fs::write(path, json)
    }
}
