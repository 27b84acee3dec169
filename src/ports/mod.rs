use std::path::Path;

use crate::application::AnalysisReport;
use crate::domain::callgraph::DiGraph;
use crate::domain::model::ExtractedClass;

pub mod dot_exporter;

pub trait CallGraphBuilder {
    fn build_call_graph(&self, classes: &[ExtractedClass]) -> DiGraph<String>;
}

/// Where the extracted model comes from.
pub trait ModelSource {
    fn load(&self) -> anyhow::Result<Vec<ExtractedClass>>;
}

pub trait ReportExporter {
    fn export(&self, report: &AnalysisReport, path: &Path) -> std::io::Result<()>;
}
