// Analysis pipeline: extracted model in, graphs, dendrogram and modules out.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::domain::callgraph::{ClassGraphBuilder, DiGraph, MethodGraphBuilder};
use crate::domain::coupling::CouplingIndex;
use crate::domain::coupling_graph::{build_from_index, WeightedGraph};
use crate::domain::dendrogram::{cluster, DendrogramNode, Linkage};
use crate::domain::model::{validate_classes, ExtractedClass};
use crate::domain::modules::{identify, ModulePartition};
use crate::domain::ordered::OrderedSet;
use crate::error::Result;
use crate::infrastructure::config::AnalysisConfig;
use crate::ports::{CallGraphBuilder, ModelSource, ReportExporter};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Resolved class names, in input order.
    pub classes: Vec<String>,
    pub method_graph: DiGraph<String>,
    pub class_graph: DiGraph<String>,
    pub coupling_graph: WeightedGraph<String>,
    /// `None` only for an empty model.
    pub dendrogram: Option<DendrogramNode<String>>,
    pub partition: Option<ModulePartition<String>>,
    pub linkage: Linkage,
    pub cohesion_threshold: f64,
}

/// Run the whole pipeline over `classes`.
pub fn analyze(classes: &[ExtractedClass], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    validate_classes(classes)?;

    let include_external = config.include_external;
    let method_graph = MethodGraphBuilder { include_external }.build_call_graph(classes);
    let class_graph = ClassGraphBuilder { include_external }.build_call_graph(classes);
    info!(
        classes = classes.len(),
        methods = method_graph.node_count(),
        calls = method_graph.edge_count(),
        "built call graphs"
    );

    let index = CouplingIndex::build(&method_graph, classes);
    let coupling_graph = build_from_index(&index, classes);

    let names: OrderedSet<String> = classes.iter().map(ExtractedClass::resolved_name).collect();
    let names = names.as_slice().to_vec();
    let coupling_fn = |a: &String, b: &String| index.coupling(a, b);

    let dendrogram = cluster(&names, coupling_fn, config.linkage);
    let partition = dendrogram
        .as_ref()
        .map(|root| identify(root, coupling_fn, config.cohesion_threshold))
        .transpose()?;

    if let Some(partition) = &partition {
        info!(
            modules = partition.len(),
            feasible = partition.feasible,
            linkage = %config.linkage,
            cohesion_threshold = config.cohesion_threshold,
            "identified modules"
        );
    }

    Ok(AnalysisReport {
        classes: names,
        method_graph,
        class_graph,
        coupling_graph,
        dendrogram,
        partition,
        linkage: config.linkage,
        cohesion_threshold: config.cohesion_threshold,
    })
}

pub struct AnalyzeUsecase<'a> {
    pub source: &'a dyn ModelSource,
    pub exporter: &'a dyn ReportExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(
        &self,
        config: &AnalysisConfig,
        export_path: &Path,
    ) -> anyhow::Result<AnalysisReport> {
        let classes = self.source.load()?;
        let report = analyze(&classes, config)?;
        self.exporter
            .export(&report, export_path)
            .with_context(|| format!("Failed to write report to {}", export_path.display()))?;
        info!(path = %export_path.display(), "report written");
        Ok(report)
    }
}
