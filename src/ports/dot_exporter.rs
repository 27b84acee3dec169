//! Graphviz DOT Exporter
//!
//! Exports the graphs of an analysis report as DOT text: the method and
//! class call graphs, the weighted coupling graph with its modules as
//! clusters, and the dendrogram with leaves coloured by module.

use std::io::Result;
use std::path::Path;

use crate::application::AnalysisReport;
use crate::domain::callgraph::{DiGraph, EXTERNAL_PREFIX};
use crate::domain::coupling_graph::WeightedGraph;
use crate::domain::dendrogram::DendrogramNode;
use crate::domain::modules::ModulePartition;
use crate::ports::ReportExporter;

const MODULE_COLORS: [&str; 6] = [
    "#a6e3a1", "#89b4fa", "#f9e2af", "#cba6f7", "#f38ba8", "#94e2d5",
];

const UNASSIGNED_COLOR: &str = "#ffffff";

/// DOT exporter. Coupling edges lighter than `min_weight` are left out of
/// the drawing; the analysis itself is unaffected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotExporter {
    pub min_weight: f64,
}

impl ReportExporter for DotExporter {
    fn export(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        std::fs::write(path, self.report_to_dot(report))
    }
}

impl DotExporter {
    pub fn with_min_weight(min_weight: f64) -> Self {
        Self { min_weight }
    }

    /// Every graph of `report`, one DOT graph after another.
    pub fn report_to_dot(&self, report: &AnalysisReport) -> String {
        let partition = report.partition.as_ref();
        let mut graphs = vec![
            Self::call_graph_to_dot("MethodGraph", &report.method_graph),
            Self::call_graph_to_dot("ClassGraph", &report.class_graph),
            Self::coupling_to_dot(&report.coupling_graph, partition, self.min_weight),
        ];
        if let Some(root) = &report.dendrogram {
            graphs.push(Self::dendrogram_to_dot(root, partition));
        }
        graphs.join("\n\n")
    }

    /// Convert a call graph to a DOT digraph.
    pub fn call_graph_to_dot(name: &str, graph: &DiGraph<String>) -> String {
        let mut lines = Vec::new();

        lines.push(format!("digraph {} {{", name));
        lines.push("    rankdir=LR;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12, shape=box];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        for node in graph.nodes() {
            let (style, color) = Self::node_style(node);
            lines.push(format!(
                "    \"{}\" [style=\"{}\", fillcolor=\"{}\"];",
                Self::escape_label(node),
                style,
                color
            ));
        }

        lines.push("".to_string());

        for (from, to) in graph.edges() {
            lines.push(format!(
                "    \"{}\" -> \"{}\";",
                Self::escape_label(from),
                Self::escape_label(to)
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Convert the coupling graph to an undirected DOT graph. Modules, when
    /// given, become clusters. Edges below `min_weight` are skipped.
    pub fn coupling_to_dot(
        graph: &WeightedGraph<String>,
        partition: Option<&ModulePartition<String>>,
        min_weight: f64,
    ) -> String {
        let mut lines = Vec::new();

        lines.push("graph Coupling {".to_string());
        lines.push(format!(
            "    node [fontname=\"Helvetica\", fontsize=12, shape=box, style=filled, \
             fillcolor=\"{}\"];",
            UNASSIGNED_COLOR
        ));
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        if let Some(partition) = partition {
            for (idx, module) in partition.modules.iter().enumerate() {
                lines.push(format!("    subgraph cluster_{} {{", idx));
                lines.push(format!(
                    "        label=\"module {} ({:.3})\";",
                    idx, module.average_coupling
                ));
                lines.push(format!(
                    "        style=filled; color=\"{}\";",
                    Self::module_color(Some(idx))
                ));
                for member in &module.members {
                    lines.push(format!("        \"{}\";", Self::escape_label(member)));
                }
                lines.push("    }".to_string());
            }
        }

        for node in graph.nodes() {
            lines.push(format!("    \"{}\";", Self::escape_label(node)));
        }

        lines.push("".to_string());

        for (a, b, weight) in graph.edges().filter(|(_, _, w)| *w >= min_weight) {
            lines.push(format!(
                "    \"{}\" -- \"{}\" [label=\"{:.3}\"];",
                Self::escape_label(a),
                Self::escape_label(b),
                weight
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Convert a dendrogram to a top-down DOT tree; internal nodes show
    /// their merge height and leaves take their module's colour.
    pub fn dendrogram_to_dot(
        root: &DendrogramNode<String>,
        partition: Option<&ModulePartition<String>>,
    ) -> String {
        let mut lines = Vec::new();

        lines.push("digraph Dendrogram {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("".to_string());

        let mut next_id = 0;
        Self::emit_dendrogram(root, partition, &mut next_id, &mut lines);

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn emit_dendrogram(
        node: &DendrogramNode<String>,
        partition: Option<&ModulePartition<String>>,
        next_id: &mut usize,
        lines: &mut Vec<String>,
    ) -> usize {
        let id = *next_id;
        *next_id += 1;
        match node {
            DendrogramNode::Leaf(name) => {
                let module = partition.and_then(|p| p.module_of(name));
                lines.push(format!(
                    "    n{} [label=\"{}\", shape=box, style=filled, fillcolor=\"{}\"];",
                    id,
                    Self::escape_label(name),
                    Self::module_color(module)
                ));
            }
            DendrogramNode::Internal {
                left, right, height, ..
            } => {
                lines.push(format!("    n{} [label=\"{:.3}\", shape=circle];", id, height));
                let left = Self::emit_dendrogram(left, partition, next_id, lines);
                let right = Self::emit_dendrogram(right, partition, next_id, lines);
                lines.push(format!("    n{} -> n{};", id, left));
                lines.push(format!("    n{} -> n{};", id, right));
            }
        }
        id
    }

    fn module_color(module: Option<usize>) -> &'static str {
        match module {
            Some(idx) => MODULE_COLORS[idx % MODULE_COLORS.len()],
            None => UNASSIGNED_COLOR,
        }
    }

    fn node_style(label: &str) -> (&'static str, &'static str) {
        if label.starts_with(EXTERNAL_PREFIX) {
            ("filled,dashed", "#6c7086")
        } else {
            ("filled", "#89b4fa")
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::modules::Module;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn two_modules() -> ModulePartition<String> {
        ModulePartition {
            modules: vec![
                Module {
                    members: vec![s("p.A"), s("p.B")],
                    average_coupling: 0.5,
                },
                Module {
                    members: vec![s("p.C")],
                    average_coupling: 1.0,
                },
            ],
            feasible: true,
        }
    }

    #[test]
    fn test_call_graph_to_dot() {
        let mut graph = DiGraph::new();
        graph.add_edge(s("p.A.run()"), s("[EXT] println"));

        let dot = DotExporter::call_graph_to_dot("MethodGraph", &graph);
        assert!(dot.starts_with("digraph MethodGraph {"));
        assert!(dot.contains("\"p.A.run()\" -> \"[EXT] println\";"));
        assert!(dot.contains("\"[EXT] println\" [style=\"filled,dashed\""));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn test_coupling_to_dot_with_modules() {
        let mut graph = WeightedGraph::new();
        graph.add_node(s("p.C"));
        graph.add_edge_undirected(s("p.A"), s("p.B"), 0.5);

        let dot = DotExporter::coupling_to_dot(&graph, Some(&two_modules()), 0.0);
        assert!(dot.starts_with("graph Coupling {"));
        assert!(dot.contains("\"p.A\" -- \"p.B\" [label=\"0.500\"];"));
        assert!(dot.contains("subgraph cluster_1 {"));
        assert!(dot.contains("label=\"module 0 (0.500)\";"));
        assert!(!dot.contains("->"));
    }

    #[test]
    fn test_coupling_to_dot_skips_light_edges() {
        let mut graph = WeightedGraph::new();
        graph.add_edge_undirected(s("p.A"), s("p.B"), 0.5);
        graph.add_edge_undirected(s("p.A"), s("p.C"), 0.1);

        let dot = DotExporter::coupling_to_dot(&graph, None, 0.25);
        assert!(dot.contains("\"p.A\" -- \"p.B\""));
        assert!(!dot.contains("\"p.A\" -- \"p.C\""));
        // nodes stay even when all their edges are filtered
        assert!(dot.contains("    \"p.C\";"));
    }

    #[test]
    fn test_dendrogram_to_dot_colours_leaves_by_module() {
        let root = DendrogramNode::merge(
            DendrogramNode::merge(
                DendrogramNode::Leaf(s("p.A")),
                DendrogramNode::Leaf(s("p.B")),
                0.5,
            ),
            DendrogramNode::Leaf(s("p.C")),
            1.0,
        );

        let dot = DotExporter::dendrogram_to_dot(&root, Some(&two_modules()));
        assert!(dot.contains("n0 [label=\"1.000\", shape=circle];"));
        assert!(dot.contains("n1 [label=\"0.500\", shape=circle];"));
        let leaf = |id: &str, name: &str, color: &str| {
            format!(
                "{} [label=\"{}\", shape=box, style=filled, fillcolor=\"{}\"];",
                id, name, color
            )
        };
        assert!(dot.contains(&leaf("n2", "p.A", "#a6e3a1")));
        assert!(dot.contains(&leaf("n4", "p.C", "#89b4fa")));
        assert!(dot.contains("n0 -> n1;"));
        assert!(dot.contains("n0 -> n4;"));

        let plain = DotExporter::dendrogram_to_dot(&root, None);
        assert!(plain.contains(&leaf("n2", "p.A", "#ffffff")));
    }

    #[test]
    fn test_report_to_dot_applies_min_weight() {
        use crate::application::analyze;
        use crate::domain::model::{Call, ExtractedClass, ExtractedMethod};
        use crate::infrastructure::config::AnalysisConfig;

        let classes = vec![
            ExtractedClass::new("p.A").with_method(
                ExtractedMethod::new("run")
                    .with_call(Call::to("p.B", "b").with_key("p.B.b()"))
                    .with_call(Call::to("p.C", "c").with_key("p.C.c()"))
                    .with_call(Call::to("p.C", "c2").with_key("p.C.c2()")),
            ),
            ExtractedClass::new("p.B").with_method(ExtractedMethod::new("b").with_key("p.B.b()")),
            ExtractedClass::new("p.C")
                .with_method(ExtractedMethod::new("c").with_key("p.C.c()"))
                .with_method(ExtractedMethod::new("c2").with_key("p.C.c2()")),
        ];
        let report = analyze(&classes, &AnalysisConfig::default()).unwrap();

        let all = DotExporter::default().report_to_dot(&report);
        assert!(all.contains("\"p.A\" -- \"p.B\" [label=\"0.333\"];"));
        assert!(all.contains("\"p.A\" -- \"p.C\" [label=\"0.667\"];"));

        let heavy = DotExporter::with_min_weight(0.5).report_to_dot(&report);
        assert!(!heavy.contains("\"p.A\" -- \"p.B\""));
        assert!(heavy.contains("\"p.A\" -- \"p.C\" [label=\"0.667\"];"));
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(DotExporter::escape_label("say \"hi\"\n"), "say \\\"hi\\\"\\n");
    }
}
