use serde::{Deserialize, Serialize};

use crate::application::AnalysisReport;
use crate::domain::callgraph::{DiGraph, EXTERNAL_PREFIX};
use crate::domain::coupling_graph::WeightedGraph;
use crate::domain::dendrogram::DendrogramNode;
use crate::domain::modules::ModulePartition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDto {
    pub classes: Vec<String>,
    pub linkage: String,
    pub cohesion_threshold: f64,
    pub method_graph: GraphDto,
    pub class_graph: GraphDto,
    pub coupling_graph: WeightedGraphDto,
    pub dendrogram: Option<DendrogramDto>,
    pub modules: Option<PartitionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGraphDto {
    pub nodes: Vec<String>,
    pub edges: Vec<WeightedEdgeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdgeDto {
    pub a: String,
    pub b: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DendrogramDto {
    Leaf {
        class: String,
    },
    Internal {
        height: f64,
        members: Vec<String>,
        left: Box<DendrogramDto>,
        right: Box<DendrogramDto>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDto {
    pub feasible: bool,
    pub modules: Vec<ModuleDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDto {
    pub members: Vec<String>,
    pub average_coupling: f64,
}

impl From<&DiGraph<String>> for GraphDto {
    fn from(graph: &DiGraph<String>) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|id| NodeDto {
                id: id.clone(),
                external: id.starts_with(EXTERNAL_PREFIX),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(from, to)| EdgeDto {
                from: from.clone(),
                to: to.clone(),
            })
            .collect();
        GraphDto { nodes, edges }
    }
}

impl From<&WeightedGraph<String>> for WeightedGraphDto {
    fn from(graph: &WeightedGraph<String>) -> Self {
        WeightedGraphDto {
            nodes: graph.nodes().iter().cloned().collect(),
            edges: graph
                .edges()
                .map(|(a, b, weight)| WeightedEdgeDto {
                    a: a.clone(),
                    b: b.clone(),
                    weight,
                })
                .collect(),
        }
    }
}

impl From<&DendrogramNode<String>> for DendrogramDto {
    fn from(node: &DendrogramNode<String>) -> Self {
        match node {
            DendrogramNode::Leaf(class) => DendrogramDto::Leaf { class: class.clone() },
            DendrogramNode::Internal {
                left,
                right,
                height,
                members,
            } => DendrogramDto::Internal {
                height: *height,
                members: members.clone(),
                left: Box::new(DendrogramDto::from(&**left)),
                right: Box::new(DendrogramDto::from(&**right)),
            },
        }
    }
}

impl From<&ModulePartition<String>> for PartitionDto {
    fn from(partition: &ModulePartition<String>) -> Self {
        PartitionDto {
            feasible: partition.feasible,
            modules: partition
                .modules
                .iter()
                .map(|m| ModuleDto {
                    members: m.members.clone(),
                    average_coupling: m.average_coupling,
                })
                .collect(),
        }
    }
}

impl From<&AnalysisReport> for ReportDto {
    fn from(report: &AnalysisReport) -> Self {
        ReportDto {
            classes: report.classes.clone(),
            linkage: report.linkage.to_string(),
            cohesion_threshold: report.cohesion_threshold,
            method_graph: (&report.method_graph).into(),
            class_graph: (&report.class_graph).into(),
            coupling_graph: (&report.coupling_graph).into(),
            dendrogram: report.dendrogram.as_ref().map(Into::into),
            modules: report.partition.as_ref().map(Into::into),
        }
    }
}
