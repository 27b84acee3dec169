// Analysis core: pure, in-memory algorithms over the extracted model.

pub mod callgraph;
pub mod coupling;
pub mod coupling_graph;
pub mod dendrogram;
pub mod index;
pub mod model;
pub mod modules;
pub mod ordered;
pub mod resolver;
