//! End-to-end scenarios through `application::analyze`.

use archmap::application::analyze;
use archmap::domain::coupling::coupling;
use archmap::domain::dendrogram::{DendrogramNode, Linkage};
use archmap::domain::model::{Call, ExtractedClass, ExtractedMethod};
use archmap::infrastructure::config::AnalysisConfig;

fn s(v: &str) -> String {
    v.to_string()
}

/// `caller` gets three methods, each calling `callee.target()`.
fn caller(name: &str, callee: &str) -> ExtractedClass {
    let key = format!("{}.target()", callee);
    (1..=3).fold(ExtractedClass::new(name), |class, i| {
        class.with_method(
            ExtractedMethod::new(format!("m{}", i))
                .with_call(Call::to(callee, "target").with_key(key.clone())),
        )
    })
}

fn callee(name: &str) -> ExtractedClass {
    let key = format!("{}.target()", name);
    ExtractedClass::new(name).with_method(ExtractedMethod::new("target").with_key(key))
}

fn four_classes() -> Vec<ExtractedClass> {
    vec![caller("a.A", "a.B"), callee("a.B"), caller("a.C", "a.D"), callee("a.D")]
}

#[test]
fn two_sibling_pairs_become_two_modules() {
    let classes = four_classes();
    let config = AnalysisConfig {
        cohesion_threshold: 0.4,
        linkage: Linkage::Single,
        ..Default::default()
    };
    let report = analyze(&classes, &config).expect("analysis should succeed");

    assert_eq!(report.method_graph.node_count(), 8);
    assert_eq!(report.method_graph.edge_count(), 6);

    assert_eq!(coupling(&report.method_graph, &classes, &classes[0], &classes[1]), 0.5);
    assert_eq!(coupling(&report.method_graph, &classes, &classes[2], &classes[3]), 0.5);
    assert_eq!(coupling(&report.method_graph, &classes, &classes[0], &classes[2]), 0.0);
    assert_eq!(report.coupling_graph.weight(&s("a.A"), &s("a.B")), Some(0.5));
    assert_eq!(report.coupling_graph.edge_count(), 2);

    let root = report.dendrogram.expect("non-empty model has a dendrogram");
    assert_eq!(root.height(), 1.0);
    assert_eq!(root.heights(), vec![1.0, 0.5, 0.5]);
    let (left, right) = root.children().expect("root is a merge");
    assert_eq!(left.members(), [s("a.A"), s("a.B")]);
    assert_eq!(right.members(), [s("a.C"), s("a.D")]);

    let partition = report.partition.expect("non-empty model has a partition");
    assert!(partition.feasible);
    assert_eq!(partition.len(), 2);
    assert_eq!(partition.modules[0].members, vec![s("a.A"), s("a.B")]);
    assert_eq!(partition.modules[1].members, vec![s("a.C"), s("a.D")]);
    assert_eq!(partition.average_couplings(), vec![0.5, 0.5]);
}

#[test]
fn single_class_is_one_cohesive_module() {
    let classes = vec![ExtractedClass::new("solo.Only").with_method(ExtractedMethod::new("run"))];
    let report = analyze(&classes, &AnalysisConfig::default()).expect("analysis should succeed");

    assert_eq!(report.method_graph.node_count(), 1);
    assert_eq!(report.method_graph.edge_count(), 0);
    assert_eq!(report.coupling_graph.node_count(), 1);
    assert_eq!(report.coupling_graph.edge_count(), 0);

    let root = report.dendrogram.expect("dendrogram");
    assert_eq!(root, DendrogramNode::Leaf(s("solo.Only")));
    assert_eq!(root.height(), 0.0);

    let partition = report.partition.expect("partition");
    assert!(partition.feasible);
    assert_eq!(partition.len(), 1);
    assert_eq!(partition.modules[0].members, vec![s("solo.Only")]);
    assert_eq!(partition.modules[0].average_coupling, 1.0);
}

#[test]
fn external_calls_dropped_when_excluded() {
    let classes = vec![ExtractedClass::new("app.Main").with_method(
        ExtractedMethod::new("main")
            .with_call(Call::to("java.util.List", "add").with_signature("java.util.List.add(E)")),
    )];

    let excluded = AnalysisConfig {
        include_external: false,
        ..Default::default()
    };
    let report = analyze(&classes, &excluded).expect("analysis should succeed");
    assert_eq!(report.method_graph.node_count(), 1);
    assert_eq!(report.method_graph.edge_count(), 0);
    assert_eq!(report.class_graph.edge_count(), 0);

    let report = analyze(&classes, &AnalysisConfig::default()).expect("analysis should succeed");
    assert_eq!(report.method_graph.edge_count(), 1);
    assert!(report
        .method_graph
        .contains_edge(&s("app.Main.main()"), &s("[EXT] java.util.List.add(E)")));
    assert!(report.class_graph.contains_edge(&s("app.Main"), &s("[EXT] java.util.List")));
}

#[test]
fn duplicate_class_identities_collapse() {
    let classes = vec![callee("a.B"), callee("a.B"), caller("a.A", "a.B")];
    let report = analyze(&classes, &AnalysisConfig::default()).expect("analysis should succeed");

    assert_eq!(report.classes, vec![s("a.B"), s("a.A")]);
    assert_eq!(report.dendrogram.expect("dendrogram").leaf_count(), 2);
}

#[test]
fn unnamed_class_is_rejected() {
    let classes = vec![ExtractedClass::default()];
    assert!(analyze(&classes, &AnalysisConfig::default()).is_err());
}
