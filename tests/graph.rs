extern crate semgraph;

mod test_utils;

use std::io::Write;

use semgraph::io::prelude::*;
use semgraph::io::Reader;
use semgraph::syntax::graph::{
    format_deps, has_cycle, parse_deps, strongly_connected_components, would_create_cycle,
    DependencyGraph, Error,
};
use semgraph::syntax::transition::PriorOrder;

#[test]
fn test_parse_deps() {
    assert!(parse_deps("_").unwrap().is_empty());
    assert_eq!(
        parse_deps("0:root|3:nmod:poss").unwrap(),
        vec![(0, "root".to_string()), (3, "nmod:poss".to_string())]
    );
    assert!(parse_deps("x:root").is_err());
    assert!(parse_deps("3").is_err());
    assert!(parse_deps("3:").is_err());
}

#[test]
fn test_notation_round_trip() {
    for line in test_utils::mock::provide_sentences() {
        let graph: DependencyGraph = line.parse().unwrap();
        assert_eq!(graph.to_string(), line);
        for (field, word) in graph.to_deps_fields().iter().zip(1..) {
            assert_eq!(*field, format_deps(graph.heads(word)));
        }
    }
}

#[test]
fn test_graph_accessors() {
    let graph: DependencyGraph = "2:nsubj|4:nsubj\t0:root\t4:cc\t2:conj".parse().unwrap();
    assert_eq!(graph.len(), 4);
    assert_eq!(graph.num_arcs(), 5);
    assert_eq!(graph.max_fan_in(), 2);
    assert_eq!(graph.num_heads(1), 2);
    assert_eq!(graph.heads(1)[1], (4, "nsubj".to_string()));
    assert!(graph.heads(0).is_empty());
    assert!(graph.heads(9).is_empty());
    assert!(graph.is_acyclic());
    let arc_set = graph.arc_set();
    assert!(arc_set.contains(&(3, 4, "cc".to_string())));
    assert_eq!(arc_set.len(), 5);

    let empty: DependencyGraph = "".parse().unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.num_arcs(), 0);
}

#[test]
fn test_graph_validation() {
    assert_eq!(
        "0:root\t5:dep".parse::<DependencyGraph>(),
        Err(Error::OutOfRange(5))
    );
    assert_eq!(
        "0:root\t2:dep".parse::<DependencyGraph>(),
        Err(Error::SelfLoop(2))
    );
    assert_eq!(
        "0:root|0:dep".parse::<DependencyGraph>(),
        Err(Error::DuplicateArc(0, 1))
    );
    assert_eq!(
        "2:a\t1:b".parse::<DependencyGraph>(),
        Err(Error::Cycle)
    );
    assert_eq!(
        "2:a\t3:b\t1:c".parse::<DependencyGraph>(),
        Err(Error::Cycle)
    );

    let mut graph = DependencyGraph::new(3);
    graph.add_arc(1, 0, "root").unwrap();
    graph.add_arc(2, 1, "a").unwrap();
    graph.add_arc(3, 2, "b").unwrap();
    assert_eq!(graph.add_arc(1, 3, "c"), Err(Error::Cycle));
    assert_eq!(graph.add_arc(2, 2, "c"), Err(Error::SelfLoop(2)));
    assert_eq!(graph.add_arc(0, 1, "c"), Err(Error::OutOfRange(0)));
    assert_eq!(graph.add_arc(3, 2, "c"), Err(Error::DuplicateArc(2, 3)));
    graph.add_arc(3, 0, "c").unwrap();
    assert_eq!(graph.num_arcs(), 4);
    assert_eq!(graph.heads(3), &[(2, "b"), (0, "c")]);
}

#[test]
fn test_graph_json_is_validated() {
    for graph in test_utils::mock::provide_graphs() {
        let json = serde_json::to_string(&graph).unwrap();
        let restored: DependencyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
    }
    let empty: DependencyGraph = serde_json::from_str(r#"{"heads":[[]]}"#).unwrap();
    assert!(empty.is_empty());

    // 1 <- 2 <- 1
    assert!(serde_json::from_str::<DependencyGraph>(r#"{"heads":[[],[[2,"a"]],[[1,"b"]]]}"#)
        .is_err());
    // no root slot
    assert!(serde_json::from_str::<DependencyGraph>(r#"{"heads":[]}"#).is_err());
    // the root takes no heads
    assert!(serde_json::from_str::<DependencyGraph>(r#"{"heads":[[[1,"a"]],[]]}"#).is_err());
    assert!(serde_json::from_str::<DependencyGraph>(r#"{"heads":[[],[[1,"a"]]]}"#).is_err());
}

#[test]
fn test_cycle_checker() {
    assert!(would_create_cycle(&[], (1, 1)));
    assert!(!would_create_cycle(&[], (0, 1)));
    assert!(!would_create_cycle(&[(0, 1), (1, 2)], (0, 2)));
    assert!(would_create_cycle(&[(0, 1), (1, 2), (2, 3)], (3, 1)));
    assert!(!would_create_cycle(&[(0, 1), (1, 2), (2, 3)], (1, 3)));
    assert!(has_cycle(&[(4, 4)]));
    assert!(!has_cycle(&[]));

    let mut components = strongly_connected_components(&[(1, 2), (2, 3), (3, 1), (3, 4), (5, 4)]);
    for component in components.iter_mut() {
        component.sort();
    }
    components.sort();
    assert_eq!(components, vec![vec![1, 2, 3], vec![4], vec![5]]);
}

#[test]
fn test_arrange() {
    let graph: DependencyGraph = "_\t_\t_\t5:a|1:b|2:c|0:d|6:e\t_\t_".parse().unwrap();
    let heads = |g: &DependencyGraph| g.heads(4).iter().map(|&(h, _)| h).collect::<Vec<_>>();
    assert_eq!(heads(&graph.arrange(PriorOrder::DeepFirst)), vec![5, 1, 2, 0, 6]);
    assert_eq!(heads(&graph.arrange(PriorOrder::LeftToRight)), vec![0, 1, 2, 5, 6]);
    assert_eq!(heads(&graph.arrange(PriorOrder::InsideOut)), vec![2, 1, 0, 5, 6]);
    assert_eq!(
        graph.arrange(PriorOrder::InsideOut).arc_set(),
        graph.arc_set()
    );
}

#[test]
fn test_read_graphs_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in test_utils::mock::provide_sentences() {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();

    let mut graphs: Vec<DependencyGraph> = vec![];
    let count = Reader::open(file.path()).unwrap().read(&mut graphs).unwrap();
    assert_eq!(count, 4);
    assert_eq!(graphs, test_utils::mock::provide_graphs());

    let mut broken = tempfile::NamedTempFile::new().unwrap();
    writeln!(broken, "0:root").unwrap();
    writeln!(broken, "2:a\t1:b").unwrap();
    broken.flush().unwrap();
    let mut graphs: Vec<DependencyGraph> = vec![];
    let mut reader = Reader::open(broken.path()).unwrap();
    let e = reader.read(&mut graphs).unwrap_err();
    assert_eq!(e.kind(), std::io::ErrorKind::InvalidData);
    assert!(e.to_string().starts_with("line 2: "), "{}", e);
    assert_eq!(reader.lineno(), 2);
    assert_eq!(graphs.len(), 1);
}
