//! Graph visualization: Graphviz DOT and a plain-text adjacency listing.

use std::fmt::Write;

use super::conditional::NextEntry;
use super::{CompiledStateGraph, GraphState, Route, StageId};

const START: &str = "__start__";
const END: &str = "__end__";

fn route_label<K: StageId>(route: &Route<K>) -> String {
    match route {
        Route::Stage(k) => k.to_string(),
        Route::End => END.to_string(),
    }
}

/// Generate Graphviz DOT for the graph. Router edges are dashed.
pub fn generate_dot<S: GraphState, K: StageId>(graph: &CompiledStateGraph<S, K>) -> String {
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];",
        END
    );
    for stage in graph.stages() {
        let _ = writeln!(dot, "  \"{}\";", stage);
    }
    dot.push('\n');
    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", START, graph.entry());
    for stage in graph.stages() {
        match graph.next_map.get(&stage) {
            Some(NextEntry::Unconditional(route)) => {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", stage, route_label(route));
            }
            Some(NextEntry::Conditional(router)) => {
                for route in router.targets() {
                    let _ = writeln!(
                        dot,
                        "  \"{}\" -> \"{}\" [style=dashed];",
                        stage,
                        route_label(route)
                    );
                }
            }
            None => {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", stage, END);
            }
        }
    }
    dot.push_str("}\n");
    dot
}

/// Generate a simple text representation of the graph structure.
pub fn generate_text<S: GraphState, K: StageId>(graph: &CompiledStateGraph<S, K>) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Stages: {}", graph.stages().len());
    let _ = writeln!(text, "Entry: {}", graph.entry());
    let _ = writeln!(text, "\nRoutes:");
    for stage in graph.stages() {
        let targets: Vec<String> = graph.routes_from(stage).iter().map(route_label).collect();
        let kind = match graph.next_map.get(&stage) {
            Some(NextEntry::Conditional(_)) => "?",
            _ => "",
        };
        let _ = writeln!(text, "  {} ->{} {}", stage, kind, targets.join(" | "));
    }
    text
}
