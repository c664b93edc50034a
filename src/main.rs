//! Command-line flow file inspector: parses and structurally validates a
//! saved flow document and prints a short summary.

use floweditor::parse_flow_file;
use std::collections::BTreeMap;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Set up logging for development
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: floweditor <flow.json>");
        return ExitCode::FAILURE;
    };

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    match parse_flow_file(&contents) {
        Ok(document) => {
            let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
            for node in &document.nodes {
                *by_type.entry(node.node_type.as_str()).or_default() += 1;
            }
            println!(
                "{path}: valid flow with {} node(s), {} edge(s)",
                document.nodes.len(),
                document.edges.len()
            );
            for (node_type, count) in by_type {
                println!("  {count:4} x {node_type}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{path}: {e}");
            ExitCode::FAILURE
        }
    }
}
