use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use roget_db::{LoadMode, NodeKind, Thesaurus};

fn main() -> Result<()> {
    let source = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p roget-db --example stats -- <path-to-roget.txt> [word word]")?;

    let thesaurus = Thesaurus::load_with_mode(&source, LoadMode::Mmap)
        .with_context(|| format!("loading thesaurus from {}", source.display()))?;

    let mut counts = [0usize; 4];
    let mut links = 0usize;
    for node in thesaurus.iter_nodes() {
        let slot = match node.kind() {
            NodeKind::Category => 0,
            NodeKind::HeadWord => 1,
            NodeKind::SenseGroup => 2,
            NodeKind::Sense => 3,
        };
        counts[slot] += 1;
        if node.link().is_some() {
            links += 1;
        }
    }

    println!("Source       : {}", source.display());
    println!("Nodes        : {}", thesaurus.node_count());
    println!("Categories   : {}", counts[0]);
    println!("Headwords    : {}", counts[1]);
    println!("Sense groups : {}", counts[2]);
    println!("Senses       : {}", counts[3]);
    println!("Links        : {}", links);
    println!("Distinct keys: {}", thesaurus.key_count());

    let pair: Vec<String> = env::args().skip(2).take(2).collect();
    let (first, second) = match pair.as_slice() {
        [a, b] => (a.as_str(), b.as_str()),
        _ => ("being", "entity"),
    };
    let sim = thesaurus.similarity(first, second);
    match sim.node {
        Some(node) => println!(
            "similarity({first}, {second}) = {} via {} '{}'",
            sim.score,
            node.kind(),
            node.key()
        ),
        None => println!("similarity({first}, {second}) = 0"),
    }

    Ok(())
}
