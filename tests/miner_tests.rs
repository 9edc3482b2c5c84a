use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use logstencil::miner::{StructureMiner, MAX_LINE_BYTES};
use logstencil::progress::Progress;
use logstencil::render;
use logstencil::tree::{NodeId, PatternTree};

fn first_child(tree: &PatternTree, id: NodeId) -> NodeId {
    tree.child(id).expect("child node")
}

#[test]
fn reader_ingestion_skips_empty_lines() {
    let mut miner = StructureMiner::new();
    let added = miner
        .ingest_reader(Cursor::new("alpha beta\n\nalpha gamma\n"))
        .expect("read");
    assert_eq!(added, 2);

    let tree = miner.tree();
    let alpha = first_child(tree, tree.root());
    assert_eq!(tree.values(alpha)[0].text, "alpha");
    assert_eq!(tree.values(alpha)[0].occurs, 2);
    let beta = first_child(tree, alpha);
    assert_eq!(tree.values(beta)[0].text, "beta");
    let gamma = tree.sibling(beta).expect("sibling branch");
    assert_eq!(tree.values(gamma)[0].text, "gamma");
}

#[test]
fn whitespace_only_line_terminates_at_the_root() {
    let mut miner = StructureMiner::new();
    miner.ingest_line("   ");
    let tree = miner.tree();
    assert_eq!(tree.terminal_count(tree.root()), 1);
    assert!(tree.child(tree.root()).is_none());
}

#[test]
fn overlong_lines_are_clipped_not_buffered() {
    let mut line = "a".repeat(MAX_LINE_BYTES + 8 * 1024);
    line.push_str(" tail");
    let mut miner = StructureMiner::new();
    miner.ingest_line(&line);

    let tree = miner.tree();
    let node = first_child(tree, tree.root());
    assert_eq!(tree.values(node)[0].text.len(), MAX_LINE_BYTES);
    // everything past the bound, including "tail", was dropped
    assert!(tree.child(node).is_none());
    assert!(tree.sibling(node).is_none());
}

#[test]
fn masked_address_inserts_three_consecutive_nodes() {
    let mut miner = StructureMiner::new();
    miner.ingest_line("blocked 10.0.0.1/24 inbound");

    let tree = miner.tree();
    let mut texts = Vec::new();
    let mut cursor = tree.child(tree.root());
    while let Some(id) = cursor {
        texts.push(tree.values(id)[0].text.clone());
        cursor = tree.child(id);
    }
    assert_eq!(texts, ["blocked", "%ipv4%", "/", "%posint%", "inbound"]);
}

#[test]
fn insertion_order_only_affects_sibling_and_value_order() {
    let forward = ["user bob login", "user alice login"];
    let backward = ["user alice login", "user bob login"];

    let slot_values = |lines: &[&str]| -> Vec<String> {
        let mut miner = StructureMiner::new();
        for line in lines {
            miner.ingest_line(line);
        }
        let tree = miner.tree();
        let user = first_child(tree, tree.root());
        let slot = first_child(tree, user);
        let mut texts: Vec<String> = tree.values(slot).iter().map(|v| v.text.clone()).collect();
        texts.sort_unstable();
        texts
    };

    assert_eq!(slot_values(&forward), slot_values(&backward));
    assert_eq!(slot_values(&forward), ["alice", "bob"]);
}

struct Recorder(Rc<RefCell<Vec<String>>>);

impl Progress for Recorder {
    fn tick(&mut self, label: &str) {
        self.0.borrow_mut().push(label.to_string());
    }
    fn finish(&mut self) {
        self.0.borrow_mut().push("<finish>".to_string());
    }
}

#[test]
fn progress_reporting_is_purely_observational() {
    let lines = ["a b c", "a x c", "q r"];

    let labels = Rc::new(RefCell::new(Vec::new()));
    let mut observed = StructureMiner::with_progress(Box::new(Recorder(labels.clone())));
    let mut silent = StructureMiner::new();
    for line in &lines {
        observed.ingest_line(line);
        silent.ingest_line(line);
    }
    observed.refine();
    silent.refine();

    assert_eq!(
        render::render_to_string(observed.tree()),
        render::render_to_string(silent.tree())
    );

    let labels = labels.borrow();
    assert_eq!(labels.iter().filter(|l| *l == "reading").count(), 3);
    assert!(labels.iter().any(|l| l == "refining"));
    assert_eq!(labels.last().map(String::as_str), Some("<finish>"));
}
