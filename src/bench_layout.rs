//! Layout Benchmark - Full relayout vs cached relayout
//!
//! Run with: cargo test --lib bench_layout --release -- --nocapture

use std::time::Instant;

use crate::{Direction, FlexDirection, LayoutTree, NodeId, Style, Value};

const BENCH_NODES: usize = 1000;
const BENCH_ITERATIONS: usize = 100;
const VIEWPORT_WIDTH: f32 = 120.0;
const VIEWPORT_HEIGHT: f32 = 40.0;

/// Root -> 10 growing rows -> fixed-size leaves distributed among them.
fn create_tree(node_count: usize) -> (LayoutTree, NodeId, Vec<NodeId>) {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();

    let rows: Vec<NodeId> = (0..10)
        .map(|_| {
            tree.new_node_with_style(Style {
                flex_direction: FlexDirection::Row,
                flex_grow: Some(1.0),
                ..Style::default()
            })
        })
        .collect();
    tree.add_children(root, &rows).unwrap();

    let mut leaves = Vec::with_capacity(node_count);
    for i in 11..node_count {
        let leaf = tree.new_node_with_style(Style {
            width: Value::point(10.0),
            height: Value::point(1.0),
            ..Style::default()
        });
        tree.add_child(rows[(i - 11) % rows.len()], leaf).unwrap();
        leaves.push(leaf);
    }
    (tree, root, leaves)
}

#[test]
fn bench_layout_comparison() {
    println!("\n========================================");
    println!("Layout Benchmark: {} nodes, {} iterations", BENCH_NODES, BENCH_ITERATIONS);
    println!("========================================\n");

    let (mut tree, root, leaves) = create_tree(BENCH_NODES);
    tree.calculate_layout(root, Some(VIEWPORT_WIDTH), Some(VIEWPORT_HEIGHT), Direction::Ltr)
        .unwrap();
    let expected = *tree.layout(leaves[0]).unwrap();

    // Nothing dirty: every pass is answered from the root's cache.
    let start = Instant::now();
    for _ in 0..BENCH_ITERATIONS {
        tree.calculate_layout(root, Some(VIEWPORT_WIDTH), Some(VIEWPORT_HEIGHT), Direction::Ltr)
            .unwrap();
    }
    let cached_elapsed = start.elapsed();

    // One dirty leaf per pass: its ancestors rerun, its siblings hit cache.
    let start = Instant::now();
    for i in 0..BENCH_ITERATIONS {
        let leaf = leaves[i % leaves.len()];
        tree.update_style(leaf, |style| style.margin.set(crate::Edge::Left, (i % 2) as f32))
            .unwrap();
        tree.calculate_layout(root, Some(VIEWPORT_WIDTH), Some(VIEWPORT_HEIGHT), Direction::Ltr)
            .unwrap();
    }
    let dirty_elapsed = start.elapsed();

    // Fresh tree every pass.
    let start = Instant::now();
    for _ in 0..BENCH_ITERATIONS / 10 {
        let (mut fresh, fresh_root, _) = create_tree(BENCH_NODES);
        fresh
            .calculate_layout(
                fresh_root,
                Some(VIEWPORT_WIDTH),
                Some(VIEWPORT_HEIGHT),
                Direction::Ltr,
            )
            .unwrap();
    }
    let full_elapsed = start.elapsed() * 10;

    let per_iter = |elapsed: std::time::Duration| {
        elapsed.as_nanos() as f64 / BENCH_ITERATIONS as f64 / 1000.0
    };
    println!("Cached:  {:.2} µs per pass", per_iter(cached_elapsed));
    println!("Dirty:   {:.2} µs per pass", per_iter(dirty_elapsed));
    println!("Full:    {:.2} µs per pass", per_iter(full_elapsed));
    println!("========================================\n");

    let first = tree.layout(leaves[0]).unwrap();
    assert_eq!(first.width(), expected.width());
    assert_eq!(first.height(), expected.height());
}
