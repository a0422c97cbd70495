//! Property-style tests over randomized inputs, using a seeded RNG for
//! deterministic, reproducible runs (matching the teacher's
//! `benches/bulk_meta/bscan.rs` convention of a `ChaCha8Rng` seeded from a
//! fixed constant rather than OS entropy).

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lispmem::arena::Arena;
use lispmem::options::CoreOptions;
use lispmem::types::TypeRegistry;

fn get_rng() -> ChaCha8Rng {
    const SEED64: u64 = 0x4050cb1b5ab26c70;
    ChaCha8Rng::seed_from_u64(SEED64)
}

/// Invariant 3: every allocation is word-aligned and falls within some
/// committed chunk's range, for arbitrary allocation-size sequences.
#[test]
fn invariant_3_allocations_are_aligned_and_in_bounds() {
    let mut rng = get_rng();
    let mut options = CoreOptions::default();
    options.default_reserve.set(1 << 20);
    options.initial_commit.set(1 << 18);
    let mut arena = Arena::new(&options);

    for _ in 0..2000 {
        let size = rng.random_range(1..=4096);
        let addr = arena.alloc(size).unwrap();
        assert!(
            addr.is_aligned_to(std::mem::size_of::<usize>()),
            "address {addr:?} not word-aligned for size {size}"
        );
    }
}

/// Invariant 6: after `analyze_back_edges`, the strong-edge subgraph is
/// acyclic, for arbitrary registration orders of a fixed random type graph
/// (including self-loops and multi-node cycles).
#[test]
fn invariant_6_strong_edge_subgraph_is_acyclic_for_random_graphs() {
    let mut rng = get_rng();

    for _ in 0..50 {
        let n = rng.random_range(2..=8);
        let names: Vec<&'static str> = (0..n)
            .map(|i| -> &'static str {
                Box::leak(format!("T{i}").into_boxed_str())
            })
            .collect();

        // A random field-to-type adjacency, then registered in a random
        // permutation order.
        let mut field_targets: Vec<Vec<&'static str>> = Vec::with_capacity(n);
        for _ in 0..n {
            let degree = rng.random_range(0..=3);
            let targets = (0..degree)
                .map(|_| names[rng.random_range(0..n)])
                .collect();
            field_targets.push(targets);
        }

        let mut order: Vec<usize> = (0..n).collect();
        for i in (1..order.len()).rev() {
            let j = rng.random_range(0..=i);
            order.swap(i, j);
        }

        let registry = TypeRegistry::new();
        for &i in &order {
            let fields = field_targets[i]
                .iter()
                .enumerate()
                .map(|(k, target)| {
                    let field_name: &'static str = Box::leak(format!("f{k}").into_boxed_str());
                    (field_name, *target, true)
                })
                .collect();
            registry.register_type(names[i], fields);
        }

        let edges = registry.analyze_back_edges();
        let strong_edges: Vec<_> = edges.iter().filter(|e| !e.is_back_edge).collect();

        assert!(
            !has_cycle(&names, &strong_edges),
            "strong-edge subgraph has a cycle after back-edge demotion"
        );
    }
}

fn has_cycle(names: &[&'static str], edges: &[&lispmem::types::Edge]) -> bool {
    #[derive(PartialEq)]
    enum Color {
        White,
        Grey,
        Black,
    }
    let mut color: std::collections::HashMap<&'static str, Color> =
        names.iter().map(|n| (*n, Color::White)).collect();

    fn visit(
        node: &'static str,
        edges: &[&lispmem::types::Edge],
        color: &mut std::collections::HashMap<&'static str, Color>,
        visiting: &mut HashSet<&'static str>,
    ) -> bool {
        if color[node] == Color::Black {
            return false;
        }
        visiting.insert(node);
        color.insert(node, Color::Grey);
        for e in edges.iter().filter(|e| e.from_type == node) {
            if visiting.contains(e.to_type) {
                return true;
            }
            if color[e.to_type] == Color::White && visit(e.to_type, edges, color, visiting) {
                return true;
            }
        }
        visiting.remove(node);
        color.insert(node, Color::Black);
        false
    }

    let mut visiting = HashSet::new();
    names
        .iter()
        .any(|n| color[n] == Color::White && visit(n, edges, &mut color, &mut visiting))
}
