//! Shape analysis: infers a binding's structural shape from its declared
//! type, to pick a free strategy.
//!
//! No teacher analogue; grounded (like escape analysis) on
//! `codegraph-core`'s node-kind classification traversal for the visitor
//! shape. The classification rules below are original to this spec.

use crate::types::{Strength, TypeRegistry};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Shape {
    Unknown,
    Atom,
    Pair,
    List,
    Tree,
    Graph,
    CyclePossible,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FreeStrategy {
    Asap,
    Scc,
    DeferredRc,
}

/// `Atom, Pair, List` free immediately at last use; `Tree` roots an SCC
/// collection; everything else (including the conservative `Unknown`
/// fallback) defers to reference counting.
pub fn free_strategy(shape: Shape) -> FreeStrategy {
    match shape {
        Shape::Atom | Shape::Pair | Shape::List => FreeStrategy::Asap,
        Shape::Tree => FreeStrategy::Scc,
        Shape::Graph | Shape::CyclePossible | Shape::Unknown => FreeStrategy::DeferredRc,
    }
}

/// Infers the shape of `type_name` from its registered definition.
/// Unregistered types conservatively fall back to [`Shape::Unknown`],
/// which `free_strategy` treats as [`Shape::Graph`] at free time.
pub fn infer_shape(type_name: &str, registry: &TypeRegistry) -> Shape {
    let def = match registry.get(type_name) {
        Some(d) => d,
        None => return Shape::Unknown,
    };

    let scannable: Vec<_> = def.fields.iter().filter(|f| f.is_scannable).collect();

    if scannable.is_empty() {
        return Shape::Atom;
    }

    // A back edge was discovered and the field demoted to Weak: aliased
    // subparts are reachable from more than one path.
    if def.fields.iter().any(|f| f.strength == Strength::Weak) {
        return Shape::CyclePossible;
    }

    if !def.is_recursive && scannable.len() == 2 {
        return Shape::Pair;
    }

    if def.is_recursive {
        let self_typed = scannable
            .iter()
            .filter(|f| f.type_name == type_name)
            .count();
        // A single self-typed field alongside at most one terminator
        // field is a null-terminated cons chain.
        return if self_typed == 1 && scannable.len() <= 2 {
            Shape::List
        } else {
            Shape::Tree
        };
    }

    if scannable.len() >= 2 {
        return Shape::Tree;
    }

    Shape::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_type_with_no_scannable_fields_is_an_atom() {
        let reg = TypeRegistry::new();
        reg.register_type("Int", vec![]);
        assert_eq!(infer_shape("Int", &reg), Shape::Atom);
    }

    #[test]
    fn a_two_field_non_recursive_type_is_a_pair() {
        let reg = TypeRegistry::new();
        reg.register_type("Pair", vec![("car", "Atom", true), ("cdr", "Atom", true)]);
        assert_eq!(infer_shape("Pair", &reg), Shape::Pair);
        assert_eq!(free_strategy(infer_shape("Pair", &reg)), FreeStrategy::Asap);
    }

    #[test]
    fn a_singly_self_referential_type_is_a_list() {
        let reg = TypeRegistry::new();
        reg.register_type("Node", vec![("next", "Node", true), ("terminator", "Atom", true)]);
        assert_eq!(infer_shape("Node", &reg), Shape::List);
    }

    #[test]
    fn a_recursive_type_with_two_independent_children_is_a_tree() {
        let reg = TypeRegistry::new();
        reg.register_type(
            "TreeNode",
            vec![("left", "TreeNode", true), ("right", "TreeNode", true)],
        );
        assert_eq!(infer_shape("TreeNode", &reg), Shape::Tree);
        assert_eq!(free_strategy(Shape::Tree), FreeStrategy::Scc);
    }

    #[test]
    fn a_back_edge_field_makes_the_shape_cycle_possible() {
        let reg = TypeRegistry::new();
        reg.register_type("Cyclic", vec![("next", "Cyclic", true)]);
        reg.analyze_back_edges();
        assert_eq!(infer_shape("Cyclic", &reg), Shape::CyclePossible);
        assert_eq!(
            free_strategy(Shape::CyclePossible),
            FreeStrategy::DeferredRc
        );
    }

    #[test]
    fn an_unregistered_type_conservatively_falls_back_to_deferred_rc() {
        let reg = TypeRegistry::new();
        assert_eq!(infer_shape("Ghost", &reg), Shape::Unknown);
        assert_eq!(free_strategy(Shape::Unknown), FreeStrategy::DeferredRc);
    }
}
