//! Per-type field strengths and the ownership graph's back-edge detector.
//!
//! Grounded on the teacher's `spin::RwLock`-guarded process-wide table
//! pattern (seen throughout the teacher for `OptionMap`/global state) for
//! the registry's interior mutability, and on plain DFS over an adjacency
//! list for `analyze_back_edges` — no teacher file runs a graph analysis
//! like this one, so the traversal itself is written from the spec's
//! white/grey/black description rather than adapted from a specific file.

use std::collections::HashMap;

use lazy_static::lazy_static;
use spin::RwLock;

lazy_static! {
    /// The process-wide type registry. Built once at program load and
    /// immutable thereafter per the "shared-resource policy" (every
    /// reader sees the fixed point after the front end finishes
    /// registering types), matching the teacher's `lazy_static!` +
    /// `spin::RwLock` pattern for process-wide singletons.
    pub static ref TYPE_REGISTRY: TypeRegistry = TypeRegistry::new();
}

/// Whether a field keeps its referent alive.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Strength {
    /// Not a scannable reference (e.g. a raw integer field).
    Untraced,
    /// Keeps the referent alive; traced by the collector.
    Strong,
    /// Relation only; demoted from `Strong` by back-edge detection.
    Weak,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub type_name: &'static str,
    pub is_scannable: bool,
    pub strength: Strength,
}

#[derive(Clone, Debug)]
pub struct TypeDef {
    pub name: &'static str,
    pub fields: Vec<Field>,
    pub is_recursive: bool,
}

/// `(from_type, field_name, to_type, is_back_edge)`.
#[derive(Clone, Debug)]
pub struct Edge {
    pub from_type: &'static str,
    pub field_name: &'static str,
    pub to_type: &'static str,
    pub is_back_edge: bool,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Color {
    White,
    Grey,
    Black,
}

/// Maps type names to their definitions and the ownership graph derived
/// from them. One registry per process; construct with
/// [`TypeRegistry::new`] and share behind an `Arc` if more than one
/// thread registers types (registration is expected to happen once at
/// program-load time, ahead of any allocation).
pub struct TypeRegistry {
    types: RwLock<HashMap<&'static str, TypeDef>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `name` with `fields`. Each field's strength starts
    /// `Strong` if scannable else `Untraced`; `is_recursive` is set when
    /// any field's `type_name == name`.
    pub fn register_type(
        &self,
        name: &'static str,
        fields: Vec<(&'static str, &'static str, bool)>,
    ) {
        let is_recursive = fields.iter().any(|(_, type_name, _)| *type_name == name);
        let fields = fields
            .into_iter()
            .map(|(field_name, type_name, is_scannable)| Field {
                name: field_name,
                type_name,
                is_scannable,
                strength: if is_scannable {
                    Strength::Strong
                } else {
                    Strength::Untraced
                },
            })
            .collect();
        self.types.write().insert(
            name,
            TypeDef {
                name,
                fields,
                is_recursive,
            },
        );
    }

    /// Emits one edge per scannable field across every registered type.
    pub fn build_ownership_graph(&self) -> Vec<Edge> {
        let types = self.types.read();
        let mut edges = Vec::new();
        for def in types.values() {
            for field in &def.fields {
                if field.is_scannable {
                    edges.push(Edge {
                        from_type: def.name,
                        field_name: field.name,
                        to_type: field.type_name,
                        is_back_edge: false,
                    });
                }
            }
        }
        edges
    }

    /// DFS colouring over the scannable-field adjacency: entering a node
    /// marks it grey; an edge into a grey node is a back edge, and its
    /// field is demoted to [`Strength::Weak`] in the registry. Black
    /// nodes are skipped. Returns the edges with `is_back_edge` filled
    /// in. Order of registration does not affect the fixed point because
    /// every node is eventually visited regardless of traversal start.
    pub fn analyze_back_edges(&self) -> Vec<Edge> {
        let names: Vec<&'static str> = self.types.read().keys().copied().collect();
        let mut color: HashMap<&'static str, Color> =
            names.iter().map(|n| (*n, Color::White)).collect();
        let mut edges = self.build_ownership_graph();
        let mut weak_fields: Vec<(&'static str, &'static str)> = Vec::new();

        for start in &names {
            if color[start] == Color::White {
                self.dfs(start, &mut color, &mut edges, &mut weak_fields);
            }
        }

        if !weak_fields.is_empty() {
            let mut types = self.types.write();
            for (type_name, field_name) in weak_fields {
                if let Some(def) = types.get_mut(type_name) {
                    if let Some(field) = def.fields.iter_mut().find(|f| f.name == field_name) {
                        field.strength = Strength::Weak;
                    }
                }
            }
        }

        edges
    }

    // Indexes into `edges` rather than holding an iterator across the
    // recursive call, so the same `edges` vector is mutated at every
    // depth instead of each recursion level rebuilding (and discarding)
    // its own copy.
    fn dfs(
        &self,
        node: &'static str,
        color: &mut HashMap<&'static str, Color>,
        edges: &mut Vec<Edge>,
        weak_fields: &mut Vec<(&'static str, &'static str)>,
    ) {
        color.insert(node, Color::Grey);
        let from_node: Vec<usize> = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.from_type == node)
            .map(|(i, _)| i)
            .collect();
        for i in from_node {
            let to = edges[i].to_type;
            match color.get(to).copied() {
                Some(Color::Grey) => {
                    edges[i].is_back_edge = true;
                    weak_fields.push((edges[i].from_type, edges[i].field_name));
                }
                Some(Color::White) => {
                    self.dfs(to, color, edges, weak_fields);
                }
                _ => {}
            }
        }
        color.insert(node, Color::Black);
    }

    pub fn get(&self, name: &str) -> Option<TypeDef> {
        self.types.read().get(name).cloned()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acyclic_registration_has_no_back_edges() {
        let reg = TypeRegistry::new();
        reg.register_type("Pair", vec![("car", "Atom", true), ("cdr", "Atom", true)]);
        reg.register_type("Atom", vec![]);
        let edges = reg.analyze_back_edges();
        assert!(edges.iter().all(|e| !e.is_back_edge));
    }

    #[test]
    fn a_self_referential_field_is_demoted_to_weak() {
        let reg = TypeRegistry::new();
        reg.register_type("Node", vec![("next", "Node", true)]);
        let edges = reg.analyze_back_edges();
        assert!(edges.iter().any(|e| e.is_back_edge));
        let def = reg.get("Node").unwrap();
        assert_eq!(def.fields[0].strength, Strength::Weak);
        assert!(def.is_recursive);
    }

    #[test]
    fn registration_order_does_not_affect_the_fixed_point() {
        let forward = TypeRegistry::new();
        forward.register_type("A", vec![("b", "B", true)]);
        forward.register_type("B", vec![("a", "A", true)]);

        let backward = TypeRegistry::new();
        backward.register_type("B", vec![("a", "A", true)]);
        backward.register_type("A", vec![("b", "B", true)]);

        let e1 = forward.analyze_back_edges();
        let e2 = backward.analyze_back_edges();
        let back_edges_1 = e1.iter().filter(|e| e.is_back_edge).count();
        let back_edges_2 = e2.iter().filter(|e| e.is_back_edge).count();
        assert_eq!(back_edges_1, back_edges_2);
        assert_eq!(back_edges_1, 1);
    }
}
