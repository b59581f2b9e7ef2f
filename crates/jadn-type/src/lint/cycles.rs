//! Detection of reference cycles an instance could never terminate.
//!
//! An edge is hard when a Record, Map or Array field of multiplicity
//! exactly 1..1 names another defined type. Every strongly connected
//! component of hard edges with more than one member, or with a
//! self-loop, describes values of infinite size.

use indexmap::IndexMap;

use crate::type_def::{BaseKind, TypeDefinition, TypeRef};

/// Cycles of hard edges, members and cycles in declaration order.
pub(super) fn non_optional_cycles(types: &IndexMap<String, TypeDefinition>) -> Vec<Vec<String>> {
    let graph: Vec<Vec<usize>> = types.values().map(|def| hard_edges(def, types)).collect();
    let mut tarjan = Tarjan::new(&graph);
    for v in 0..graph.len() {
        if tarjan.index[v].is_none() {
            tarjan.connect(v);
        }
    }

    let mut cycles: Vec<Vec<usize>> = tarjan
        .components
        .into_iter()
        .filter(|c| c.len() > 1 || graph[c[0]].contains(&c[0]))
        .map(|mut c| {
            c.sort_unstable();
            c
        })
        .collect();
    cycles.sort_by_key(|c| c[0]);
    cycles
        .into_iter()
        .map(|c| {
            c.into_iter()
                .filter_map(|i| types.get_index(i).map(|(name, _)| name.clone()))
                .collect()
        })
        .collect()
}

fn hard_edges(def: &TypeDefinition, types: &IndexMap<String, TypeDefinition>) -> Vec<usize> {
    if !matches!(def.kind, BaseKind::Record | BaseKind::Map | BaseKind::Array) {
        return Vec::new();
    }
    def.fields()
        .iter()
        .filter(|f| f.multiplicity.is_exactly_one())
        .filter_map(|f| match &f.type_ref {
            TypeRef::Named(name) => types.get_index_of(name.as_str()),
            _ => None,
        })
        .collect()
}

struct Tarjan<'g> {
    graph: &'g [Vec<usize>],
    next: usize,
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g [Vec<usize>]) -> Self {
        let n = graph.len();
        Self {
            graph,
            next: 0,
            index: vec![None; n],
            low: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn connect(&mut self, v: usize) {
        self.index[v] = Some(self.next);
        self.low[v] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        let graph = self.graph;
        for &w in &graph[v] {
            match self.index[w] {
                None => {
                    self.connect(w);
                    self.low[v] = self.low[v].min(self.low[w]);
                }
                Some(iw) if self.on_stack[w] => self.low[v] = self.low[v].min(iw),
                Some(_) => {}
            }
        }

        if Some(self.low[v]) == self.index[v] {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
