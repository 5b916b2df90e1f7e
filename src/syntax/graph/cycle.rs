use std::collections::HashMap;

use crate::syntax::Index;

/// Returns true iff adding `candidate` (a `(head, dependent)` edge) to `arcs` closes a cycle.
///
/// A self-loop counts as a cycle. The check recomputes the strongly connected components of the
/// whole edge set, which is linear in the number of edges; edge sets of a single hypothesis are
/// bounded by `max_heads * n`.
pub fn would_create_cycle(arcs: &[(Index, Index)], candidate: (Index, Index)) -> bool {
    if candidate.0 == candidate.1 {
        return true;
    }
    let mut edges = Vec::with_capacity(arcs.len() + 1);
    edges.extend_from_slice(arcs);
    edges.push(candidate);
    has_cycle(&edges)
}

pub fn has_cycle(arcs: &[(Index, Index)]) -> bool {
    arcs.iter().any(|&(h, d)| h == d)
        || strongly_connected_components(arcs)
            .iter()
            .any(|scc| scc.len() > 1)
}

/// Tarjan's strongly connected components over the nodes touched by `arcs`.
///
/// Components are returned in the order they are completed; members keep the order they were
/// popped from the stack.
///
/// References:
/// - https://en.wikipedia.org/wiki/Tarjan%27s_strongly_connected_components_algorithm
pub fn strongly_connected_components(arcs: &[(Index, Index)]) -> Vec<Vec<Index>> {
    let mut ids: HashMap<Index, usize> = HashMap::with_capacity(arcs.len() * 2);
    let mut nodes: Vec<Index> = Vec::with_capacity(arcs.len() * 2);
    let mut intern = |node: Index, nodes: &mut Vec<Index>| -> usize {
        *ids.entry(node).or_insert_with(|| {
            nodes.push(node);
            nodes.len() - 1
        })
    };
    let mut successors: Vec<Vec<usize>> = vec![];
    for &(head, dependent) in arcs {
        let h = intern(head, &mut nodes);
        let d = intern(dependent, &mut nodes);
        if successors.len() < nodes.len() {
            successors.resize_with(nodes.len(), Vec::new);
        }
        successors[h].push(d);
    }

    let mut tarjan = Tarjan {
        successors: &successors,
        counter: 0,
        index: vec![None; nodes.len()],
        lowlink: vec![0; nodes.len()],
        on_stack: vec![false; nodes.len()],
        stack: Vec::with_capacity(nodes.len()),
        components: vec![],
    };
    for v in 0..nodes.len() {
        if tarjan.index[v].is_none() {
            tarjan.strongconnect(v);
        }
    }
    tarjan
        .components
        .into_iter()
        .map(|scc| scc.into_iter().map(|v| nodes[v]).collect())
        .collect()
}

struct Tarjan<'a> {
    successors: &'a [Vec<usize>],
    counter: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl<'a> Tarjan<'a> {
    fn strongconnect(&mut self, v: usize) {
        self.index[v] = Some(self.counter);
        self.lowlink[v] = self.counter;
        self.counter += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        let successors = self.successors;
        for &w in &successors[v] {
            match self.index[w] {
                None => {
                    self.strongconnect(w);
                    self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                }
                Some(w_index) if self.on_stack[w] => {
                    self.lowlink[v] = self.lowlink[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlink[v]) == self.index[v] {
            let mut component = vec![];
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
