use super::{Error, Transition};
use crate::syntax::graph::{DependencyGraph, Error as GraphError};
use crate::syntax::Index;

/// Rebuilds a graph of `num_words` words from a transition sequence and its per-step labels.
///
/// Transitions must come grouped by dependent in increasing order, each group ending with its
/// sentinel. Labels are read only at real arcs.
pub fn materialize<L: Clone>(
    transitions: &[Transition],
    labels: &[Option<L>],
    num_words: usize,
) -> Result<DependencyGraph<L>, Error> {
    if transitions.len() != labels.len() {
        return Err(Error::InvalidArgument);
    }
    let mut heads: Vec<Vec<(Index, L)>> = Vec::with_capacity(num_words);
    let mut buffer = Vec::new();
    let mut expected: Index = 1;
    for (transition, label) in transitions.iter().zip(labels) {
        if transition.dependent != expected || expected as usize > num_words {
            return Err(Error::OutOfOrder);
        }
        if transition.is_sentinel() {
            heads.push(buffer);
            buffer = Vec::new();
            expected += 1;
        } else {
            let label = label.as_ref().ok_or(Error::InvalidArgument)?;
            buffer.push((transition.head, label.clone()));
        }
    }
    if heads.len() != num_words {
        return Err(Error::Incomplete);
    }
    DependencyGraph::from_heads(heads).map_err(|e| match e {
        GraphError::DuplicateArc(..) => Error::DuplicateArc,
        GraphError::Cycle => Error::Cycle,
        GraphError::SelfLoop(_) => Error::InvalidOperation,
        GraphError::OutOfRange(_) | GraphError::InvalidFormat(_) => Error::InvalidArgument,
    })
}
