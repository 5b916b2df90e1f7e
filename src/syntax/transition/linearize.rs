use std::u32::MAX as U32_MAX;

use super::{
    Context, Error, MultiHeadPointer, State, StepInput, Transition, TransitionState,
    TransitionSystem,
};
use crate::syntax::graph::DependencyGraph;
use crate::syntax::DEFAULT_CAPACITY;

/// The gold transition sequence of a graph together with the features seen at every step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Linearization<L> {
    pub transitions: Vec<Transition>,
    /// `None` exactly at the closing sentinels.
    pub labels: Vec<Option<L>>,
    pub contexts: Vec<Context>,
}

impl<L> Linearization<L> {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The inputs a scorer receives when replaying this sequence step by step.
    pub fn inputs(&self) -> Vec<StepInput> {
        self.transitions
            .iter()
            .zip(&self.contexts)
            .enumerate()
            .map(|(t, (transition, context))| StepInput {
                dependent: transition.dependent,
                window: context.window,
                sibling: if t > 0 {
                    self.contexts[t - 1].sibling
                } else {
                    None
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Linearizer {
    capacity: usize,
}

impl Linearizer {
    pub fn new(capacity: usize) -> Self {
        Linearizer { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Emits every word's heads in stored order, each word followed by its sentinel.
    pub fn linearize<L: Clone>(&self, graph: &DependencyGraph<L>) -> Result<Linearization<L>, Error> {
        let n = graph.len();
        if n > (U32_MAX as usize) - 1 {
            return Err(Error::InvalidArgument);
        }
        if graph.max_fan_in() > self.capacity {
            return Err(Error::CapacityExceeded);
        }
        let capacity = MultiHeadPointer::estimate_num_transitions(n, graph.num_arcs());
        let mut state = State::with_capacity(n as u32, capacity);
        let mut labels = Vec::with_capacity(capacity);
        while !MultiHeadPointer::is_terminal(&state) {
            let transition =
                MultiHeadPointer::get_oracle(&state, graph).ok_or(Error::InvalidOperation)?;
            let label = if transition.is_sentinel() {
                None
            } else {
                Some(graph.heads(transition.dependent)[state.num_heads()].1.clone())
            };
            MultiHeadPointer::apply(transition, &mut state)?;
            labels.push(label);
        }
        Ok(Linearization {
            transitions: state.transitions().to_vec(),
            labels,
            contexts: state.contexts().to_vec(),
        })
    }
}

impl Default for Linearizer {
    fn default() -> Self {
        Linearizer::new(DEFAULT_CAPACITY)
    }
}
