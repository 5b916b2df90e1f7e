use super::{
    Context, Error, PriorOrder, Transition, TransitionKind, TransitionMutableState,
    TransitionState, TransitionSystem,
};
use crate::syntax::graph::{would_create_cycle, DependencyGraph};
use crate::syntax::Index;

/// Left-to-right multi-head pointer system.
///
/// Words are visited in increasing order. Each step either points the current word at one more
/// head or closes it with the sentinel `(i, i)`.
#[derive(Debug)]
pub struct MultiHeadPointer;

impl MultiHeadPointer {
    /// Attach: (i, A, W) => (i, A + (h -> i), W | h)
    pub fn apply_attach<S: TransitionMutableState>(
        state: &mut S,
        dependent: Index,
        head: Index,
    ) -> Result<(), Error> {
        let context = Context {
            window: *state.window(),
            sibling: state.last_child(head),
        };
        state.add_arc(dependent, head)?;
        state.record(Transition::attach(dependent, head), context)
    }

    /// Close: (i, A, W) => (i + 1, A, [])
    pub fn apply_close<S: TransitionMutableState>(
        state: &mut S,
        dependent: Index,
    ) -> Result<(), Error> {
        if state.position() != Some(dependent) {
            return Err(Error::OutOfOrder);
        }
        let context = Context {
            window: *state.window(),
            sibling: None,
        };
        state.advance()?;
        state.record(Transition::close(dependent), context)
    }

    pub fn is_allowed_attach<S: TransitionState>(
        state: &S,
        dependent: Index,
        head: Index,
        order: Option<PriorOrder>,
    ) -> bool {
        if state.position() != Some(dependent)
            || head as usize > state.num_words()
            || head == dependent
            || state.has_arc(head, dependent)
        {
            return false;
        }
        if let Some(order) = order {
            if !order.is_valid(dependent, state.window().last(), head) {
                return false;
            }
        }
        !would_create_cycle(state.arcs(), (head, dependent))
    }

    pub fn is_allowed_close<S: TransitionState>(state: &S, dependent: Index) -> bool {
        state.position() == Some(dependent)
    }
}

impl TransitionSystem for MultiHeadPointer {
    fn estimate_num_transitions(num_words: usize, num_arcs: usize) -> usize {
        num_arcs + num_words
    }

    fn apply<S: TransitionMutableState>(
        transition: Transition,
        state: &mut S,
    ) -> Result<(), Error> {
        match transition.kind() {
            TransitionKind::Attach(head) => {
                MultiHeadPointer::apply_attach(state, transition.dependent, head)
            }
            TransitionKind::Close => MultiHeadPointer::apply_close(state, transition.dependent),
        }
    }

    fn is_allowed<S: TransitionState>(
        transition: Transition,
        state: &S,
        order: Option<PriorOrder>,
    ) -> bool {
        match transition.kind() {
            TransitionKind::Attach(head) => {
                MultiHeadPointer::is_allowed_attach(state, transition.dependent, head, order)
            }
            TransitionKind::Close => MultiHeadPointer::is_allowed_close(state, transition.dependent),
        }
    }

    fn is_terminal<S: TransitionState>(state: &S) -> bool {
        state.is_done()
    }

    fn get_oracle<S: TransitionState, L>(
        state: &S,
        gold: &DependencyGraph<L>,
    ) -> Option<Transition> {
        let dependent = state.position()?;
        match gold.heads(dependent).get(state.num_heads()) {
            Some(&(head, _)) => Some(Transition::attach(dependent, head)),
            None => Some(Transition::close(dependent)),
        }
    }
}
