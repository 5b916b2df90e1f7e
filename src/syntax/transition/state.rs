use super::{
    AncestorWindow, Context, Error, Transition, TransitionMutableState, TransitionState,
};
use crate::syntax::{Index, ROOT};

#[inline]
fn default_capacity(num_words: usize) -> usize {
    2 * num_words
}

/// Bookkeeping shared by the linearizer and every beam hypothesis.
///
/// A state owns all of its per-head records; cloning it yields an independent hypothesis.
#[derive(Debug, Clone)]
pub struct State {
    num_words: Index,
    position: Option<Index>,
    num_heads: usize,
    arcs: Vec<(Index, Index)>,
    window: AncestorWindow,
    last_child: Vec<Option<Index>>,
    transitions: Vec<Transition>,
    contexts: Vec<Context>,
}

impl State {
    pub fn new(num_words: u32) -> Self {
        State::with_capacity(num_words, default_capacity(num_words as usize))
    }

    pub fn with_capacity(num_words: u32, capacity: usize) -> Self {
        let n = num_words as usize;
        State {
            num_words,
            position: if num_words > 0 { Some(1) } else { None },
            num_heads: 0,
            arcs: Vec::with_capacity(capacity),
            window: AncestorWindow::new(),
            last_child: vec![None; n + 1],
            transitions: Vec::with_capacity(capacity),
            contexts: Vec::with_capacity(capacity),
        }
    }
}

impl TransitionState for State {
    fn step(&self) -> usize {
        self.transitions.len()
    }

    fn num_words(&self) -> usize {
        self.num_words as usize
    }

    fn position(&self) -> Option<Index> {
        self.position
    }

    fn num_heads(&self) -> usize {
        self.num_heads
    }

    fn window(&self) -> &AncestorWindow {
        &self.window
    }

    fn arcs(&self) -> &[(Index, Index)] {
        &self.arcs
    }

    fn last_child(&self, head: Index) -> Option<Index> {
        self.last_child.get(head as usize).cloned().unwrap_or(None)
    }

    fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    fn contexts(&self) -> &[Context] {
        &self.contexts
    }
}

impl TransitionMutableState for State {
    fn advance(&mut self) -> Result<(), Error> {
        match self.position {
            Some(position) => {
                if position == self.num_words {
                    self.position = None;
                } else {
                    self.position = Some(position + 1);
                }
                self.num_heads = 0;
                self.window.clear();
                Ok(())
            }
            None => Err(Error::InvalidOperation),
        }
    }

    fn add_arc(&mut self, dependent: Index, head: Index) -> Result<(), Error> {
        if self.position != Some(dependent) {
            Err(Error::OutOfOrder)
        } else if head > self.num_words || dependent == ROOT {
            Err(Error::InvalidArgument)
        } else if head == dependent {
            Err(Error::InvalidOperation)
        } else if self.has_arc(head, dependent) {
            Err(Error::DuplicateArc)
        } else {
            self.arcs.push((head, dependent));
            self.last_child[head as usize] = Some(dependent);
            self.window.push(head);
            self.num_heads += 1;
            Ok(())
        }
    }

    fn record(&mut self, transition: Transition, context: Context) -> Result<(), Error> {
        self.transitions.push(transition);
        self.contexts.push(context);
        Ok(())
    }
}
