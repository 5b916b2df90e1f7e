use std::error;
use std::fmt;

use serde::ser::{Serialize, Serializer};

use crate::syntax::graph::DependencyGraph;
use crate::syntax::Index;

pub use self::linearize::*;
pub use self::materialize::*;
pub use self::order::*;
pub use self::pointer::*;
pub use self::state::*;

mod linearize;
mod materialize;
mod order;
mod pointer;
pub mod prelude;
mod state;

/// Number of most recent heads of the current word exposed to the scorer.
pub const WINDOW_SIZE: usize = 3;

/// A head assignment `(dependent, head)`, or the closing sentinel when `head == dependent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub dependent: Index,
    pub head: Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Attach(Index),
    Close,
}

impl Transition {
    pub fn attach(dependent: Index, head: Index) -> Self {
        Transition { dependent, head }
    }

    pub fn close(dependent: Index) -> Self {
        Transition {
            dependent,
            head: dependent,
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.head == self.dependent
    }

    pub fn kind(&self) -> TransitionKind {
        if self.is_sentinel() {
            TransitionKind::Close
        } else {
            TransitionKind::Attach(self.head)
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            TransitionKind::Attach(head) => write!(f, "Attach({}, {})", self.dependent, head),
            TransitionKind::Close => write!(f, "Close({})", self.dependent),
        }
    }
}

/// The last `WINDOW_SIZE` heads assigned to the word being processed, oldest first.
///
/// It is cleared whenever a word is closed and carries no graph semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AncestorWindow {
    slots: [Index; WINDOW_SIZE],
    len: usize,
}

impl AncestorWindow {
    pub fn new() -> Self {
        AncestorWindow::default()
    }

    pub fn push(&mut self, head: Index) {
        if self.len == WINDOW_SIZE {
            self.slots.rotate_left(1);
            self.slots[WINDOW_SIZE - 1] = head;
        } else {
            self.slots[self.len] = head;
            self.len += 1;
        }
    }

    pub fn clear(&mut self) {
        self.slots = [0; WINDOW_SIZE];
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recently pushed head.
    pub fn last(&self) -> Option<Index> {
        self.get(0)
    }

    /// `position` counts back from the newest entry.
    pub fn get(&self, position: usize) -> Option<Index> {
        if position < self.len {
            Some(self.slots[self.len - 1 - position])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Index> + '_ {
        self.slots[..self.len].iter().cloned()
    }

    /// Newest first, padded with the root index; the scorer masks out zeros.
    pub fn padded(&self) -> [Index; WINDOW_SIZE] {
        let mut padded = [0; WINDOW_SIZE];
        for (i, slot) in padded.iter_mut().enumerate() {
            *slot = self.get(i).unwrap_or(0);
        }
        padded
    }
}

impl Serialize for AncestorWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Auxiliary features attached to one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Context {
    /// heads pushed for the same word before this transition
    pub window: AncestorWindow,
    /// Previous dependent attached to the same head.
    ///
    /// A closing sentinel is not an arc: it carries `None` and leaves every head's last-child
    /// record untouched, so sentinels never show up as siblings of later arcs.
    pub sibling: Option<Index>,
}

/// What the scorer receives before choosing the next transition of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepInput {
    pub dependent: Index,
    pub window: AncestorWindow,
    /// sibling pointer recorded on the latest transition of the state
    pub sibling: Option<Index>,
}

pub trait TransitionState {
    fn step(&self) -> usize {
        self.transitions().len()
    }

    fn num_words(&self) -> usize;

    /// The word currently receiving heads; `None` once every word is closed.
    fn position(&self) -> Option<Index>;

    fn is_done(&self) -> bool {
        self.position().is_none()
    }

    /// Heads accepted so far for the current word.
    fn num_heads(&self) -> usize;

    fn window(&self) -> &AncestorWindow;

    /// `(head, dependent)` pairs accepted so far.
    fn arcs(&self) -> &[(Index, Index)];

    fn has_arc(&self, head: Index, dependent: Index) -> bool {
        self.arcs().contains(&(head, dependent))
    }

    fn last_child(&self, head: Index) -> Option<Index>;

    fn transitions(&self) -> &[Transition];

    fn contexts(&self) -> &[Context];

    fn step_input(&self) -> Option<StepInput> {
        self.position().map(|dependent| StepInput {
            dependent,
            window: *self.window(),
            sibling: self.contexts().last().and_then(|c| c.sibling),
        })
    }
}

pub trait TransitionMutableState: TransitionState {
    /// Closes the current word and moves to the next one.
    fn advance(&mut self) -> Result<(), Error>;

    fn add_arc(&mut self, dependent: Index, head: Index) -> Result<(), Error>;

    fn record(&mut self, transition: Transition, context: Context) -> Result<(), Error>;
}

pub trait TransitionSystem {
    fn estimate_num_transitions(num_words: usize, num_arcs: usize) -> usize;

    fn apply<S: TransitionMutableState>(transition: Transition, state: &mut S)
        -> Result<(), Error>;

    /// `order` enables the positional constraint of ordered decoding.
    fn is_allowed<S: TransitionState>(
        transition: Transition,
        state: &S,
        order: Option<PriorOrder>,
    ) -> bool;

    fn is_terminal<S: TransitionState>(state: &S) -> bool;

    fn get_oracle<S: TransitionState, L>(
        state: &S,
        gold: &DependencyGraph<L>,
    ) -> Option<Transition>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidOperation,
    InvalidArgument,
    DuplicateArc,
    Cycle,
    OutOfOrder,
    Incomplete,
    CapacityExceeded,
}

impl Error {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Error::InvalidOperation => "invalid operation",
            Error::InvalidArgument => "invalid argument",
            Error::DuplicateArc => "duplicate arc",
            Error::Cycle => "arc creates a cycle",
            Error::OutOfOrder => "transition out of order",
            Error::Incomplete => "transition sequence is incomplete",
            Error::CapacityExceeded => "number of heads exceeds the capacity",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl error::Error for Error {}
