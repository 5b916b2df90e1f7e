#![allow(dead_code)]

use std::cell::RefCell;
use std::f32::NAN as F32_NAN;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use semgraph::syntax::decode::Scorer;
use semgraph::syntax::graph::{has_cycle, would_create_cycle, DependencyGraph};
use semgraph::syntax::transition::{AncestorWindow, Linearization, StepInput, Transition};
use semgraph::syntax::{Index, Label, Score};

pub mod mock {
    use semgraph::syntax::graph::DependencyGraph;

    /// Enhanced fields of a few hand-written sentences.
    pub fn provide_sentences() -> Vec<&'static str> {
        vec![
            "0:root",
            "2:nsubj\t0:root\t2:obj",
            "2:nsubj|4:nsubj\t0:root\t4:cc\t2:conj",
            "3:det\t3:amod\t0:root|4:obl:tmod\t_\t3:nmod:poss|1:dep",
        ]
    }

    pub fn provide_graphs() -> Vec<DependencyGraph> {
        provide_sentences()
            .into_iter()
            .map(|line| line.parse().expect("mock sentences are well formed"))
            .collect()
    }
}

/// A random acyclic graph: words are ranked in random order and heads are drawn from the root
/// and the words ranked before the dependent.
pub fn random_graph(seed: u64, num_words: usize, max_heads: usize) -> DependencyGraph<Label> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rank: Vec<Index> = (1..=num_words as Index).collect();
    rank.shuffle(&mut rng);
    let mut heads = vec![vec![]; num_words];
    for (r, &dependent) in rank.iter().enumerate() {
        let mut candidates: Vec<Index> =
            Some(0).into_iter().chain(rank[..r].iter().cloned()).collect();
        candidates.shuffle(&mut rng);
        let k = rng.gen_range(0..=max_heads.min(candidates.len()));
        heads[dependent as usize - 1] = candidates[..k]
            .iter()
            .map(|&head| (head, rng.gen_range(0..8)))
            .collect();
    }
    DependencyGraph::from_heads(heads).expect("heads follow a topological order")
}

/// Replays a gold linearization: the gold head scores `0`, every other token `-1`.
pub struct GoldScorer {
    num_words: usize,
    transitions: Vec<Transition>,
    labels: Vec<Option<Label>>,
    pub inputs: RefCell<Vec<StepInput>>,
}

impl GoldScorer {
    pub fn new(num_words: usize, linearization: &Linearization<Label>) -> Self {
        GoldScorer {
            num_words,
            transitions: linearization.transitions.clone(),
            labels: linearization.labels.clone(),
            inputs: RefCell::new(vec![]),
        }
    }
}

impl Scorer for GoldScorer {
    type Hidden = usize;
    type Output = usize;

    fn num_words(&self) -> usize {
        self.num_words
    }

    fn init(&self) -> usize {
        0
    }

    fn step(&self, input: &StepInput, step: &usize) -> (usize, usize) {
        self.inputs.borrow_mut().push(*input);
        (*step, step + 1)
    }

    /// Hypotheses that left the gold path may outlive it; they get flat scores.
    fn arc_scores(&self, step: &usize, _window: &AncestorWindow) -> Vec<Score> {
        let mut scores = vec![-1.0; self.num_words + 1];
        if let Some(transition) = self.transitions.get(*step) {
            scores[transition.head as usize] = 0.0;
        }
        scores
    }

    fn label_score(&self, step: &usize, _dependent: Index, _head: Index) -> (Label, Score) {
        (self.labels.get(*step).and_then(|l| *l).unwrap_or(0), 0.0)
    }
}

/// Rebuilds the arcs of its hypothesis from the inputs it receives and always prefers heads
/// that would close a cycle.
pub struct CycleSeekingScorer {
    pub num_words: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    arcs: Vec<(Index, Index)>,
    previous: Option<StepInput>,
}

impl Scorer for CycleSeekingScorer {
    type Hidden = Trace;
    type Output = (Index, Vec<(Index, Index)>);

    fn num_words(&self) -> usize {
        self.num_words
    }

    fn init(&self) -> Trace {
        Trace::default()
    }

    fn step(&self, input: &StepInput, trace: &Trace) -> (Self::Output, Trace) {
        let mut arcs = trace.arcs.clone();
        if let Some(previous) = trace.previous {
            if previous.dependent == input.dependent {
                let head = input.window.last().expect("an attach pushes its head");
                arcs.push((head, input.dependent));
            }
        }
        assert!(!has_cycle(&arcs), "hypothesis holds a cycle: {:?}", arcs);
        let next = Trace {
            arcs: arcs.clone(),
            previous: Some(*input),
        };
        ((input.dependent, arcs), next)
    }

    fn arc_scores(&self, output: &Self::Output, _window: &AncestorWindow) -> Vec<Score> {
        let (dependent, ref arcs) = *output;
        (0..=self.num_words as Index)
            .map(|head| {
                if head == dependent {
                    -5.0
                } else if would_create_cycle(arcs, (head, dependent)) {
                    0.0
                } else {
                    -1.0 - 0.01 * head as Score
                }
            })
            .collect()
    }

    fn label_score(&self, _output: &Self::Output, _dependent: Index, _head: Index) -> (Label, Score) {
        (0, 0.0)
    }
}

/// Scores closing the current word lowest and every other token alike.
pub struct ReluctantScorer {
    pub num_words: usize,
}

impl Scorer for ReluctantScorer {
    type Hidden = ();
    type Output = Index;

    fn num_words(&self) -> usize {
        self.num_words
    }

    fn init(&self) {}

    fn step(&self, input: &StepInput, _hidden: &()) -> (Index, ()) {
        (input.dependent, ())
    }

    fn arc_scores(&self, dependent: &Index, _window: &AncestorWindow) -> Vec<Score> {
        (0..=self.num_words as Index)
            .map(|head| if head == *dependent { -10.0 } else { 0.0 })
            .collect()
    }

    fn label_score(&self, _dependent: &Index, _d: Index, head: Index) -> (Label, Score) {
        (head, -0.1)
    }
}

/// Leaves every candidate unscored.
pub struct HopelessScorer {
    pub num_words: usize,
}

impl Scorer for HopelessScorer {
    type Hidden = ();
    type Output = ();

    fn num_words(&self) -> usize {
        self.num_words
    }

    fn init(&self) {}

    fn step(&self, _input: &StepInput, _hidden: &()) -> ((), ()) {
        ((), ())
    }

    fn arc_scores(&self, _output: &(), _window: &AncestorWindow) -> Vec<Score> {
        vec![F32_NAN; self.num_words + 1]
    }

    fn label_score(&self, _output: &(), _dependent: Index, _head: Index) -> (Label, Score) {
        (0, 0.0)
    }
}

/// Panics when consulted.
pub struct UntouchableScorer {
    pub num_words: usize,
}

impl Scorer for UntouchableScorer {
    type Hidden = ();
    type Output = ();

    fn num_words(&self) -> usize {
        self.num_words
    }

    fn init(&self) {}

    fn step(&self, _input: &StepInput, _hidden: &()) -> ((), ()) {
        panic!("the scorer must not be called")
    }

    fn arc_scores(&self, _output: &(), _window: &AncestorWindow) -> Vec<Score> {
        panic!("the scorer must not be called")
    }

    fn label_score(&self, _output: &(), _dependent: Index, _head: Index) -> (Label, Score) {
        panic!("the scorer must not be called")
    }
}
