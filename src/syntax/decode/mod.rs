use std::cmp::Ordering;
use std::error;
use std::f32::NEG_INFINITY as F32_NEG_INFINITY;
use std::fmt;
use std::u32::MAX as U32_MAX;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use slog::{Discard, Logger};

use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::{
    self, materialize, Context, MultiHeadPointer, PriorOrder, State, StepInput, Transition,
    TransitionState, TransitionSystem,
};
use crate::syntax::{max_heads, Index, Label, Score, DEFAULT_CAPACITY};

pub use self::scorer::*;

mod scorer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub beam: usize,
    pub capacity: usize,
    /// apply `order` to the heads of every word
    pub ordered: bool,
    pub order: PriorOrder,
    /// retry without the order constraint when the ordered search exhausts the beam
    pub relax_on_exhaustion: bool,
    pub max_length: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            beam: 1,
            capacity: DEFAULT_CAPACITY,
            ordered: false,
            order: PriorOrder::DeepFirst,
            relax_on_exhaustion: true,
            max_length: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.beam == 0 {
            Err(Error::InvalidConfig("beam width must be positive"))
        } else if self.capacity == 0 {
            Err(Error::InvalidConfig("capacity must be positive"))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
pub enum Error {
    BeamExhausted,
    CapacityExceeded { length: usize, limit: usize },
    InvalidConfig(&'static str),
    InvalidScores { expected: usize, actual: usize },
    StepLimit,
    Transition(transition::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BeamExhausted => write!(f, "every candidate was rejected or unscored"),
            Error::CapacityExceeded { length, limit } => write!(
                f,
                "sentence of {} words exceeds the limit of {}",
                length, limit
            ),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::InvalidScores { expected, actual } => write!(
                f,
                "scorer returned {} scores where {} were expected",
                actual, expected
            ),
            Error::StepLimit => write!(f, "decoding did not terminate within the step limit"),
            Error::Transition(ref e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Transition(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<transition::Error> for Error {
    fn from(e: transition::Error) -> Self {
        Error::Transition(e)
    }
}

/// The winning hypothesis of a sentence.
#[derive(Debug, Clone, Serialize)]
pub struct Derivation {
    pub graph: DependencyGraph<Label>,
    pub transitions: Vec<Transition>,
    pub labels: Vec<Option<Label>>,
    pub contexts: Vec<Context>,
    pub score: Score,
    pub steps: usize,
    /// found only after dropping the order constraint
    pub relaxed: bool,
}

#[derive(Debug, Clone)]
struct Hypothesis<H> {
    state: State,
    score: Score,
    labels: Vec<Option<Label>>,
    hidden: H,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    parent: usize,
    /// `(output, head)`; `None` passes a finished hypothesis through
    expansion: Option<(usize, Index)>,
    score: Score,
}

pub struct BeamDecoder<'a, S: Scorer> {
    scorer: &'a S,
    config: Config,
    logger: Logger,
}

impl<'a, S: Scorer> BeamDecoder<'a, S> {
    pub fn new(scorer: &'a S, config: Config) -> Self {
        BeamDecoder {
            scorer,
            config,
            logger: Logger::root(Discard, o!()),
        }
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn decode(&self) -> Result<Derivation, Error> {
        self.config.validate()?;
        let n = self.scorer.num_words();
        let limit = self
            .config
            .max_length
            .unwrap_or(U32_MAX as usize - 1)
            .min(U32_MAX as usize - 1);
        if n > limit {
            return Err(Error::CapacityExceeded { length: n, limit });
        }
        debug!(self.logger, "decode start";
               "length" => n, "beam" => self.config.beam, "ordered" => self.config.ordered);

        let order = if self.config.ordered {
            Some(self.config.order)
        } else {
            None
        };
        match self.search(n, order) {
            Err(Error::BeamExhausted) if order.is_some() && self.config.relax_on_exhaustion => {
                warn!(self.logger, "beam exhausted under the order constraint, retrying without it";
                      "order" => %self.config.order, "length" => n);
                let mut derivation = self.search(n, None)?;
                derivation.relaxed = true;
                Ok(derivation)
            }
            result => result,
        }
    }

    fn search(&self, n: usize, order: Option<PriorOrder>) -> Result<Derivation, Error> {
        let max_heads = max_heads(self.config.capacity, n);
        let step_limit = n * max_heads;
        let mut beam = vec![Hypothesis {
            state: State::new(n as u32),
            score: 0.0,
            labels: Vec::with_capacity(step_limit),
            hidden: self.scorer.init(),
        }];
        let mut steps = 0;

        while beam.iter().any(|hyp| !hyp.state.is_done()) {
            if steps >= step_limit {
                return Err(Error::StepLimit);
            }
            steps += 1;

            let (slots, inputs): (Vec<usize>, Vec<StepInput>) = beam
                .iter()
                .enumerate()
                .filter_map(|(i, hyp)| hyp.state.step_input().map(|input| (i, input)))
                .unzip();
            let hidden: Vec<&S::Hidden> = slots.iter().map(|&i| &beam[i].hidden).collect();
            let outputs = self.scorer.step_batch(&inputs, &hidden);
            if outputs.len() != inputs.len() {
                return Err(Error::InvalidScores {
                    expected: inputs.len(),
                    actual: outputs.len(),
                });
            }

            let mut expansion_of = vec![None; beam.len()];
            for (j, &slot) in slots.iter().enumerate() {
                expansion_of[slot] = Some(j);
            }
            let mut candidates = Vec::with_capacity(beam.len() * (n + 1));
            for (i, hyp) in beam.iter().enumerate() {
                let j = match expansion_of[i] {
                    Some(j) => j,
                    None => {
                        candidates.push(Candidate {
                            parent: i,
                            expansion: None,
                            score: hyp.score,
                        });
                        continue;
                    }
                };
                let scores = self.scorer.arc_scores(&outputs[j].0, hyp.state.window());
                if scores.len() != n + 1 {
                    return Err(Error::InvalidScores {
                        expected: n + 1,
                        actual: scores.len(),
                    });
                }
                for (head, score) in scores.into_iter().enumerate() {
                    // NaN is dropped; `-inf` stays a zero-probability candidate
                    if !score.is_nan() {
                        candidates.push(Candidate {
                            parent: i,
                            expansion: Some((j, head as Index)),
                            score: hyp.score + score,
                        });
                    }
                }
            }
            candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

            let mut next = Vec::with_capacity(self.config.beam);
            for candidate in candidates {
                let parent = &beam[candidate.parent];
                let (j, head) = match candidate.expansion {
                    Some(expansion) => expansion,
                    None => {
                        next.push(parent.clone());
                        if next.len() == self.config.beam {
                            break;
                        }
                        continue;
                    }
                };
                let dependent = parent
                    .state
                    .position()
                    .ok_or(transition::Error::InvalidOperation)?;
                let transition = if head == dependent || parent.state.num_heads() + 1 >= max_heads
                {
                    Transition::close(dependent)
                } else {
                    let transition = Transition::attach(dependent, head);
                    if !MultiHeadPointer::is_allowed(transition, &parent.state, order) {
                        continue;
                    }
                    transition
                };

                let (ref output, ref hidden) = outputs[j];
                let mut hyp = Hypothesis {
                    state: parent.state.clone(),
                    score: candidate.score,
                    labels: parent.labels.clone(),
                    hidden: hidden.clone(),
                };
                MultiHeadPointer::apply(transition, &mut hyp.state)?;
                if transition.is_sentinel() {
                    hyp.labels.push(None);
                } else {
                    let (label, score) = self.scorer.label_score(output, dependent, head);
                    hyp.score += if score.is_nan() { F32_NEG_INFINITY } else { score };
                    hyp.labels.push(Some(label));
                }
                next.push(hyp);
                if next.len() == self.config.beam {
                    break;
                }
            }

            if next.is_empty() {
                trace!(self.logger, "beam exhausted"; "step" => steps);
                return Err(Error::BeamExhausted);
            }
            beam = next;
        }

        let mut best: Option<Hypothesis<S::Hidden>> = None;
        for hyp in beam {
            match best {
                Some(ref b) if b.score >= hyp.score => {}
                _ => best = Some(hyp),
            }
        }
        let best = best.ok_or(Error::BeamExhausted)?;
        let graph = materialize(best.state.transitions(), &best.labels, n)?;
        Ok(Derivation {
            graph,
            transitions: best.state.transitions().to_vec(),
            labels: best.labels,
            contexts: best.state.contexts().to_vec(),
            score: best.score,
            steps,
            relaxed: false,
        })
    }
}

/// Decodes independent sentences, in parallel when the `parallel` feature is enabled.
///
/// A failed sentence is logged and reported in its own slot; the rest of the batch proceeds.
pub fn decode_batch<S: Scorer + Sync>(
    scorers: &[S],
    config: Config,
    logger: &Logger,
) -> Vec<Result<Derivation, Error>> {
    let run = |(index, scorer): (usize, &S)| {
        let result = BeamDecoder::new(scorer, config)
            .logger(logger.new(o!("sentence" => index)))
            .decode();
        if let Err(ref e) = result {
            warn!(logger, "failed to decode a sentence"; "sentence" => index, "error" => %e);
        }
        result
    };
    #[cfg(feature = "parallel")]
    {
        scorers.par_iter().enumerate().map(run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        scorers.iter().enumerate().map(run).collect()
    }
}
