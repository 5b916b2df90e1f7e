use crate::syntax::transition::{AncestorWindow, StepInput};
use crate::syntax::{Index, Label, Score};

/// The model side of decoding.
///
/// `Hidden` is the recurrent state a hypothesis carries from one step to the next; the decoder
/// clones it into every hypothesis that survives pruning and hands it back on the next step.
pub trait Scorer {
    type Hidden: Clone;
    type Output;

    fn num_words(&self) -> usize;

    fn init(&self) -> Self::Hidden;

    fn step(&self, input: &StepInput, hidden: &Self::Hidden) -> (Self::Output, Self::Hidden);

    /// Results are matched positionally to `inputs` and `hidden`.
    fn step_batch(
        &self,
        inputs: &[StepInput],
        hidden: &[&Self::Hidden],
    ) -> Vec<(Self::Output, Self::Hidden)> {
        inputs
            .iter()
            .zip(hidden)
            .map(|(input, h)| self.step(input, h))
            .collect()
    }

    /// Log-scores over tokens `0..=n`; the entry of the current word scores closing it.
    fn arc_scores(&self, output: &Self::Output, window: &AncestorWindow) -> Vec<Score>;

    fn label_score(&self, output: &Self::Output, dependent: Index, head: Index) -> (Label, Score);
}

/// A scorer over precomputed log-scores, one sentence per instance.
///
/// `arcs[d][h]` scores `h` as the next head of word `d`; row `0` is unused.
/// `labels[d][h][l]` scores label `l` on the arc `h -> d`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableScorer {
    pub arcs: Vec<Vec<Score>>,
    #[serde(default)]
    pub labels: Vec<Vec<Vec<Score>>>,
    #[serde(default)]
    pub label_names: Option<Vec<String>>,
}

impl TableScorer {
    pub fn new(arcs: Vec<Vec<Score>>) -> Self {
        TableScorer {
            arcs,
            labels: vec![],
            label_names: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<Vec<Vec<Score>>>) -> Self {
        self.labels = labels;
        self
    }

    pub fn label_name(&self, label: Label) -> Option<&str> {
        self.label_names
            .as_ref()
            .and_then(|names| names.get(label as usize))
            .map(|s| s.as_str())
    }
}

impl Scorer for TableScorer {
    type Hidden = ();
    type Output = Index;

    fn num_words(&self) -> usize {
        self.arcs.len().saturating_sub(1)
    }

    fn init(&self) {}

    fn step(&self, input: &StepInput, _hidden: &()) -> (Index, ()) {
        (input.dependent, ())
    }

    fn arc_scores(&self, output: &Index, _window: &AncestorWindow) -> Vec<Score> {
        self.arcs.get(*output as usize).cloned().unwrap_or_default()
    }

    fn label_score(&self, output: &Index, _dependent: Index, head: Index) -> (Label, Score) {
        let scores = match self
            .labels
            .get(*output as usize)
            .and_then(|row| row.get(head as usize))
        {
            Some(scores) => scores,
            None => return (0, 0.0),
        };
        let mut best: Option<(Label, Score)> = None;
        for (label, &score) in scores.iter().enumerate() {
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((label as Label, score)),
            }
        }
        best.unwrap_or((0, 0.0))
    }
}
