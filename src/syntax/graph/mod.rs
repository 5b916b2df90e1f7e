use std::collections::BTreeSet;
use std::error;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};

use crate::io as mod_io;
use crate::syntax::transition::PriorOrder;
use crate::syntax::{Index, ROOT};

pub use self::cycle::*;

mod cycle;

static DEPS_FIELD_DELIMITER: &str = "\t";
static DEPS_ARC_DELIMITER: &str = "|";
static DEPS_HEAD_DELIMITER: &str = ":";
static DEPS_EMPTY_FIELD: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidFormat(String),
    OutOfRange(Index),
    SelfLoop(Index),
    DuplicateArc(Index, Index),
    Cycle,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidFormat(ref s) => write!(f, "invalid format: `{}`", s),
            Error::OutOfRange(index) => write!(f, "index out of range: {}", index),
            Error::SelfLoop(index) => write!(f, "self loop on {}", index),
            Error::DuplicateArc(head, dependent) => {
                write!(f, "duplicate arc: {} -> {}", head, dependent)
            }
            Error::Cycle => write!(f, "graph contains a cycle"),
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc<L> {
    pub dependent: Index,
    pub head: Index,
    pub label: L,
}

/// A multi-head dependency graph over the words `1..=n` of a sentence.
///
/// Every word keeps its heads in the order they were given; the order is what the linearizer
/// follows. Slot `0` is the root and never has heads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph<L = String> {
    heads: Vec<Vec<(Index, L)>>,
}

/// Goes through `from_heads`, so a deserialized graph is validated like any other.
impl<'de, L: Deserialize<'de>> Deserialize<'de> for DependencyGraph<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<L> {
            heads: Vec<Vec<(Index, L)>>,
        }

        let mut heads = Raw::deserialize(deserializer)?.heads.into_iter();
        let result = match heads.next() {
            Some(ref root) if root.is_empty() => DependencyGraph::from_heads(heads.collect()),
            Some(_) => Err(Error::OutOfRange(ROOT)),
            None => Err(Error::InvalidFormat("missing root slot".to_string())),
        };
        result.map_err(de::Error::custom)
    }
}

impl<L> DependencyGraph<L> {
    pub fn new(num_words: usize) -> Self {
        let mut heads = Vec::with_capacity(num_words + 1);
        heads.resize_with(num_words + 1, Vec::new);
        DependencyGraph { heads }
    }

    /// Builds a graph from per-word head lists; `heads[0]` is the list of word `1`.
    pub fn from_heads(heads: Vec<Vec<(Index, L)>>) -> Result<Self, Error> {
        let mut graph = DependencyGraph::new(heads.len());
        for (i, word_heads) in heads.into_iter().enumerate() {
            let dependent = (i + 1) as Index;
            for (head, label) in word_heads {
                graph.push_arc(dependent, head, label)?;
            }
        }
        if has_cycle(&graph.edges()) {
            return Err(Error::Cycle);
        }
        Ok(graph)
    }

    fn check_arc(&self, dependent: Index, head: Index) -> Result<(), Error> {
        let n = self.len() as Index;
        if dependent == ROOT || dependent > n {
            Err(Error::OutOfRange(dependent))
        } else if head > n {
            Err(Error::OutOfRange(head))
        } else if head == dependent {
            Err(Error::SelfLoop(dependent))
        } else if self.heads[dependent as usize].iter().any(|&(h, _)| h == head) {
            Err(Error::DuplicateArc(head, dependent))
        } else {
            Ok(())
        }
    }

    fn push_arc(&mut self, dependent: Index, head: Index, label: L) -> Result<(), Error> {
        self.check_arc(dependent, head)?;
        self.heads[dependent as usize].push((head, label));
        Ok(())
    }

    /// Adds an arc, refusing it when the graph would stop being acyclic.
    pub fn add_arc(&mut self, dependent: Index, head: Index, label: L) -> Result<(), Error> {
        self.check_arc(dependent, head)?;
        if would_create_cycle(&self.edges(), (head, dependent)) {
            return Err(Error::Cycle);
        }
        self.heads[dependent as usize].push((head, label));
        Ok(())
    }

    /// Number of words, the root excluded.
    pub fn len(&self) -> usize {
        self.heads.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn heads(&self, dependent: Index) -> &[(Index, L)] {
        self.heads
            .get(dependent as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_heads(&self, dependent: Index) -> usize {
        self.heads(dependent).len()
    }

    pub fn num_arcs(&self) -> usize {
        self.heads.iter().map(|v| v.len()).sum()
    }

    pub fn max_fan_in(&self) -> usize {
        self.heads.iter().map(|v| v.len()).max().unwrap_or(0)
    }

    /// `(head, dependent)` pairs in word order.
    pub fn edges(&self) -> Vec<(Index, Index)> {
        self.heads
            .iter()
            .enumerate()
            .flat_map(|(d, list)| list.iter().map(move |&(h, _)| (h, d as Index)))
            .collect()
    }

    pub fn arcs(&self) -> impl Iterator<Item = Arc<&L>> + '_ {
        self.heads.iter().enumerate().flat_map(|(d, list)| {
            list.iter().map(move |(h, label)| Arc {
                dependent: d as Index,
                head: *h,
                label,
            })
        })
    }

    pub fn is_acyclic(&self) -> bool {
        !has_cycle(&self.edges())
    }

    pub fn map_labels<M, F: FnMut(&L) -> M>(&self, mut f: F) -> DependencyGraph<M> {
        DependencyGraph {
            heads: self
                .heads
                .iter()
                .map(|list| list.iter().map(|(h, l)| (*h, f(l))).collect())
                .collect(),
        }
    }
}

impl<L: Clone> DependencyGraph<L> {
    /// Returns a copy whose head lists follow `order`.
    pub fn arrange(&self, order: PriorOrder) -> Self {
        let mut graph = self.clone();
        for (d, list) in graph.heads.iter_mut().enumerate().skip(1) {
            order.arrange(d as Index, list);
        }
        graph
    }
}

impl<L: Clone + Ord> DependencyGraph<L> {
    /// The graph as a set of `(dependent, head, label)`, ignoring head order.
    pub fn arc_set(&self) -> BTreeSet<(Index, Index, L)> {
        self.arcs()
            .map(|arc| (arc.dependent, arc.head, arc.label.clone()))
            .collect()
    }
}

/// Parses one enhanced dependency field, e.g. `0:root|3:nmod:poss`.
pub fn parse_deps(field: &str) -> Result<Vec<(Index, String)>, Error> {
    let field = field.trim();
    if field == DEPS_EMPTY_FIELD {
        return Ok(vec![]);
    }
    field
        .split(DEPS_ARC_DELIMITER)
        .map(|entry| {
            let mut parts = entry.splitn(2, DEPS_HEAD_DELIMITER);
            let head = parts
                .next()
                .and_then(|s| s.parse::<Index>().ok())
                .ok_or_else(|| Error::InvalidFormat(entry.to_string()))?;
            match parts.next() {
                Some(label) if !label.is_empty() => Ok((head, label.to_string())),
                _ => Err(Error::InvalidFormat(entry.to_string())),
            }
        })
        .collect()
}

pub fn format_deps<L: fmt::Display>(heads: &[(Index, L)]) -> String {
    if heads.is_empty() {
        return DEPS_EMPTY_FIELD.to_string();
    }
    heads
        .iter()
        .map(|(head, label)| format!("{}{}{}", head, DEPS_HEAD_DELIMITER, label))
        .collect::<Vec<_>>()
        .join(DEPS_ARC_DELIMITER)
}

impl DependencyGraph<String> {
    pub fn from_deps_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, Error> {
        let heads = fields
            .iter()
            .map(|field| parse_deps(field.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        DependencyGraph::from_heads(heads)
    }
}

impl<L: fmt::Display> DependencyGraph<L> {
    pub fn to_deps_fields(&self) -> Vec<String> {
        self.heads.iter().skip(1).map(|list| format_deps(list)).collect()
    }
}

impl FromStr for DependencyGraph<String> {
    type Err = Error;

    /// One sentence per line: tab-separated enhanced fields, one per word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(|c| c == '\n' || c == '\r');
        if line.trim().is_empty() {
            return Ok(DependencyGraph::new(0));
        }
        let fields: Vec<&str> = line.split(DEPS_FIELD_DELIMITER).collect();
        DependencyGraph::from_deps_fields(&fields)
    }
}

impl<L: fmt::Display> fmt::Display for DependencyGraph<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_deps_fields().join(DEPS_FIELD_DELIMITER))
    }
}

impl mod_io::FromLine for DependencyGraph<String> {
    type Err = Error;

    fn from_line(line: &str) -> Result<Self, Self::Err> {
        line.parse()
    }
}
