use std::fmt;
use std::str::FromStr;

use crate::syntax::Index;

/// The order in which the heads of one word are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorOrder {
    /// as listed in the gold data
    DeepFirst,
    /// left heads from the nearest outwards, then right heads from the nearest outwards
    InsideOut,
    LeftToRight,
}

impl PriorOrder {
    /// Whether `candidate` may follow `last_head` as the next head of `dependent`.
    pub fn is_valid(&self, dependent: Index, last_head: Option<Index>, candidate: Index) -> bool {
        let last = match last_head {
            Some(head) => head,
            None => return true,
        };
        match *self {
            PriorOrder::DeepFirst => true,
            PriorOrder::LeftToRight => candidate > last,
            PriorOrder::InsideOut => {
                if candidate < dependent {
                    last < dependent && candidate < last
                } else {
                    last < dependent || candidate > last
                }
            }
        }
    }

    /// Reorders the heads of `dependent` in place so that every prefix satisfies `is_valid`.
    pub fn arrange<L>(&self, dependent: Index, heads: &mut Vec<(Index, L)>) {
        match *self {
            PriorOrder::DeepFirst => {}
            PriorOrder::LeftToRight => heads.sort_by_key(|&(head, _)| head),
            PriorOrder::InsideOut => heads.sort_by_key(|&(head, _)| {
                if head < dependent {
                    (0, dependent - head)
                } else {
                    (1, head - dependent)
                }
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            PriorOrder::DeepFirst => "deep_first",
            PriorOrder::InsideOut => "inside_out",
            PriorOrder::LeftToRight => "left2right",
        }
    }
}

impl Default for PriorOrder {
    fn default() -> Self {
        PriorOrder::DeepFirst
    }
}

impl fmt::Display for PriorOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriorOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deep_first" => Ok(PriorOrder::DeepFirst),
            "inside_out" => Ok(PriorOrder::InsideOut),
            "left2right" | "left_to_right" => Ok(PriorOrder::LeftToRight),
            _ => Err(format!("unknown prior order: `{}`", s)),
        }
    }
}
