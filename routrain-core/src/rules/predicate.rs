use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

const CONJUNCTION: &str = " && ";

/// Which tags a predicate is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Tags of either endpoint of an edge
    Node,
    /// Tags of the way an edge belongs to
    Way,
}

impl Scope {
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Node => "N:",
            Scope::Way => "W:",
        }
    }
}

/// Single `key == value` condition, written `N:key==value` or `W:key==value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Predicate {
    pub scope: Scope,
    pub key: String,
    pub value: String,
}

impl Predicate {
    pub fn new(scope: Scope, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn node(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Scope::Node, key, value)
    }

    pub fn way(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Scope::Way, key, value)
    }

    /// Whether the textual form parses back to the same predicate
    pub fn is_representable(&self) -> bool {
        !self.key.is_empty()
            && !self.key.contains("==")
            && !self.key.contains("&&")
            && !self.value.contains("&&")
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}=={}", self.scope.prefix(), self.key, self.value)
    }
}

impl FromStr for Predicate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidRule(s.to_string());
        let (scope, condition) = s.split_once(':').ok_or_else(invalid)?;
        let scope = match scope {
            "N" => Scope::Node,
            "W" => Scope::Way,
            _ => return Err(invalid()),
        };
        let (key, value) = condition.split_once("==").ok_or_else(invalid)?;
        let predicate = Predicate::new(scope, key, value);
        if !predicate.is_representable() {
            return Err(invalid());
        }
        Ok(predicate)
    }
}

/// Ordered conjunction of predicates identifying one rule.
///
/// The textual form joins the predicates with ` && `. Each strict prefix of
/// a key is its ancestor in the rule hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    predicates: Vec<Predicate>,
}

impl RuleKey {
    /// # Panics
    ///
    /// Panics if `predicates` is empty
    pub fn new(predicates: Vec<Predicate>) -> Self {
        assert!(!predicates.is_empty(), "rule key needs at least one predicate");
        Self { predicates }
    }

    pub fn single(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
        }
    }

    /// `first && rest...`
    pub fn prefixed(first: Predicate, rest: &RuleKey) -> Self {
        let mut predicates = Vec::with_capacity(rest.predicates.len() + 1);
        predicates.push(first);
        predicates.extend(rest.predicates.iter().cloned());
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn conjuncts(&self) -> usize {
        self.predicates.len()
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.predicates.iter().any(|p| p.scope == scope)
    }

    /// The key without its last predicate, `None` for a single predicate
    pub fn parent(&self) -> Option<RuleKey> {
        (self.predicates.len() > 1).then(|| RuleKey {
            predicates: self.predicates[..self.predicates.len() - 1].to_vec(),
        })
    }
}

impl From<Predicate> for RuleKey {
    fn from(predicate: Predicate) -> Self {
        Self::single(predicate)
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(CONJUNCTION)?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

impl FromStr for RuleKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let predicates = s
            .split(CONJUNCTION)
            .map(str::parse)
            .collect::<Result<Vec<Predicate>, _>>()?;
        Ok(RuleKey { predicates })
    }
}

impl Serialize for RuleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuleKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
