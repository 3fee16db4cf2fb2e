use hashbrown::HashMap;

use super::{
    predicate::{Predicate, Scope},
    set::Weight,
};

/// One predicate in the rule hierarchy: its own weight and the rules that
/// apply when this predicate holds together with a further one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleNode {
    pub weight: Weight,
    pub children: RuleTree,
}

/// Rules of one scope, looked up by tag key and then tag value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopedRules {
    by_key: HashMap<String, HashMap<String, RuleNode>>,
}

impl ScopedRules {
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn get(&self, key: &str, value: &str) -> Option<&RuleNode> {
        self.by_key.get(key).and_then(|values| values.get(value))
    }

    fn entry(&mut self, key: &str, value: &str) -> &mut RuleNode {
        self.by_key
            .entry_ref(key)
            .or_default()
            .entry_ref(value)
            .or_default()
    }
}

/// Pair of node-scoped and way-scoped rule maps. Nested trees may mix
/// scopes, so a conjunction can combine node and way predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTree {
    node: ScopedRules,
    way: ScopedRules,
}

impl RuleTree {
    pub fn is_empty(&self) -> bool {
        self.node.is_empty() && self.way.is_empty()
    }

    pub fn scoped(&self, scope: Scope) -> &ScopedRules {
        match scope {
            Scope::Node => &self.node,
            Scope::Way => &self.way,
        }
    }

    fn scoped_mut(&mut self, scope: Scope) -> &mut ScopedRules {
        match scope {
            Scope::Node => &mut self.node,
            Scope::Way => &mut self.way,
        }
    }

    /// Inserts the weight for the conjunction `path`. Ancestors missing from
    /// the tree are created with a zero weight.
    pub(crate) fn insert(&mut self, path: &[Predicate], weight: Weight) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        let node = self.scoped_mut(first.scope).entry(&first.key, &first.value);
        if rest.is_empty() {
            node.weight = weight;
        } else {
            node.children.insert(rest, weight);
        }
    }
}
