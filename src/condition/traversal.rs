//! Depth-first walk over the rules of a tree

use smallvec::SmallVec;

use crate::condition::ast::{Node, Rule};

/// Pre-order iterator yielding rules left to right
#[derive(Debug, Clone)]
pub struct Rules<'a> {
    stack: SmallVec<[&'a Node; 8]>,
}

impl<'a> Iterator for Rules<'a> {
    type Item = &'a Rule;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Rule(rule) => return Some(rule),
                Node::Condition(cond) => {
                    // Right first so the left subtree pops next
                    self.stack.push(&cond.right);
                    self.stack.push(&cond.left);
                }
            }
        }
        None
    }
}

impl Node {
    pub fn rules(&self) -> Rules<'_> {
        let mut stack = SmallVec::new();
        stack.push(self);
        Rules { stack }
    }

    /// Call `visit` on every rule, left to right
    pub fn for_each_rule(&self, mut visit: impl FnMut(&Rule)) {
        for rule in self.rules() {
            visit(rule);
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }
}
