//! Multiplex tree resolution
//!
//! Turns the flat "signal X is present when switch S equals V" facts of one
//! message into a tree: the root owns the unconditional signals, and every
//! switch value group becomes a child node owning the signals it enables.
//! Simple multiplexing (`m<n>` indicators) and extended multiplexing
//! (`SG_MUL_VAL_` facts) resolve to the same shape.
//!
//! Each multiplexed signal resolves to exactly one discriminator and the tree
//! only descends from base signals, so construction always terminates.
//! Signals whose chain never reaches a base signal (unknown switch, self or
//! mutual gating) are left out of the tree and reported by
//! [`MultiplexResolution::unreachable`].

use crate::signals::catalog::SignalCatalog;
use crate::signals::database::{MessageDefinition, MultiplexValueDef};
use crate::types::Discriminator;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One class level of a message: the root, or one value group of a switch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplexNode {
    /// Class name: message name for the root, `<parent>_<first signal>` below
    pub class_name: String,
    /// Discriminator selecting this node; `None` for the root
    pub selector: Option<Discriminator>,
    /// Signals owned by ancestors, in constructor order
    pub inherited: Vec<String>,
    /// Signals owned at this level
    pub signals: Vec<String>,
    /// Value groups of switches owned at this level, in discovery order
    pub children: Vec<MultiplexNode>,
}

impl MultiplexNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Inherited followed by owned signal names, the full constructor argument list
    pub fn all_signals(&self) -> impl Iterator<Item = &str> {
        self.inherited
            .iter()
            .chain(self.signals.iter())
            .map(String::as_str)
    }

    /// Number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MultiplexNode::node_count).sum::<usize>()
    }

    /// Deepest nesting level below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Flat multiplex relations of one message
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexResolution {
    message_name: String,
    top_switch: Option<String>,
    base_signals: Vec<String>,
    /// Switch name -> gated signal names, in discovery order
    children_by_switch: HashMap<String, Vec<String>>,
    /// Gated signal name -> its discriminator
    resolved: HashMap<String, Discriminator>,
    /// Gated signal names in discovery order
    multiplexed: Vec<String>,
    /// Signals with facts naming a different switch than their first fact
    conflicting: Vec<String>,
}

/// Resolve the multiplex relations of a message
///
/// `facts` are the extended multiplex facts recorded for this message; they
/// take precedence over the simple switch value declared on a signal.
pub fn resolve(message: &MessageDefinition, facts: &[MultiplexValueDef]) -> MultiplexResolution {
    let catalog = SignalCatalog::new(message);
    let mut resolution = MultiplexResolution {
        message_name: message.name.clone(),
        top_switch: None,
        base_signals: Vec::new(),
        children_by_switch: HashMap::new(),
        resolved: HashMap::new(),
        multiplexed: Vec::new(),
        conflicting: Vec::new(),
    };

    for fact in facts {
        if !catalog.contains(&fact.signal) {
            log::warn!(
                "{}: multiplex value for unknown signal '{}' ignored",
                message.name,
                fact.signal
            );
            continue;
        }
        if let Some(first) = resolution.resolved.get(&fact.signal) {
            if first.switch == fact.switch {
                // Further ranges of the same entry
                log::debug!(
                    "{}: '{}' also active for {}..={} of '{}', matching on {}",
                    message.name,
                    fact.signal,
                    fact.range_start,
                    fact.range_end,
                    fact.switch,
                    first.value
                );
            } else {
                log::warn!(
                    "{}: signal '{}' is multiplexed by both '{}' and '{}', keeping '{}'",
                    message.name,
                    fact.signal,
                    first.switch,
                    fact.switch,
                    first.switch
                );
                if !resolution.conflicting.contains(&fact.signal) {
                    resolution.conflicting.push(fact.signal.clone());
                }
            }
            continue;
        }
        if fact.range_start != fact.range_end {
            log::debug!(
                "{}: '{}' active for {}..={} of '{}', matching on {}",
                message.name,
                fact.signal,
                fact.range_start,
                fact.range_end,
                fact.switch,
                fact.range_start
            );
        }
        resolution.register(&fact.signal, Discriminator::new(&fact.switch, fact.range_start));
    }

    let mut switches = message.signals.iter().filter(|s| {
        s.is_multiplexer_switch() && !s.is_multiplexed() && !resolution.resolved.contains_key(&s.name)
    });
    resolution.top_switch = switches.next().map(|s| s.name.clone());
    for extra in switches {
        log::warn!(
            "{}: additional top-level multiplexer '{}' treated as a plain signal",
            message.name,
            extra.name
        );
    }

    for signal in &message.signals {
        if resolution.resolved.contains_key(&signal.name) {
            continue;
        }
        match (signal.switch_value(), resolution.top_switch.clone()) {
            (Some(value), Some(top)) => {
                resolution.register(&signal.name, Discriminator::new(top, value));
            }
            (Some(_), None) => {
                log::warn!(
                    "{}: multiplexed signal '{}' has no multiplexer, decoding it unconditionally",
                    message.name,
                    signal.name
                );
                resolution.base_signals.push(signal.name.clone());
            }
            (None, _) => resolution.base_signals.push(signal.name.clone()),
        }
    }

    for signal in resolution.unreachable() {
        log::warn!(
            "{}: signal '{}' is gated by a switch that is never decoded, skipping it",
            message.name,
            signal
        );
    }

    log::debug!(
        "{}: {} base signals, {} multiplexed, top-level switch {:?}",
        message.name,
        resolution.base_signals.len(),
        resolution.multiplexed.len(),
        resolution.top_switch
    );

    resolution
}

impl MultiplexResolution {
    fn register(&mut self, signal: &str, discriminator: Discriminator) {
        self.children_by_switch
            .entry(discriminator.switch.clone())
            .or_default()
            .push(signal.to_string());
        self.resolved.insert(signal.to_string(), discriminator);
        self.multiplexed.push(signal.to_string());
    }

    /// The non-multiplexed switch of the message, if any
    pub fn top_switch(&self) -> Option<&str> {
        self.top_switch.as_deref()
    }

    /// Unconditionally present signals, in declaration order
    pub fn base_signals(&self) -> &[String] {
        &self.base_signals
    }

    /// Signals gated by a switch, in discovery order
    pub fn children_of(&self, switch: &str) -> &[String] {
        self.children_by_switch
            .get(switch)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Signals whose multiplex facts name more than one switch
    pub fn conflicting(&self) -> &[String] {
        &self.conflicting
    }

    /// Resolved discriminator of a multiplexed signal
    pub fn discriminator(&self, signal: &str) -> Option<&Discriminator> {
        self.resolved.get(signal)
    }

    /// Children of a switch grouped by value, groups in first-seen order
    fn value_groups(&self, switch: &str) -> Vec<(u64, Vec<String>)> {
        let mut groups: Vec<(u64, Vec<String>)> = Vec::new();
        for child in self.children_of(switch) {
            let Some(d) = self.resolved.get(child) else {
                continue;
            };
            match groups.iter_mut().find(|(value, _)| *value == d.value) {
                Some((_, members)) => members.push(child.clone()),
                None => groups.push((d.value, vec![child.clone()])),
            }
        }
        groups
    }

    /// Build the class tree rooted at the message
    pub fn tree(&self) -> MultiplexNode {
        self.build_node(
            self.message_name.clone(),
            None,
            Vec::new(),
            self.base_signals.clone(),
        )
    }

    fn build_node(
        &self,
        class_name: String,
        selector: Option<Discriminator>,
        inherited: Vec<String>,
        signals: Vec<String>,
    ) -> MultiplexNode {
        let child_inherited: Vec<String> = inherited.iter().chain(&signals).cloned().collect();

        let mut children = Vec::new();
        for switch in &signals {
            for (value, members) in self.value_groups(switch) {
                let child_class = format!("{}_{}", class_name, members[0]);
                children.push(self.build_node(
                    child_class,
                    Some(Discriminator::new(switch, value)),
                    child_inherited.clone(),
                    members,
                ));
            }
        }

        MultiplexNode {
            class_name,
            selector,
            inherited,
            signals,
            children,
        }
    }

    /// Multiplexed signals that never appear in the tree, in discovery order
    pub fn unreachable(&self) -> Vec<&str> {
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = self.base_signals.iter().map(String::as_str).collect();
        while let Some(signal) = pending.pop() {
            for child in self.children_of(signal) {
                if reachable.insert(child.as_str()) {
                    pending.push(child.as_str());
                }
            }
        }
        self.multiplexed
            .iter()
            .map(String::as_str)
            .filter(|s| !reachable.contains(s))
            .collect()
    }
}
