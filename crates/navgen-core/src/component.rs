//! A flat hybrid automaton: variables, modes and guarded transitions.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::expression::Expression;
use crate::mode::AutomatonMode;

/// Identifier for modes within a [`BaseComponent`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModeId(pub usize);

/// A discrete jump between two modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonTransition {
    /// Source mode.
    pub from: ModeId,
    /// Target mode.
    pub to: ModeId,
    /// Condition enabling the jump.
    pub guard: Expression,
}

/// A single (non-networked) hybrid automaton.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseComponent {
    /// Declared continuous variables, in declaration order.
    pub variables: Vec<String>,
    modes: Vec<AutomatonMode>,
    transitions: Vec<AutomatonTransition>,
}

impl BaseComponent {
    /// Creates an empty automaton with no variables or modes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a continuous variable. Redeclaring is a no-op.
    pub fn declare_variable(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.variables.contains(&name) {
            self.variables.push(name);
        }
    }

    /// Check whether a variable was declared.
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Add a mode with a trivially true invariant and no flows.
    pub fn create_mode(&mut self, name: impl Into<String>) -> ModelResult<ModeId> {
        let name = name.into();
        if self.mode_id(&name).is_some() {
            return Err(ModelError::DuplicateMode { name });
        }
        let id = ModeId(self.modes.len());
        self.modes.push(AutomatonMode::new(name));
        Ok(id)
    }

    /// Add a transition with a trivially true guard and return it for editing.
    pub fn create_transition(
        &mut self,
        from: ModeId,
        to: ModeId,
    ) -> ModelResult<&mut AutomatonTransition> {
        for id in [from, to] {
            if id.0 >= self.modes.len() {
                return Err(ModelError::ModeOutOfRange { id });
            }
        }
        self.transitions.push(AutomatonTransition {
            from,
            to,
            guard: Expression::TRUE,
        });
        let last = self.transitions.len() - 1;
        Ok(&mut self.transitions[last])
    }

    pub fn mode(&self, id: ModeId) -> Option<&AutomatonMode> {
        self.modes.get(id.0)
    }

    pub fn mode_mut(&mut self, id: ModeId) -> Option<&mut AutomatonMode> {
        self.modes.get_mut(id.0)
    }

    /// Find a mode id by name.
    pub fn mode_id(&self, name: &str) -> Option<ModeId> {
        self.modes.iter().position(|m| m.name == name).map(ModeId)
    }

    /// Find a mode by name.
    pub fn mode_by_name(&self, name: &str) -> Option<&AutomatonMode> {
        self.mode_id(name).and_then(|id| self.mode(id))
    }

    /// All modes in creation order.
    pub fn modes(&self) -> impl Iterator<Item = (ModeId, &AutomatonMode)> {
        self.modes.iter().enumerate().map(|(i, m)| (ModeId(i), m))
    }

    /// All transitions in creation order.
    pub fn transitions(&self) -> &[AutomatonTransition] {
        &self.transitions
    }

    /// Transitions leaving a mode.
    pub fn outgoing(&self, id: ModeId) -> impl Iterator<Item = &AutomatonTransition> {
        self.transitions.iter().filter(move |t| t.from == id)
    }

    /// Transitions entering a mode.
    pub fn incoming(&self, id: ModeId) -> impl Iterator<Item = &AutomatonTransition> {
        self.transitions.iter().filter(move |t| t.to == id)
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Convert to petgraph StableDiGraph for analysis.
    /// Node weights are mode names, edge weights are guards.
    pub fn to_petgraph(&self) -> (StableDiGraph<String, Expression>, HashMap<ModeId, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for (id, mode) in self.modes() {
            let idx = graph.add_node(mode.name.clone());
            id_to_index.insert(id, idx);
        }

        for t in &self.transitions {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&t.from), id_to_index.get(&t.to))
            {
                graph.add_edge(from_idx, to_idx, t.guard.clone());
            }
        }

        (graph, id_to_index)
    }

    /// Modes reachable from `start` through the discrete transition graph,
    /// ignoring guards. Includes `start` itself.
    pub fn reachable_from(&self, start: ModeId) -> ModelResult<Vec<ModeId>> {
        let (graph, id_to_index) = self.to_petgraph();
        let start_idx = *id_to_index
            .get(&start)
            .ok_or(ModelError::ModeOutOfRange { id: start })?;
        let index_to_id: HashMap<NodeIndex, ModeId> =
            id_to_index.into_iter().map(|(id, idx)| (idx, id)).collect();

        let mut bfs = Bfs::new(&graph, start_idx);
        let mut reached = Vec::new();
        while let Some(idx) = bfs.next(&graph) {
            if let Some(&id) = index_to_id.get(&idx) {
                reached.push(id);
            }
        }
        reached.sort();
        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Operator;

    fn two_mode_component() -> (BaseComponent, ModeId, ModeId) {
        let mut ha = BaseComponent::new();
        ha.declare_variable("x");
        let a = ha.create_mode("a").unwrap();
        let b = ha.create_mode("b").unwrap();
        (ha, a, b)
    }

    #[test]
    fn test_create_mode_rejects_duplicates() {
        let (mut ha, _, _) = two_mode_component();
        assert_eq!(
            ha.create_mode("a"),
            Err(ModelError::DuplicateMode {
                name: "a".to_string()
            })
        );
        assert_eq!(ha.mode_count(), 2);
    }

    #[test]
    fn test_create_transition() {
        let (mut ha, a, b) = two_mode_component();
        let t = ha.create_transition(a, b).unwrap();
        assert_eq!(t.guard, Expression::TRUE);
        t.guard = Expression::compare("x", Operator::GreaterEqual, 1.0);

        assert_eq!(ha.transition_count(), 1);
        assert_eq!(ha.transitions()[0].guard.to_string(), "x >= 1");
        assert_eq!(ha.outgoing(a).count(), 1);
        assert_eq!(ha.incoming(b).count(), 1);
        assert_eq!(ha.outgoing(b).count(), 0);
        assert!(ha.create_transition(a, ModeId(7)).is_err());
    }

    #[test]
    fn test_declare_variable_dedupes() {
        let (mut ha, _, _) = two_mode_component();
        ha.declare_variable("x");
        ha.declare_variable("y");
        assert_eq!(ha.variables, vec!["x", "y"]);
        assert!(ha.has_variable("y"));
    }

    #[test]
    fn test_reachability() {
        let (mut ha, a, b) = two_mode_component();
        let c = ha.create_mode("c").unwrap();
        ha.create_transition(a, b).unwrap();

        assert_eq!(ha.reachable_from(a).unwrap(), vec![a, b]);
        assert_eq!(ha.reachable_from(b).unwrap(), vec![b]);
        assert_eq!(ha.reachable_from(c).unwrap(), vec![c]);

        let (graph, map) = ha.to_petgraph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph[map[&c]], "c");
    }
}
