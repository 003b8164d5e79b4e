//! Arena index of mission scopes by id with explicit parent pointers.
//!
//! Built once per query over an immutable snapshot, so ancestor and sibling
//! lookups stay O(1) per hop instead of re-searching the tree.

use std::collections::HashMap;

use crate::model::mapping::Mapping;
use crate::model::mission::{Mission, Stage, Workflow};
use crate::model::step::Step;
use crate::model::variable::Variable;

/// A borrowed reference to one scope-carrying node of the hierarchy.
#[derive(Clone, Copy, Debug)]
pub enum ScopeRef<'a> {
    Workflow(&'a Workflow),
    Stage(&'a Stage),
    Step(&'a Step),
}

impl<'a> ScopeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ScopeRef::Workflow(workflow) => &workflow.id,
            ScopeRef::Stage(stage) => &stage.id,
            ScopeRef::Step(step) => &step.id,
        }
    }

    pub fn state(&self) -> &'a [Variable] {
        match self {
            ScopeRef::Workflow(workflow) => &workflow.state,
            ScopeRef::Stage(stage) => &stage.state,
            ScopeRef::Step(step) => &step.state,
        }
    }

    pub fn output_mappings(&self) -> &'a [Mapping] {
        match self {
            ScopeRef::Workflow(workflow) => &workflow.output_mappings,
            ScopeRef::Stage(stage) => &stage.output_mappings,
            ScopeRef::Step(step) => &step.output_mappings,
        }
    }

    /// Children in declared execution order.
    pub fn children(&self) -> Vec<ScopeRef<'a>> {
        match self {
            ScopeRef::Workflow(workflow) => {
                workflow.stages.iter().map(ScopeRef::Stage).collect()
            }
            ScopeRef::Stage(stage) => stage.steps.iter().map(ScopeRef::Step).collect(),
            ScopeRef::Step(step) => step.substeps().iter().map(ScopeRef::Step).collect(),
        }
    }
}

/// Id-keyed arena over one mission snapshot.
#[derive(Debug)]
pub struct MissionIndex<'a> {
    nodes: HashMap<&'a str, ScopeRef<'a>>,
    parents: HashMap<&'a str, Option<&'a str>>,
    positions: HashMap<&'a str, usize>,
    variables: HashMap<&'a str, &'a Variable>,
}

impl<'a> MissionIndex<'a> {
    /// Build the index. Fails on duplicate node ids, which would make
    /// parent pointers ambiguous.
    pub fn build(mission: &'a Mission) -> Result<Self, String> {
        let mut index = Self {
            nodes: HashMap::new(),
            parents: HashMap::new(),
            positions: HashMap::new(),
            variables: HashMap::new(),
        };

        for variable in &mission.state {
            index.variables.entry(&variable.id).or_insert(variable);
        }
        index.insert(ScopeRef::Workflow(&mission.workflow), None, 0)?;
        Ok(index)
    }

    fn insert(
        &mut self,
        node: ScopeRef<'a>,
        parent: Option<&'a str>,
        position: usize,
    ) -> Result<(), String> {
        let id = node.id();
        if self.nodes.insert(id, node).is_some() {
            return Err(format!("duplicate node id '{}'", id));
        }
        self.parents.insert(id, parent);
        self.positions.insert(id, position);
        for variable in node.state() {
            self.variables.entry(&variable.id).or_insert(variable);
        }
        for (child_position, child) in node.children().into_iter().enumerate() {
            self.insert(child, Some(id), child_position)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ScopeRef<'a>> {
        self.nodes.get(id).copied()
    }

    /// Look up a variable anywhere in the tree by id.
    pub fn variable(&self, id: &str) -> Option<&'a Variable> {
        self.variables.get(id).copied()
    }

    /// Ancestors of `id`, ordered root-first, excluding the node itself.
    ///
    /// Fails fast if the parent chain revisits a node, which indicates a
    /// tree built outside the intended construction path.
    pub fn ancestors(&self, id: &str) -> Result<Vec<ScopeRef<'a>>, String> {
        let mut chain = Vec::new();
        let mut visited = vec![id.to_string()];
        let mut current = self
            .parents
            .get(id)
            .copied()
            .ok_or_else(|| format!("unknown node id '{}'", id))?;

        while let Some(parent_id) = current {
            if visited.iter().any(|seen| seen == parent_id) {
                return Err(format!("cyclic ancestry detected at '{}'", parent_id));
            }
            visited.push(parent_id.to_string());
            chain.push(self.nodes[parent_id]);
            current = self.parents.get(parent_id).copied().flatten();
        }

        chain.reverse();
        Ok(chain)
    }

    /// Siblings declared before `id` under the same parent, in order.
    pub fn prior_siblings(&self, id: &str) -> Vec<ScopeRef<'a>> {
        let Some(position) = self.positions.get(id).copied() else {
            return Vec::new();
        };
        let Some(Some(parent_id)) = self.parents.get(id) else {
            return Vec::new();
        };
        self.nodes[parent_id]
            .children()
            .into_iter()
            .take(position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{atomic_step, mission_with_stages, stage_with_steps};

    /// Ancestors are returned root-first and exclude the node itself.
    #[test]
    fn ancestors_are_root_first() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b")],
        )]);
        let index = MissionIndex::build(&mission).expect("index");

        let chain = index.ancestors("b").expect("ancestors");
        let ids: Vec<&str> = chain.iter().map(|scope| scope.id()).collect();
        assert_eq!(ids, vec!["workflow", "s1"]);
    }

    /// Prior siblings preserve declared order and stop before the node.
    #[test]
    fn prior_siblings_respect_declared_order() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b"), atomic_step("c")],
        )]);
        let index = MissionIndex::build(&mission).expect("index");

        let ids: Vec<&str> = index
            .prior_siblings("c")
            .iter()
            .map(|scope| scope.id())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(index.prior_siblings("a").is_empty());
    }

    /// Duplicate node ids are rejected at build time.
    #[test]
    fn build_rejects_duplicate_node_ids() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("a")],
        )]);
        let err = MissionIndex::build(&mission).expect_err("duplicate should fail");
        assert!(err.contains("duplicate node id 'a'"));
    }
}
