//! Semantic invariants not expressible via the snapshot JSON Schema.

use std::collections::HashSet;

use regex::Regex;

use crate::core::index::ScopeRef;
use crate::model::mapping::Mapping;
use crate::model::mission::Mission;
use crate::model::schema::{Schema, SchemaType};
use crate::model::step::StepKind;

/// Bounds the invariant checks are validated against.
#[derive(Debug, Clone)]
pub struct InvariantLimits {
    /// Maximum nesting depth of the hierarchy.
    pub max_tree_depth: usize,
    /// Pattern every variable display name must match.
    pub variable_name_pattern: Regex,
}

impl Default for InvariantLimits {
    fn default() -> Self {
        Self {
            max_tree_depth: 16,
            variable_name_pattern: Regex::new("^[A-Za-z][A-Za-z0-9 _-]*$")
                .expect("default pattern should compile"),
        }
    }
}

/// Check semantic invariants over a full snapshot:
/// - No duplicate node ids or variable ids
/// - Composite steps declare at least 2 substeps
/// - Schemas are well-formed (`fields` iff object, `content_types` only
///   for file)
/// - Mapping references resolve to known variables
/// - Variable names match the configured pattern
/// - Nesting depth stays within bounds
///
/// Returns a list of stable error messages (empty on success). A snapshot
/// failing any of these was built outside the intended construction path
/// and must be rejected, not repaired.
pub fn validate_invariants(mission: &Mission, limits: &InvariantLimits) -> Vec<String> {
    let mut errors = Vec::new();
    let mut checker = Checker {
        limits,
        known_variables: collect_variable_ids(mission),
        seen_nodes: HashSet::new(),
        seen_variables: HashSet::new(),
        errors: &mut errors,
    };

    for variable in &mission.state {
        checker.check_variable("mission", &variable.id, &variable.name, &variable.schema);
    }
    checker.check_scope(ScopeRef::Workflow(&mission.workflow), "mission", 1);
    errors
}

fn collect_variable_ids(mission: &Mission) -> HashSet<String> {
    let mut ids = HashSet::new();
    for variable in &mission.state {
        ids.insert(variable.id.clone());
    }
    collect_scope_variable_ids(ScopeRef::Workflow(&mission.workflow), &mut ids);
    ids
}

fn collect_scope_variable_ids(scope: ScopeRef<'_>, ids: &mut HashSet<String>) {
    for variable in scope.state() {
        ids.insert(variable.id.clone());
    }
    for child in scope.children() {
        collect_scope_variable_ids(child, ids);
    }
}

struct Checker<'a> {
    limits: &'a InvariantLimits,
    known_variables: HashSet<String>,
    seen_nodes: HashSet<String>,
    seen_variables: HashSet<String>,
    errors: &'a mut Vec<String>,
}

impl Checker<'_> {
    fn check_scope(&mut self, scope: ScopeRef<'_>, parent_path: &str, depth: usize) {
        let path = format!("{}/{}", parent_path, scope.id());

        if !self.seen_nodes.insert(scope.id().to_string()) {
            self.errors
                .push(format!("duplicate node id '{}' at {}", scope.id(), path));
        }

        if depth > self.limits.max_tree_depth {
            self.errors.push(format!(
                "{}: depth {} exceeds max_tree_depth {}",
                path, depth, self.limits.max_tree_depth
            ));
            return;
        }

        if let ScopeRef::Step(step) = scope {
            if let StepKind::Composite { substeps } = &step.kind {
                if substeps.len() < 2 {
                    self.errors.push(format!(
                        "{}: composite step must declare at least 2 substeps, has {}",
                        path,
                        substeps.len()
                    ));
                }
            }
            self.check_mappings(&path, &step.input_mappings, scope);
        }
        self.check_mappings(&path, scope.output_mappings(), scope);

        for variable in scope.state() {
            self.check_variable(&path, &variable.id, &variable.name, &variable.schema);
        }
        for child in scope.children() {
            self.check_scope(child, &path, depth + 1);
        }
    }

    fn check_variable(&mut self, path: &str, id: &str, name: &str, schema: &Schema) {
        if !self.seen_variables.insert(id.to_string()) {
            self.errors
                .push(format!("{}: duplicate variable id '{}'", path, id));
        }
        if !self.limits.variable_name_pattern.is_match(name) {
            self.errors.push(format!(
                "{}: variable '{}' name '{}' does not match the configured pattern",
                path, id, name
            ));
        }
        self.check_schema(path, id, schema);
    }

    fn check_schema(&mut self, path: &str, id: &str, schema: &Schema) {
        match (schema.schema_type, &schema.fields) {
            (SchemaType::Object, None) => self.errors.push(format!(
                "{}: variable '{}' object schema must declare fields",
                path, id
            )),
            (SchemaType::Object, Some(fields)) => {
                for nested in fields.values() {
                    self.check_schema(path, id, nested);
                }
            }
            (_, Some(_)) => self.errors.push(format!(
                "{}: variable '{}' declares fields on a non-object schema",
                path, id
            )),
            (_, None) => {}
        }

        if schema.content_types.is_some() && schema.schema_type != SchemaType::File {
            self.errors.push(format!(
                "{}: variable '{}' declares content_types on a non-file schema",
                path, id
            ));
        }
    }

    fn check_mappings(&mut self, path: &str, mappings: &[Mapping], scope: ScopeRef<'_>) {
        for mapping in mappings {
            if let Some(source) = mapping.bound_source() {
                if !self.known_variables.contains(source) {
                    self.errors.push(format!(
                        "{}: mapping source '{}' does not resolve to a known variable",
                        path, source
                    ));
                }
            }
            if let Some(target) = mapping.target_variable_id() {
                if !scope
                    .state()
                    .iter()
                    .any(|variable| variable.id == target)
                {
                    self.errors.push(format!(
                        "{}: mapping target '{}' is not a variable of this scope",
                        path, target
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mapping::{Mapping, MergeOp};
    use crate::model::schema::Schema;
    use crate::test_support::{
        atomic_step, composite_step, mission_with_stages, output_of, stage_with_steps, variable,
    };
    use crate::model::variable::IoType;

    fn check(mission: &Mission) -> Vec<String> {
        validate_invariants(mission, &InvariantLimits::default())
    }

    /// A well-formed mission produces no errors.
    #[test]
    fn clean_mission_passes() {
        let mut mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("b")],
        )]);
        mission.state.push(variable("v1", IoType::Input));
        assert!(check(&mission).is_empty());
    }

    /// Duplicate node ids are reported with their path.
    #[test]
    fn duplicate_node_ids_are_reported() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![atomic_step("a"), atomic_step("a")],
        )]);
        let errors = check(&mission);
        assert!(errors.iter().any(|err| err.contains("duplicate node id 'a'")));
    }

    /// Composite steps with fewer than 2 substeps are a violation.
    #[test]
    fn undersized_composite_is_reported() {
        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![composite_step("c", vec![atomic_step("a")])],
        )]);
        let errors = check(&mission);
        assert!(errors
            .iter()
            .any(|err| err.contains("at least 2 substeps")));
    }

    /// Object schemas must declare fields; non-object schemas must not.
    #[test]
    fn malformed_schemas_are_reported() {
        let mut mission = mission_with_stages(vec![stage_with_steps("s1", vec![atomic_step("a")])]);
        let mut bad_object = variable("v1", IoType::Input);
        bad_object.schema = Schema::scalar(crate::model::schema::SchemaType::Object);
        mission.state.push(bad_object);

        let mut stray_fields = variable("v2", IoType::Input);
        stray_fields.schema.fields = Some(Default::default());
        mission.state.push(stray_fields);

        let errors = check(&mission);
        assert!(errors.iter().any(|err| err.contains("must declare fields")));
        assert!(errors
            .iter()
            .any(|err| err.contains("fields on a non-object schema")));
    }

    /// Mapping sources must resolve; variable targets must live in the
    /// owning scope.
    #[test]
    fn dangling_mapping_references_are_reported() {
        let mut step = atomic_step("a");
        let mut input = Mapping::parameter(
            "p",
            Schema::scalar(crate::model::schema::SchemaType::String),
            true,
        );
        input.source_variable_id = Some("ghost".to_string());
        step.input_mappings.push(input);
        step.output_mappings
            .push(Mapping::output("elsewhere", MergeOp::Assign));
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![step])]);

        let errors = check(&mission);
        assert!(errors
            .iter()
            .any(|err| err.contains("source 'ghost' does not resolve")));
        assert!(errors
            .iter()
            .any(|err| err.contains("target 'elsewhere' is not a variable of this scope")));
    }

    /// Variable names must match the configured pattern.
    #[test]
    fn invalid_variable_names_are_reported() {
        let mut mission = mission_with_stages(vec![stage_with_steps("s1", vec![atomic_step("a")])]);
        let mut bad = variable("v1", IoType::Input);
        bad.name = "!bad".to_string();
        mission.state.push(bad);

        let errors = check(&mission);
        assert!(errors
            .iter()
            .any(|err| err.contains("does not match the configured pattern")));
    }

    /// Trees deeper than the configured bound are rejected.
    #[test]
    fn excessive_depth_is_reported() {
        let deep = composite_step(
            "c1",
            vec![
                composite_step("c2", vec![atomic_step("a"), atomic_step("b")]),
                atomic_step("d"),
            ],
        );
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![deep])]);
        let limits = InvariantLimits {
            max_tree_depth: 3,
            ..InvariantLimits::default()
        };
        let errors = validate_invariants(&mission, &limits);
        assert!(errors.iter().any(|err| err.contains("exceeds max_tree_depth")));
    }

    /// An output variable referenced by a production mapping in its own
    /// scope is valid.
    #[test]
    fn production_mapping_in_scope_is_valid() {
        let mut step = atomic_step("a");
        step.state.push(output_of("a.out", "a"));
        step.output_mappings
            .push(Mapping::output("a.out", MergeOp::Assign));
        let mission = mission_with_stages(vec![stage_with_steps("s1", vec![step])]);
        assert!(check(&mission).is_empty());
    }
}
