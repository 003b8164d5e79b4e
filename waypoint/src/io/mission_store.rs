//! Mission snapshot load/save with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::invariants::{validate_invariants, InvariantLimits};
use crate::model::mission::Mission;

/// Load and validate a mission snapshot from disk (schema + invariants).
pub fn load_mission(
    schema_path: &Path,
    mission_path: &Path,
    limits: &InvariantLimits,
) -> Result<Mission> {
    let contents = fs::read_to_string(mission_path)
        .with_context(|| format!("read mission {}", mission_path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse mission {}", mission_path.display()))?;
    validate_schema(schema_path, &value)?;
    let mission: Mission = serde_json::from_value(value)
        .with_context(|| format!("deserialize mission {}", mission_path.display()))?;
    validate_mission_invariants(&mission, limits)?;
    debug!(mission = %mission.id, stages = mission.workflow.stages.len(), "loaded mission snapshot");
    Ok(mission)
}

/// Write a mission snapshot with canonical formatting.
pub fn write_mission(mission_path: &Path, mission: &Mission) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(mission)?;
    buf.push('\n');
    fs::write(mission_path, buf)
        .with_context(|| format!("write mission {}", mission_path.display()))
}

fn validate_schema(schema_path: &Path, mission: &Value) -> Result<()> {
    let schema_contents = fs::read_to_string(schema_path)
        .with_context(|| format!("read schema {}", schema_path.display()))?;
    let schema_value: Value = serde_json::from_str(&schema_contents)
        .with_context(|| format!("parse schema {}", schema_path.display()))?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(mission) {
        let messages = compiled
            .iter_errors(mission)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "mission schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

fn validate_mission_invariants(mission: &Mission, limits: &InvariantLimits) -> Result<()> {
    let errors = validate_invariants(mission, limits);
    if errors.is_empty() {
        return Ok(());
    }
    Err(anyhow!("mission invariants failed: {}", errors.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mission::default_mission;

    const V1_SCHEMA: &str = include_str!("../../schemas/mission/v1.schema.json");

    /// Verifies write → load round-trip preserves the mission snapshot.
    #[test]
    fn load_and_write_mission_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let schema_path = root.join("schema.json");
        let mission_path = root.join("mission.json");

        fs::write(&schema_path, V1_SCHEMA).expect("write schema");
        write_mission(&mission_path, &default_mission()).expect("write mission");

        let mission = load_mission(&schema_path, &mission_path, &InvariantLimits::default())
            .expect("load mission");
        assert_eq!(mission.id, "mission");
    }

    /// A snapshot violating invariants is refused at load time.
    #[test]
    fn load_refuses_invariant_violations() {
        use crate::test_support::{atomic_step, composite_step, mission_with_stages,
            stage_with_steps};

        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let schema_path = root.join("schema.json");
        let mission_path = root.join("mission.json");
        fs::write(&schema_path, V1_SCHEMA).expect("write schema");

        let mission = mission_with_stages(vec![stage_with_steps(
            "s1",
            vec![composite_step("c", vec![atomic_step("a")])],
        )]);
        write_mission(&mission_path, &mission).expect("write mission");

        let err = load_mission(&schema_path, &mission_path, &InvariantLimits::default())
            .expect_err("should fail");
        assert!(err.to_string().contains("mission invariants failed"));
    }
}
