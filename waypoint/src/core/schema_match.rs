//! Structural compatibility checks between declared schemas.

use crate::model::schema::{Schema, SchemaType};

/// Outcome of a schema compatibility check.
///
/// A failed match carries a human-readable reason suitable for surfacing on
/// the specific mapping that declared it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub is_match: bool,
    pub reason: Option<String>,
}

impl MatchResult {
    fn ok() -> Self {
        Self {
            is_match: true,
            reason: None,
        }
    }

    fn fail(reason: String) -> Self {
        Self {
            is_match: false,
            reason: Some(reason),
        }
    }
}

/// Check whether a value of `source` shape can satisfy a `target` slot.
///
/// Rules apply in order and short-circuit on the first failure:
/// type equality, array-ness equality, recursive field coverage for
/// objects (extra source fields allowed), and content-type overlap for
/// files. Pure and total over well-formed schemas.
pub fn matches(source: &Schema, target: &Schema) -> MatchResult {
    if source.schema_type != target.schema_type {
        return MatchResult::fail(format!(
            "type mismatch: source is {}, target expects {}",
            source.schema_type.as_str(),
            target.schema_type.as_str()
        ));
    }

    if source.is_array != target.is_array {
        return MatchResult::fail(format!(
            "array mismatch: source {} an array, target {}",
            if source.is_array { "is" } else { "is not" },
            if target.is_array { "is" } else { "is not" }
        ));
    }

    if source.schema_type == SchemaType::Object {
        return match_object_fields(source, target);
    }

    if source.schema_type == SchemaType::File {
        if let (Some(source_types), Some(target_types)) =
            (&source.content_types, &target.content_types)
        {
            if !source_types.iter().any(|ct| target_types.contains(ct)) {
                return MatchResult::fail(format!(
                    "no shared content type between [{}] and [{}]",
                    source_types.join(", "),
                    target_types.join(", ")
                ));
            }
        }
    }

    MatchResult::ok()
}

fn match_object_fields(source: &Schema, target: &Schema) -> MatchResult {
    let (Some(source_fields), Some(target_fields)) = (&source.fields, &target.fields) else {
        return MatchResult::fail("object schema missing field declarations".to_string());
    };

    for (name, target_field) in target_fields {
        let Some(source_field) = source_fields.get(name) else {
            return MatchResult::fail(format!("missing field '{}'", name));
        };
        let nested = matches(source_field, target_field);
        if !nested.is_match {
            return MatchResult::fail(format!(
                "field '{}': {}",
                name,
                nested.reason.unwrap_or_else(|| "incompatible".to_string())
            ));
        }
    }

    MatchResult::ok()
}
