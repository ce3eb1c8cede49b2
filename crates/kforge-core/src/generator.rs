use crate::error::{ForgeError, Result};
use crate::types::Phase;
use serde_json::Value;

/// Produces roadmap content from a free-text experience description.
///
/// Implementations are opaque to the engine; only the structural shape of
/// their output is checked, by [`parse_phases`].
pub trait ContentGenerator {
    fn generate(&self, description: &str, context: Option<&str>) -> Result<Value>;
}

/// Run a generator and validate its output as a phase list.
pub fn generate_phases(
    generator: &dyn ContentGenerator,
    description: &str,
    context: Option<&str>,
) -> Result<Vec<Phase>> {
    parse_phases(generator.generate(description, context)?)
}

/// Validate that `value` is a non-empty array of phase-like objects.
///
/// Accepts either a bare array or an object wrapping it under `"phases"`.
pub fn parse_phases(value: Value) -> Result<Vec<Phase>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("phases") {
            Some(Value::Array(items)) => items,
            _ => return Err(invalid("expected an array of phases")),
        },
        _ => return Err(invalid("expected an array of phases")),
    };
    if items.is_empty() {
        return Err(invalid("phase list is empty"));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| -> Result<Phase> {
            check_phase_shape(i, &item)?;
            Ok(serde_json::from_value(item)?)
        })
        .collect()
}

fn check_phase_shape(i: usize, item: &Value) -> Result<()> {
    let Some(obj) = item.as_object() else {
        return Err(invalid(format!("phase {i} is not an object")));
    };
    if !obj.get("title").is_some_and(Value::is_string) {
        return Err(invalid(format!("phase {i} has no string 'title'")));
    }
    match obj.get("tasks") {
        Some(Value::Array(tasks)) if tasks.iter().all(Value::is_string) => {}
        _ => {
            return Err(invalid(format!(
                "phase {i} has no 'tasks' array of strings"
            )))
        }
    }
    for key in ["description", "duration"] {
        if let Some(v) = obj.get(key) {
            if !(v.is_string() || v.is_null()) {
                return Err(invalid(format!("phase {i} has a non-string '{key}'")));
            }
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> ForgeError {
    ForgeError::InvalidRoadmap(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Canned(Value);

    impl ContentGenerator for Canned {
        fn generate(&self, _description: &str, _context: Option<&str>) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn parses_well_formed_phases() {
        let phases = parse_phases(json!([
            {"title": "Foundations", "description": "syntax", "tasks": ["a", "b"], "duration": "1 week"},
            {"title": "Projects", "tasks": []}
        ]))
        .unwrap();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].tasks, vec!["a", "b"]);
        assert_eq!(phases[0].duration.as_deref(), Some("1 week"));
        assert!(phases[1].description.is_none());
    }

    #[test]
    fn accepts_wrapped_phase_list() {
        let phases =
            parse_phases(json!({"phases": [{"title": "Only", "tasks": ["x"]}]})).unwrap();
        assert_eq!(phases[0].title, "Only");
    }

    #[test]
    fn rejects_structural_mismatches() {
        let cases = [
            (json!("text"), "expected an array"),
            (json!({"roadmap": []}), "expected an array"),
            (json!([]), "empty"),
            (json!([1]), "not an object"),
            (json!([{"tasks": ["a"]}]), "'title'"),
            (json!([{"title": "T", "tasks": [1]}]), "'tasks'"),
            (json!([{"title": "T"}]), "'tasks'"),
            (json!([{"title": "T", "tasks": [], "duration": 3}]), "'duration'"),
        ];
        for (value, needle) in cases {
            let err = parse_phases(value.clone()).unwrap_err();
            assert!(
                matches!(err, ForgeError::InvalidRoadmap(_)),
                "unexpected error for {value}"
            );
            assert!(err.to_string().contains(needle), "{err} lacks {needle}");
        }
    }

    #[test]
    fn generate_phases_validates_generator_output() {
        let good = Canned(json!([{"title": "P", "tasks": ["t"]}]));
        assert_eq!(generate_phases(&good, "I know Python", None).unwrap().len(), 1);

        let bad = Canned(json!({"error": "rate limited"}));
        assert!(generate_phases(&bad, "I know Python", Some("ctx")).is_err());
    }
}
