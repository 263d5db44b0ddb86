use crate::errors::TaskError;
use crate::model::Task;
use std::collections::HashSet;
use std::path::Path;

pub fn load_task(path: &Path) -> Result<Task, TaskError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TaskError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let task: Task = serde_json::from_str(&raw).map_err(|source| TaskError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_task(&task)?;
    tracing::debug!(
        task_id = %task.id,
        checks = task.ast_checks.len(),
        criteria = task.rubric.len(),
        "task loaded"
    );
    Ok(task)
}

pub fn validate_task(task: &Task) -> Result<(), TaskError> {
    let invalid = |reason: String| TaskError::Invalid {
        id: task.id.clone(),
        reason,
    };
    if task.id.trim().is_empty() {
        return Err(invalid("empty task id".to_string()));
    }
    let mut seen = HashSet::new();
    for c in &task.rubric {
        if !seen.insert(c.name.as_str()) {
            return Err(invalid(format!("duplicate criterion '{}'", c.name)));
        }
        if !c.weight.is_finite() || !(0.0..=1.0).contains(&c.weight) {
            return Err(invalid(format!(
                "criterion '{}' has weight {} outside [0, 1]",
                c.name, c.weight
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TASK: &str = r#"{
        "id": "next-15-async-params",
        "category": "bleeding_edge",
        "library": "next",
        "target_version": "15.0.0",
        "prompt": "Write a dynamic route page.",
        "rubric": [{"name": "awaits_params", "weight": 0.6}, {"name": "no_hallucination", "weight": 0.4}],
        "common_hallucinations": ["Using params.slug synchronously (Next 14 and older)"],
        "ast_checks": [{"type": "await_present", "call": "params"}]
    }"#;

    #[test]
    fn loads_valid_task() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("task.json");
        std::fs::write(&path, TASK).unwrap();
        let task = load_task(&path).unwrap();
        assert_eq!(task.id, "next-15-async-params");
        assert_eq!(task.ast_checks.len(), 1);
        assert_eq!(task.reference_solution, "");
    }

    #[test]
    fn rejects_duplicate_criteria_and_bad_weights() {
        let mut task: Task = serde_json::from_str(TASK).unwrap();
        task.rubric[1].name = "awaits_params".to_string();
        assert!(matches!(validate_task(&task), Err(TaskError::Invalid { .. })));

        let mut task: Task = serde_json::from_str(TASK).unwrap();
        task.rubric[0].weight = 1.5;
        assert!(validate_task(&task).is_err());
        task.rubric[0].weight = f64::NAN;
        assert!(validate_task(&task).is_err());
    }

    #[test]
    fn unknown_check_type_is_a_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("task.json");
        std::fs::write(&path, TASK.replace("await_present", "await_maybe")).unwrap();
        assert!(matches!(load_task(&path), Err(TaskError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_io() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            load_task(&tmp.path().join("nope.json")),
            Err(TaskError::Io { .. })
        ));
    }
}
