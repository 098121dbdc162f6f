//! Dotted-path patch application over JSON documents.

use serde_json::{Map, Value};

use crate::domain::ports::{DocumentPatch, FieldPatch, FieldPath, Precondition};

/// Reason a patch could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatchFailure {
    Precondition(FieldPath),
    Invalid(String),
}

fn invalid(path: &FieldPath, reason: &str) -> PatchFailure {
    PatchFailure::Invalid(format!("{path}: {reason}"))
}

/// Read the value at `path`, if every segment resolves through a map.
pub(crate) fn lookup<'a>(document: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}

/// Resolve the slot at `path`, creating intermediate maps and a `null` leaf.
fn slot<'a>(document: &'a mut Value, path: &FieldPath) -> Result<&'a mut Value, PatchFailure> {
    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(PatchFailure::Invalid("field path is empty".to_owned()));
    };
    if path.segments().iter().any(|s| s.is_empty() || s.contains('.')) {
        return Err(invalid(path, "segments must be non-empty and dot-free"));
    }

    let mut current = document;
    for segment in parents {
        current = current
            .as_object_mut()
            .ok_or_else(|| invalid(path, "parent is not a map"))?
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(current
        .as_object_mut()
        .ok_or_else(|| invalid(path, "parent is not a map"))?
        .entry(leaf.clone())
        .or_insert(Value::Null))
}

fn apply_operation(
    document: &mut Value,
    operation: &FieldPatch,
    now: &Value,
) -> Result<(), PatchFailure> {
    match operation {
        FieldPatch::Set { path, value } => *slot(document, path)? = value.clone(),
        FieldPatch::ServerTimestamp { path } => *slot(document, path)? = now.clone(),
        FieldPatch::Increment { path, by } => {
            let target = slot(document, path)?;
            let current = match target {
                Value::Null => 0,
                Value::Number(n) => n
                    .as_i64()
                    .ok_or_else(|| invalid(path, "not an integer"))?,
                _ => return Err(invalid(path, "not a number")),
            };
            let next = current
                .checked_add(*by)
                .ok_or_else(|| invalid(path, "increment overflows"))?;
            *target = Value::from(next);
        }
        FieldPatch::Append { path, value } => {
            let target = slot(document, path)?;
            if target.is_null() {
                *target = Value::Array(Vec::new());
            }
            target
                .as_array_mut()
                .ok_or_else(|| invalid(path, "not an array"))?
                .push(value.clone());
        }
    }
    Ok(())
}

/// Apply `patch` to a copy of `document`, returning the patched copy.
///
/// Preconditions are checked first; the input document is untouched on failure.
pub(crate) fn apply_patch(
    document: &Value,
    patch: &DocumentPatch,
    now: &Value,
) -> Result<Value, PatchFailure> {
    for precondition in patch.preconditions() {
        let Precondition::Exists(path) = precondition;
        if lookup(document, path).is_none_or(Value::is_null) {
            return Err(PatchFailure::Precondition(path.clone()));
        }
    }

    let mut patched = document.clone();
    for operation in patch.operations() {
        apply_operation(&mut patched, operation, now)?;
    }
    Ok(patched)
}
