//! Plain functions over the `serde_json::Value` tree the actor owns.

use serde_json::{Map, Number, Value};

use super::error::StoreError;
use super::path::Path;

pub fn get<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Full-node write. Intermediate objects are created as needed; an
/// intermediate that exists but is not an object is an error.
pub fn set(root: &mut Value, path: &Path, value: Value) -> Result<(), StoreError> {
    if path.is_root() {
        *root = value;
        return Ok(());
    }
    let (obj, key) = parent_object(root, path, true)?;
    obj.insert(key, value);
    Ok(())
}

/// Partial-field merge into the object at `path`, creating it if absent.
pub fn merge(
    root: &mut Value,
    path: &Path,
    fields: Map<String, Value>,
) -> Result<(), StoreError> {
    if get(root, path).is_none() {
        set(root, path, Value::Object(Map::new()))?;
    }
    let node = get_mut(root, path).ok_or_else(|| StoreError::NotFound(path.clone()))?;
    let obj = node
        .as_object_mut()
        .ok_or_else(|| StoreError::NotAnObject(path.clone()))?;
    for (key, value) in fields {
        obj.insert(key, value);
    }
    Ok(())
}

pub fn remove(root: &mut Value, path: &Path) -> Result<(), StoreError> {
    if path.is_root() {
        *root = Value::Object(Map::new());
        return Ok(());
    }
    let (obj, key) = parent_object(root, path, false)?;
    obj.remove(&key)
        .map(|_| ())
        .ok_or_else(|| StoreError::NotFound(path.clone()))
}

pub fn number_at(root: &Value, path: &Path) -> Result<f64, StoreError> {
    let node = get(root, path).ok_or_else(|| StoreError::NotFound(path.clone()))?;
    node.as_f64().ok_or_else(|| StoreError::NotANumber(path.clone()))
}

/// Adds `delta` to the number at `path`. Integer-valued results are stored
/// as JSON integers so counters (stock, points) survive round trips.
pub fn add_number(root: &mut Value, path: &Path, delta: f64) -> Result<(), StoreError> {
    let current = number_at(root, path)?;
    let next = current + delta;
    let number = if next.fract() == 0.0 && next.abs() <= i64::MAX as f64 {
        Number::from(next as i64)
    } else {
        Number::from_f64(next).ok_or_else(|| StoreError::NotANumber(path.clone()))?
    };
    let node = get_mut(root, path).ok_or_else(|| StoreError::NotFound(path.clone()))?;
    *node = Value::Number(number);
    Ok(())
}

fn get_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object_mut()?.get_mut(segment)?;
    }
    Some(node)
}

/// Walks to the parent of a non-root `path`, returning the parent object
/// and the final key.
fn parent_object<'a>(
    root: &'a mut Value,
    path: &Path,
    create_missing: bool,
) -> Result<(&'a mut Map<String, Value>, String), StoreError> {
    let (last, ancestors) = path
        .segments()
        .split_last()
        .ok_or_else(|| StoreError::NotFound(path.clone()))?;

    let mut node = root;
    let mut walked = Path::root();
    for segment in ancestors {
        walked = walked.child(segment.clone());
        let obj = node
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAnObject(walked.clone()))?;
        if !obj.contains_key(segment) {
            if create_missing {
                obj.insert(segment.clone(), Value::Object(Map::new()));
            } else {
                return Err(StoreError::NotFound(path.clone()));
            }
        }
        node = obj
            .get_mut(segment)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
    }

    let obj = node
        .as_object_mut()
        .ok_or_else(|| StoreError::NotAnObject(walked))?;
    Ok((obj, last.clone()))
}
