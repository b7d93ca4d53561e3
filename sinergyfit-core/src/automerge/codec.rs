//! Conversion between JSON values and Automerge objects.
//!
//! Records are serialized with serde into `serde_json::Value` and then written
//! into the collection document field by field: JSON objects become Automerge
//! maps, arrays become lists, everything else a scalar. Reading walks the same
//! structure back.

use automerge::{
    transaction::Transactable, AutoCommit, AutomergeError, ObjId, ObjType, ReadDoc, ScalarValue,
    Value as AmValue,
};
use serde_json::{Map, Number, Value};

enum Shape<'a> {
    Map(&'a Map<String, Value>),
    List(&'a [Value]),
    Scalar(ScalarValue),
}

fn shape(value: &Value) -> Shape<'_> {
    match value {
        Value::Object(map) => Shape::Map(map),
        Value::Array(items) => Shape::List(items),
        Value::Null => Shape::Scalar(ScalarValue::Null),
        Value::Bool(b) => Shape::Scalar(ScalarValue::Boolean(*b)),
        Value::Number(n) => Shape::Scalar(number_to_scalar(n)),
        Value::String(s) => Shape::Scalar(ScalarValue::from(s.as_str())),
    }
}

fn number_to_scalar(n: &Number) -> ScalarValue {
    if let Some(i) = n.as_i64() {
        ScalarValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        ScalarValue::Uint(u)
    } else {
        ScalarValue::F64(n.as_f64().unwrap_or_default())
    }
}

fn scalar_to_json(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Null => Value::Null,
        ScalarValue::Boolean(b) => Value::Bool(*b),
        ScalarValue::Int(i) => Value::from(*i),
        ScalarValue::Uint(u) => Value::from(*u),
        ScalarValue::F64(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        ScalarValue::Str(s) => Value::String(s.to_string()),
        ScalarValue::Timestamp(t) => Value::from(*t),
        _ => Value::Null,
    }
}

/// Writes `value` at `obj[key]`, replacing whatever was there.
pub fn put_json(
    doc: &mut AutoCommit,
    obj: &ObjId,
    key: &str,
    value: &Value,
) -> Result<(), AutomergeError> {
    match shape(value) {
        Shape::Map(map) => {
            let child = doc.put_object(obj, key, ObjType::Map)?;
            write_map(doc, &child, map)
        }
        Shape::List(items) => {
            let child = doc.put_object(obj, key, ObjType::List)?;
            write_list(doc, &child, items)
        }
        Shape::Scalar(scalar) => doc.put(obj, key, scalar),
    }
}

fn insert_json(
    doc: &mut AutoCommit,
    list: &ObjId,
    index: usize,
    value: &Value,
) -> Result<(), AutomergeError> {
    match shape(value) {
        Shape::Map(map) => {
            let child = doc.insert_object(list, index, ObjType::Map)?;
            write_map(doc, &child, map)
        }
        Shape::List(items) => {
            let child = doc.insert_object(list, index, ObjType::List)?;
            write_list(doc, &child, items)
        }
        Shape::Scalar(scalar) => doc.insert(list, index, scalar),
    }
}

fn write_map(
    doc: &mut AutoCommit,
    obj: &ObjId,
    map: &Map<String, Value>,
) -> Result<(), AutomergeError> {
    for (key, value) in map {
        put_json(doc, obj, key, value)?;
    }
    Ok(())
}

fn write_list(doc: &mut AutoCommit, list: &ObjId, items: &[Value]) -> Result<(), AutomergeError> {
    for (i, value) in items.iter().enumerate() {
        insert_json(doc, list, i, value)?;
    }
    Ok(())
}

/// Writes `value` at a nested map path below `obj`.
///
/// Missing intermediate maps are created; an intermediate that holds a
/// scalar is replaced by a map. Only the final field is overwritten, so
/// sibling fields along the path are kept.
pub fn put_path(
    doc: &mut AutoCommit,
    obj: &ObjId,
    path: &[String],
    value: &Value,
) -> Result<(), AutomergeError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };

    let mut current = obj.clone();
    for segment in parents {
        let existing = match doc.get(&current, segment.as_str())? {
            Some((AmValue::Object(ObjType::Map), child)) => Some(child),
            _ => None,
        };
        current = match existing {
            Some(child) => child,
            None => doc.put_object(&current, segment.as_str(), ObjType::Map)?,
        };
    }

    put_json(doc, &current, last, value)
}

/// Reads the value at `obj[key]`, if present.
pub fn get_json(
    doc: &AutoCommit,
    obj: &ObjId,
    key: &str,
) -> Result<Option<Value>, AutomergeError> {
    match doc.get(obj, key)? {
        Some((value, id)) => read_value(doc, value, &id).map(Some),
        None => Ok(None),
    }
}

/// Reads a whole Automerge object (map, list or text) as JSON.
pub fn read_json(doc: &AutoCommit, obj: &ObjId) -> Result<Value, AutomergeError> {
    match doc.object_type(obj)? {
        ObjType::Map | ObjType::Table => {
            let mut map = Map::new();
            for key in doc.keys(obj) {
                if let Some(value) = get_json(doc, obj, &key)? {
                    map.insert(key, value);
                }
            }
            Ok(Value::Object(map))
        }
        ObjType::List => {
            let mut items = Vec::new();
            for i in 0..doc.length(obj) {
                if let Some((value, id)) = doc.get(obj, i)? {
                    items.push(read_value(doc, value, &id)?);
                }
            }
            Ok(Value::Array(items))
        }
        ObjType::Text => Ok(Value::String(doc.text(obj)?)),
    }
}

fn read_value(doc: &AutoCommit, value: AmValue<'_>, id: &ObjId) -> Result<Value, AutomergeError> {
    match value {
        AmValue::Object(_) => read_json(doc, id),
        AmValue::Scalar(scalar) => Ok(scalar_to_json(&scalar)),
    }
}
