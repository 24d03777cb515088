use super::error::{ExtractError, JsonKind};
use serde_json::{Map, Value};
use tracing::debug;

/// Envelope key that paginated APIs put their records under
pub const DATA_KEY: &str = "data";

/// The records found in a document, in document order
///
/// Every record is a JSON object; a scalar or array record cannot be
/// represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Map<String, Value>>,
}

impl RecordSet {
    pub fn new(records: Vec<Map<String, Value>>) -> Self {
        RecordSet { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Map<String, Value>> {
        self.records.iter()
    }

    pub fn into_inner(self) -> Vec<Map<String, Value>> {
        self.records
    }
}

impl IntoIterator for RecordSet {
    type Item = Map<String, Value>;
    type IntoIter = std::vec::IntoIter<Map<String, Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<Map<String, Value>> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Map<String, Value>>>(iter: I) -> Self {
        RecordSet::new(iter.into_iter().collect())
    }
}

/// Detect the records in a parsed JSON document
///
/// Rules are tried in order and the first match wins:
/// 1. an array whose elements are all objects is the record set
/// 2. an object whose `data` value is a non-empty array of objects yields that array
/// 3. any other object is a single record
///
/// Everything else is rejected with [`ExtractError::UnrecognizedShape`].
/// Arrays buried under other keys are never searched for.
pub fn extract(root: Value) -> Result<RecordSet, ExtractError> {
    match root {
        Value::Array(items) => match into_records(items) {
            Some(records) => {
                debug!(records = records.len(), "detected top-level record array");
                Ok(RecordSet::new(records))
            }
            None => Err(ExtractError::UnrecognizedShape(JsonKind::Array)),
        },
        Value::Object(mut obj) => {
            if is_record_array(obj.get(DATA_KEY)) {
                if let Some(Value::Array(items)) = obj.remove(DATA_KEY) {
                    let records = into_records(items).unwrap_or_default();
                    debug!(records = records.len(), "detected `data` envelope");
                    return Ok(RecordSet::new(records));
                }
            }

            debug!("treating top-level object as a single record");
            Ok(RecordSet::new(vec![obj]))
        }
        other => Err(ExtractError::UnrecognizedShape(JsonKind::of(&other))),
    }
}

/// Take the sub-document at `path` so it can be handed to [`extract`]
///
/// `path` is either a JSON Pointer (`/results/items`) or a dotted path
/// (`results.items`). Array elements are addressed by index in both forms.
pub fn select_path(mut root: Value, path: &str) -> Result<Value, ExtractError> {
    let pointer = to_pointer(path);
    match root.pointer_mut(&pointer) {
        Some(selected) => {
            debug!(path, "selected records by path");
            Ok(selected.take())
        }
        None => Err(ExtractError::RecordPathNotFound(path.to_string())),
    }
}

fn to_pointer(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        return path.to_string();
    }

    path.split('.')
        .map(|segment| segment.replace('~', "~0").replace('/', "~1"))
        .fold(String::new(), |mut pointer, segment| {
            pointer.push('/');
            pointer.push_str(&segment);
            pointer
        })
}

/// A non-empty array of objects; an empty `data` page leaves the envelope as one record
fn is_record_array(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_object))
}

/// Unwrap an array into its objects, or `None` if any element is not an object
fn into_records(items: Vec<Value>) -> Option<Vec<Map<String, Value>>> {
    if !items.iter().all(Value::is_object) {
        return None;
    }

    Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect(),
    )
}
