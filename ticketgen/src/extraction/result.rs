//! Loosely-typed view over the model's extraction output.
//!
//! The model is asked for an `{"epics": [...]}` hierarchy, but nothing enforces that shape. The
//! result is kept as the raw JSON object and echoed back untouched; the accessors here only read
//! it, returning `None` or empty slices where a field is missing or has an unexpected type.

use super::recover::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level object recovered from the model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(JsonObject);

impl ExtractionResult {
    pub fn new(object: JsonObject) -> Self {
        Self(object)
    }

    /// The `epics` array, if present and actually an array.
    pub fn epics(&self) -> Option<&[Value]> {
        self.0.get("epics").and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn epic_count(&self) -> usize {
        self.epics().map_or(0, <[Value]>::len)
    }

    pub fn epic_views(&self) -> impl Iterator<Item = Epic<'_>> {
        self.epics().unwrap_or_default().iter().map(Epic)
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

/// Top-level work item.
#[derive(Debug, Clone, Copy)]
pub struct Epic<'a>(&'a Value);

impl<'a> Epic<'a> {
    pub fn summary(&self) -> Option<&'a str> {
        str_field(self.0, "summary")
    }

    /// `FUNCTIONAL` or `NON-FUNCTIONAL` by convention; not checked.
    pub fn category(&self) -> Option<&'a str> {
        str_field(self.0, "category")
    }

    /// Models emit this as either a string or a number.
    pub fn epic_number(&self) -> Option<&'a Value> {
        self.0.get("epicNumber")
    }

    pub fn stories(&self) -> impl Iterator<Item = Story<'a>> + use<'a> {
        array_field(self.0, "stories").iter().map(Story)
    }

    pub fn story_count(&self) -> usize {
        array_field(self.0, "stories").len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Story<'a>(&'a Value);

impl<'a> Story<'a> {
    pub fn summary(&self) -> Option<&'a str> {
        str_field(self.0, "summary")
    }

    pub fn priority(&self) -> Option<&'a str> {
        str_field(self.0, "priority")
    }

    pub fn story_number(&self) -> Option<&'a Value> {
        self.0.get("storyNumber")
    }

    pub fn subtasks(&self) -> impl Iterator<Item = Subtask<'a>> + use<'a> {
        array_field(self.0, "subtasks").iter().map(Subtask)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Subtask<'a>(&'a Value);

impl<'a> Subtask<'a> {
    pub fn summary(&self) -> Option<&'a str> {
        str_field(self.0, "summary")
    }

    pub fn subtask_number(&self) -> Option<&'a Value> {
        self.0.get("subtaskNumber")
    }
}
