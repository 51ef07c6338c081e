//! Multipart form payloads built from JSON objects.

use serde_json::Value;

/// Text fields of a multipart form, in insertion order.
///
/// Field values are already coerced to strings, so they can be read back
/// before the payload is handed to a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field. Repeated names are kept as separate fields.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style [`append`](Self::append).
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// First value appended under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value appended under `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of fields, repeated names included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(crate) fn into_multipart(self) -> reqwest::multipart::Form {
        self.fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

/// Build a form payload from the fields of a JSON object.
///
/// Fields are appended in object order. Anything other than an object yields an empty payload. Strings are used
/// verbatim, numbers and booleans by their textual form, `null` as `"null"`,
/// and nested arrays or objects as compact JSON.
pub fn build_form_body(data: &Value) -> FormPayload {
    let Value::Object(map) = data else {
        return FormPayload::new();
    };

    let mut form = FormPayload::new();
    for (key, value) in map {
        form.append(key.as_str(), field_text(value));
    }
    form
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
