use serde_json::Value;

/// Read-only cursor over an untyped JSON payload.
///
/// Every step tolerates a missing key or a value of the wrong shape by
/// becoming an empty view, so lookups like `view.get("a").get("b").str()`
/// never fail and only ever fall back to the caller's default.
#[derive(Debug, Clone, Copy)]
pub struct PayloadView<'a> {
    value: Option<&'a Value>,
}

impl<'a> PayloadView<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value: Some(value) }
    }

    pub fn get(self, key: &str) -> Self {
        Self {
            value: self.value.and_then(|v| v.get(key)),
        }
    }

    pub fn str(self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    pub fn str_or(self, default: &'a str) -> &'a str {
        self.str().unwrap_or(default)
    }

    /// Only a JSON `true` counts; `"true"`, `1` and friends do not.
    pub fn is_true(self) -> bool {
        matches!(self.value, Some(Value::Bool(true)))
    }
}
