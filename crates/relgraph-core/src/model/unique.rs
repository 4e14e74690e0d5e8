use serde::Serialize;

///
/// UniqueModel
///
/// A compound unique key. Single-field uniqueness is a flag on `FieldModel`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UniqueModel {
    pub label: String,
    pub fields: Vec<&'static str>,
}

impl UniqueModel {
    /// Build a key labeled with its members joined by `_`.
    #[must_use]
    pub fn new(fields: &[&'static str]) -> Self {
        Self {
            label: fields.join("_"),
            fields: fields.to_vec(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}
