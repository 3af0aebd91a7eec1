use serde_json::Value;
use std::collections::HashMap;

/// Columns managed by the database, never accepted from API input
pub const SYSTEM_COLUMNS: &[&str] = &["id", "user_id", "created_at", "updated_at"];

/// The closed set of record collections served by this API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Build,
    Signal,
    Private,
    Privacy,
    Key,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub column: &'static str,
    pub required: bool,
}

/// Static description of one collection: where it lives and what it accepts
#[derive(Debug)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// URL path segment, table name and dashboard href all share this
    pub collection: &'static str,
    pub display: &'static str,
    pub fields: &'static [FieldSpec],
}

static BUILD: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Build,
    collection: "builds",
    display: "Builds",
    fields: &[
        FieldSpec { column: "version", required: true },
        FieldSpec { column: "notes", required: false },
    ],
};

static SIGNAL: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Signal,
    collection: "signals",
    display: "Signals",
    fields: &[
        FieldSpec { column: "name", required: true },
        FieldSpec { column: "source", required: false },
    ],
};

static PRIVATE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Private,
    collection: "privates",
    display: "Privates",
    fields: &[
        FieldSpec { column: "label", required: true },
        FieldSpec { column: "body", required: false },
    ],
};

static PRIVACY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Privacy,
    collection: "privacys",
    display: "Privacys",
    fields: &[
        FieldSpec { column: "title", required: true },
        FieldSpec { column: "policy", required: false },
    ],
};

static KEY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Key,
    collection: "keys",
    display: "Keys",
    fields: &[
        FieldSpec { column: "name", required: true },
        FieldSpec { column: "fingerprint", required: false },
    ],
};

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Build,
        EntityKind::Signal,
        EntityKind::Private,
        EntityKind::Privacy,
        EntityKind::Key,
    ];

    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Build => &BUILD,
            EntityKind::Signal => &SIGNAL,
            EntityKind::Private => &PRIVATE,
            EntityKind::Privacy => &PRIVACY,
            EntityKind::Key => &KEY,
        }
    }

    /// Resolve a URL collection segment against the registry
    pub fn from_collection(segment: &str) -> Option<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.descriptor().collection == segment)
    }
}

/// Failed validation with per-field detail for the 400 response body
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }
}

/// Validated field values in descriptor order, ready to bind as parameters
pub type ValidatedFields = Vec<(&'static str, String)>;

impl EntityDescriptor {
    /// Validate input for record creation. Every required field must be
    /// present and non-empty; unknown fields (including system columns)
    /// are rejected.
    pub fn validate_create(&self, input: &Value) -> Result<ValidatedFields, ValidationFailure> {
        self.validate(input, true)
    }

    /// Validate a partial update. Provided fields follow the same
    /// per-field rules; at least one recognized field is required.
    pub fn validate_update(&self, input: &Value) -> Result<ValidatedFields, ValidationFailure> {
        self.validate(input, false)
    }

    fn validate(&self, input: &Value, create: bool) -> Result<ValidatedFields, ValidationFailure> {
        let map = match input {
            Value::Object(map) => map,
            _ => return Err(ValidationFailure::new("Expected a JSON object")),
        };

        let mut failure = ValidationFailure::new("Invalid input");
        let mut validated: ValidatedFields = Vec::new();

        for key in map.keys() {
            if SYSTEM_COLUMNS.contains(&key.as_str()) {
                failure
                    .field_errors
                    .insert(key.clone(), "System field cannot be set".to_string());
            } else if !self.fields.iter().any(|f| f.column == key) {
                failure
                    .field_errors
                    .insert(key.clone(), "Unknown field".to_string());
            }
        }

        for field in self.fields {
            match map.get(field.column) {
                Some(Value::String(s)) => {
                    if field.required && s.trim().is_empty() {
                        failure
                            .field_errors
                            .insert(field.column.to_string(), "Must not be empty".to_string());
                    } else {
                        validated.push((field.column, s.clone()));
                    }
                }
                Some(_) => {
                    failure
                        .field_errors
                        .insert(field.column.to_string(), "Must be a string".to_string());
                }
                None => {
                    if create && field.required {
                        failure
                            .field_errors
                            .insert(field.column.to_string(), "This field is required".to_string());
                    }
                }
            }
        }

        if !failure.field_errors.is_empty() {
            return Err(failure);
        }

        if !create && validated.is_empty() {
            return Err(ValidationFailure::new("No recognized fields to update"));
        }

        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_lookup_is_closed() {
        assert_eq!(EntityKind::from_collection("builds"), Some(EntityKind::Build));
        assert_eq!(EntityKind::from_collection("keys"), Some(EntityKind::Key));
        assert_eq!(EntityKind::from_collection("widgets"), None);
        assert_eq!(EntityKind::from_collection("users"), None);
    }

    #[test]
    fn create_accepts_required_and_optional_fields() {
        let fields = BUILD
            .validate_create(&json!({"version": "1.2.3", "notes": "first cut"}))
            .unwrap();
        assert_eq!(
            fields,
            vec![("version", "1.2.3".to_string()), ("notes", "first cut".to_string())]
        );
    }

    #[test]
    fn create_requires_required_fields() {
        let err = BUILD.validate_create(&json!({"notes": "no version"})).unwrap_err();
        assert_eq!(err.field_errors.get("version").unwrap(), "This field is required");
    }

    #[test]
    fn create_rejects_empty_required_field() {
        let err = BUILD.validate_create(&json!({"version": ""})).unwrap_err();
        assert_eq!(err.field_errors.get("version").unwrap(), "Must not be empty");
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let err = BUILD
            .validate_create(&json!({"version": "1.0", "color": "red"}))
            .unwrap_err();
        assert_eq!(err.field_errors.get("color").unwrap(), "Unknown field");
    }

    #[test]
    fn system_columns_are_rejected() {
        let err = BUILD
            .validate_create(&json!({"version": "1.0", "user_id": "someone-else"}))
            .unwrap_err();
        assert_eq!(err.field_errors.get("user_id").unwrap(), "System field cannot be set");
    }

    #[test]
    fn update_accepts_partial_input() {
        let fields = SIGNAL.validate_update(&json!({"source": "sensor-7"})).unwrap();
        assert_eq!(fields, vec![("source", "sensor-7".to_string())]);
    }

    #[test]
    fn update_rejects_empty_payload() {
        let err = SIGNAL.validate_update(&json!({})).unwrap_err();
        assert_eq!(err.message, "No recognized fields to update");
    }

    #[test]
    fn update_rejects_blanking_a_required_field() {
        let err = KEY.validate_update(&json!({"name": "  "})).unwrap_err();
        assert_eq!(err.field_errors.get("name").unwrap(), "Must not be empty");
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = BUILD.validate_create(&json!({"version": 3})).unwrap_err();
        assert_eq!(err.field_errors.get("version").unwrap(), "Must be a string");
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert!(BUILD.validate_create(&json!(["version"])).is_err());
        assert!(BUILD.validate_update(&json!("version")).is_err());
    }
}
