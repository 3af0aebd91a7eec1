use serde_json::{Map, Value};
use std::future::Future;

use crate::entity::EntityDescriptor;

const GENERIC_ERROR: &str = "Something went wrong";

/// Editable state for creating or updating one record.
///
/// Holds field values between attempts: a failed save keeps everything
/// the user entered, records the error message for display, and only
/// one save can be outstanding at a time.
pub struct RecordForm {
    descriptor: &'static EntityDescriptor,
    values: Map<String, Value>,
    error: Option<String>,
    submitting: bool,
}

impl RecordForm {
    pub fn new(descriptor: &'static EntityDescriptor) -> Self {
        Self {
            descriptor,
            values: Map::new(),
            error: None,
            submitting: false,
        }
    }

    /// Seed the form for editing; fields outside the descriptor are dropped
    pub fn with_initial(descriptor: &'static EntityDescriptor, initial: &Map<String, Value>) -> Self {
        let mut form = Self::new(descriptor);
        for field in descriptor.fields {
            if let Some(value) = initial.get(field.column) {
                form.values.insert(field.column.to_string(), value.clone());
            }
        }
        form
    }

    /// Set one field. Returns false when the descriptor has no such field.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        if !self.descriptor.fields.iter().any(|f| f.column == field) {
            return false;
        }
        self.values.insert(field.to_string(), Value::String(value.into()));
        true
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit the current values through a caller-supplied save function.
    ///
    /// Returns the saved record on success. Returns None when a save is
    /// already in flight (the call is ignored) or when the save failed;
    /// failure records the error's message and leaves field values
    /// untouched so the user can correct and resubmit.
    pub async fn submit<F, Fut>(&mut self, save: F) -> Option<Value>
    where
        F: FnOnce(Map<String, Value>) -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        if self.submitting {
            return None;
        }

        self.submitting = true;
        self.error = None;

        let result = save(self.values.clone()).await;
        self.submitting = false;

        match result {
            Ok(saved) => Some(saved),
            Err(e) => {
                let message = e.to_string();
                self.error = Some(if message.is_empty() {
                    GENERIC_ERROR.to_string()
                } else {
                    message
                });
                None
            }
        }
    }
}
