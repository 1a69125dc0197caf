use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::VariableError;

/// Variables con nombre, en orden de inserción.
pub type VariableMap = IndexMap<String, Value>;

/// Vista de solo lectura de un `ExecutionContext`, propia y `Send`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    execution_id: Uuid,
    flow_id: Uuid,
    activity_id: String,
    variables: VariableMap,
}

impl VariableSnapshot {
    pub(crate) fn new(execution_id: Uuid, flow_id: Uuid, activity_id: String, variables: VariableMap) -> Self {
        Self { execution_id,
               flow_id,
               activity_id,
               variables }
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn variable<T: DeserializeOwned>(&self, name: &str) -> Result<T, VariableError> {
        let raw = self.get(name).ok_or_else(|| VariableError::Missing(name.to_string()))?;
        serde_json::from_value(raw.clone()).map_err(|e| VariableError::Type { name: name.to_string(),
                                                                              detail: e.to_string() })
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }
}
