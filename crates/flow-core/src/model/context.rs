use std::marker::PhantomData;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{VariableMap, VariableSnapshot};
use crate::errors::VariableError;

/// Contexto de ejecución de una unidad de trabajo (una ejecución de un paso
/// dentro de un flujo).
///
/// Pertenece al runtime y solo se toca desde el hilo transaccional. El tipo
/// es `!Send` a propósito: no puede capturarse en la computación que se
/// envía al pool. Para cruzar la frontera se usa `snapshot()` o un input
/// extraído.
#[derive(Debug)]
pub struct ExecutionContext {
    execution_id: Uuid,
    flow_id: Uuid,
    activity_id: String,
    variables: VariableMap,
    _not_send: PhantomData<Rc<()>>,
}

impl ExecutionContext {
    pub fn new(flow_id: Uuid, activity_id: impl Into<String>) -> Self {
        Self { execution_id: Uuid::new_v4(),
               flow_id,
               activity_id: activity_id.into(),
               variables: VariableMap::new(),
               _not_send: PhantomData }
    }

    /// Variante builder de `set_raw_variable`, útil en tests y demos.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
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

    /// Lee una variable deserializándola al tipo pedido.
    pub fn variable<T: DeserializeOwned>(&self, name: &str) -> Result<T, VariableError> {
        let raw = self.raw_variable(name)
                      .ok_or_else(|| VariableError::Missing(name.to_string()))?;
        serde_json::from_value(raw.clone()).map_err(|e| VariableError::Type { name: name.to_string(),
                                                                              detail: e.to_string() })
    }

    pub fn raw_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Escribe una variable serializando el valor a JSON.
    pub fn set_variable<T: Serialize>(&mut self, name: impl Into<String>, value: T) -> Result<(), VariableError> {
        let name = name.into();
        let value = serde_json::to_value(value).map_err(|e| VariableError::Type { name: name.clone(),
                                                                                   detail: e.to_string() })?;
        self.variables.insert(name, value);
        Ok(())
    }

    pub fn set_raw_variable(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.variables.insert(name.into(), value)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.shift_remove(name)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Copia propia e inmutable del estado actual. Cambios posteriores en el
    /// contexto no son visibles desde el snapshot.
    pub fn snapshot(&self) -> VariableSnapshot {
        VariableSnapshot::new(self.execution_id, self.flow_id, self.activity_id.clone(), self.variables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_read_and_write() {
        let mut ctx = ExecutionContext::new(Uuid::new_v4(), "calc");
        ctx.set_variable("amount", 7_i64).unwrap();
        assert_eq!(ctx.variable::<i64>("amount").unwrap(), 7);
        assert!(ctx.has_variable("amount"));
    }

    #[test]
    fn missing_and_mistyped_variables() {
        let ctx = ExecutionContext::new(Uuid::new_v4(), "calc").with_variable("name", json!("x"));
        assert_eq!(ctx.variable::<i64>("nope"), Err(VariableError::Missing("nope".into())));
        assert!(matches!(ctx.variable::<i64>("name"), Err(VariableError::Type { .. })));
    }

    #[test]
    fn snapshot_does_not_alias() {
        let mut ctx = ExecutionContext::new(Uuid::new_v4(), "calc").with_variable("a", json!(1));
        let snap = ctx.snapshot();
        ctx.set_raw_variable("a", json!(2));
        ctx.remove_variable("a");
        assert_eq!(snap.get("a"), Some(&json!(1)));
        assert_eq!(snap.execution_id(), ctx.execution_id());
    }

    #[test]
    fn variable_order_is_insertion_order() {
        let ctx = ExecutionContext::new(Uuid::new_v4(), "calc").with_variable("b", json!(1))
                                                              .with_variable("a", json!(2));
        let names: Vec<&str> = ctx.variable_names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
