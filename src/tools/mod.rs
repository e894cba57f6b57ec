use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

pub mod builtin;

/// An action the LLM can invoke.
///
/// Implementations declare a typed parameter struct (`Deserialize` +
/// `JsonSchema`), expose its schema to the model, and deserialize their
/// arguments into it before doing anything — malformed arguments fail
/// validation instead of reaching the handler body.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, params: Value) -> anyhow::Result<Value>;
}

/// Derive a JSON schema for a tool's parameter struct.
pub fn schema_of<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| Value::Null)
}

/// Deserialize tool arguments into their typed form, with a readable error
/// for the model to correct itself on.
pub fn typed_params<T: serde::de::DeserializeOwned>(params: Value) -> anyhow::Result<T> {
    serde_json::from_value(params).map_err(|e| anyhow::anyhow!("Invalid tool arguments: {e}"))
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn get_definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, params: Value) -> anyhow::Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Tool not found: {}", name))?;

        let result = tool.execute(params).await;
        match &result {
            Ok(v) => debug!("Tool {} returned: {}", name, v),
            Err(e) => error!("Tool {} failed: {}", name, e),
        }
        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct EchoParams {
        text: String,
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters_schema(&self) -> Value {
            schema_of::<EchoParams>()
        }

        async fn execute(&self, params: Value) -> anyhow::Result<Value> {
            let params: EchoParams = typed_params(params)?;
            Ok(serde_json::json!({ "result": params.text }))
        }
    }

    #[tokio::test]
    async fn registry_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry
            .execute("echo", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(result["result"], "hi");

        assert!(registry
            .execute("missing", serde_json::json!({}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn malformed_arguments_fail_validation() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry
            .execute("echo", serde_json::json!({"wrong_field": 1}))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn definitions_carry_schemas() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let defs = registry.get_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0]["function"]["name"], "echo");
        assert!(defs[0]["function"]["parameters"].is_object());
    }
}
