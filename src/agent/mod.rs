//! Bank assistant agent
//!
//! Wires the banking tools into the chat-completions function-calling
//! loop. The model decides which tools to call and when; this module
//! only dispatches the calls and relays results.

use crate::error::AgentError;
use crate::models::{AgentRunResult, TokenUsage, ToolInput};
use crate::openai::{ChatMessage, OpenAiClient, ToolDef};
use crate::tools::ToolRegistry;
use crate::Result;
use serde_json::json;
use tracing::{debug, info, warn};

/// Default chat model, overridable via OPENAI_CHAT_MODEL.
pub const DEFAULT_MODEL: &str = "gpt-5-mini-2025-08-07";

/// Maximum model round trips per query (defensive guard)
const MAX_TOOL_ROUNDS: usize = 8;

const INSTRUCTIONS: &str = "You are a helpful AI Bank assistant for a Norwegian user. \
     You can: check balances, summarize recent spend, estimate money left, \
     and explain fast loan options. \
     Always be concise, friendly, and include NOK currency. Use tools when needed.";

pub struct BankAgent {
    client: OpenAiClient,
    registry: ToolRegistry,
    model: String,
    tool_defs: Vec<ToolDef>,
}

impl BankAgent {
    pub fn new(client: OpenAiClient, registry: ToolRegistry, model: String) -> Self {
        let tool_defs = registry.tool_defs();
        Self {
            client,
            registry,
            model,
            tool_defs,
        }
    }

    /// Model identifier from the environment, falling back to the
    /// hardcoded default.
    pub fn model_from_env() -> String {
        std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer one free-text query. Runs the model until it produces a
    /// text answer, dispatching any requested tool calls in between.
    pub async fn run(&self, input: &str) -> Result<AgentRunResult> {
        let mut messages = vec![ChatMessage::system(INSTRUCTIONS), ChatMessage::user(input)];
        let mut usage: Option<TokenUsage> = None;

        for round in 0..MAX_TOOL_ROUNDS {
            debug!(round = round + 1, "Agent round");

            let (reply, round_usage) = self
                .client
                .chat(&self.model, &messages, &self.tool_defs)
                .await?;

            if let Some(round_usage) = round_usage {
                usage.get_or_insert_with(TokenUsage::default).add(&round_usage);
            }

            let tool_calls = reply.tool_calls.unwrap_or_default();
            if tool_calls.is_empty() {
                let Some(final_output) = reply.content else {
                    return Err(AgentError::LlmError(
                        "Model returned neither text nor tool calls".to_string(),
                    ));
                };
                info!(rounds = round + 1, "Agent run complete");
                return Ok(AgentRunResult {
                    final_output,
                    tokens: usage,
                });
            }

            messages.push(ChatMessage::assistant_tool_calls(
                reply.content,
                tool_calls.clone(),
            ));

            for call in &tool_calls {
                let result = self.dispatch(&call.function.name, &call.function.arguments).await;
                messages.push(ChatMessage::tool(call.id.clone(), result));
            }
        }

        Err(AgentError::AgentLoopError(format!(
            "No final answer after {} tool rounds",
            MAX_TOOL_ROUNDS
        )))
    }

    /// Execute one tool call and render its result as message content.
    /// Tool failures are relayed to the model as `{error}` text so the
    /// conversation can continue.
    async fn dispatch(&self, name: &str, arguments: &str) -> String {
        let parameters = serde_json::from_str(arguments).unwrap_or_else(|_| json!({}));

        let output = match self.registry.get(name) {
            Some(tool) => {
                debug!(tool = %name, "Dispatching tool call");
                tool.execute(&ToolInput {
                    tool_name: name.to_string(),
                    parameters,
                })
                .await
            }
            None => {
                warn!(tool = %name, "Model requested unregistered tool");
                Err(AgentError::ToolNotFound(name.to_string()))
            }
        };

        match output {
            Ok(output) => output.data.to_string(),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::openai::OpenAiClient;
    use crate::tools::create_default_registry;
    use std::sync::Arc;

    fn test_agent() -> BankAgent {
        let dataset: Dataset = serde_json::from_str(
            r#"{
                "accounts": [{"id": "a1", "name": "Everyday", "currency": "NOK", "balance": 500.0}],
                "transactions": []
            }"#,
        )
        .unwrap();
        let registry = create_default_registry(Arc::new(dataset));
        let client =
            OpenAiClient::with_base_url("test-key".to_string(), "http://localhost:0".to_string());
        BankAgent::new(client, registry, DEFAULT_MODEL.to_string())
    }

    #[test]
    fn test_instructions_mention_nok() {
        assert!(INSTRUCTIONS.contains("NOK"));
        assert!(INSTRUCTIONS.contains("Norwegian"));
    }

    #[test]
    fn test_agent_exposes_all_tools() {
        let agent = test_agent();
        assert_eq!(agent.tool_defs.len(), 5);
        assert_eq!(agent.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_dispatch_known_tool() {
        let agent = test_agent();
        let rendered = agent
            .dispatch("get_balance", r#"{"account_name": "Everyday"}"#)
            .await;
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["balance"], 500.0);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_soft_error() {
        let agent = test_agent();
        let rendered = agent.dispatch("transfer_funds", "{}").await;
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("transfer_funds"));
    }

    #[tokio::test]
    async fn test_dispatch_malformed_arguments_fall_back_to_empty() {
        let agent = test_agent();
        // Unparsable arguments degrade to {} and the tool summarizes.
        let rendered = agent.dispatch("get_balance", "not json").await;
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["total_balance"], 500.0);
    }
}
