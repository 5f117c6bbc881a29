//! Core data models for the banking assistant

use serde::{Deserialize, Serialize};

//
// ================= Dataset =================
//

/// A single bank account. Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub balance: f64,
}

/// A single ledger entry. Negative amounts are spend, positive income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub date: String,
    #[serde(default)]
    pub amount: f64,
}

fn default_currency() -> String {
    "NOK".to_string()
}

//
// ================= Tool I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool_name: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
}

//
// ================= Token Usage =================
//

/// Token counts reported by the chat-completions API, summed across
/// all model calls made while answering one query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

//
// ================= Agent Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRunResult {
    pub final_output: String,
    pub tokens: Option<TokenUsage>,
}
