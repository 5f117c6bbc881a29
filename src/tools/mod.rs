//! Tool trait and registry
//!
//! Tools are deterministic, side-effect-free queries over the shared
//! banking dataset. Expected misses (unknown account name) come back
//! as structured `{error: ...}` payloads, never as `Err`, so the
//! agent runtime can relay them to the model as text.

use crate::dataset::Dataset;
use crate::error::AgentError;
use crate::models::{ToolInput, ToolOutput, Transaction};
use crate::openai::ToolDef;
use crate::Result;
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Most transactions a single `recent_spend` reply will carry.
const MAX_TRANSACTIONS_RETURNED: usize = 20;

/// Fixed APRs quoted by `quick_loan_options`.
const LOAN_APRS: [f64; 3] = [0.079, 0.099, 0.129];

/// Trait for a single tool (deterministic execution)
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema for the tool's parameters, handed to the model as
    /// part of the function definition.
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.order.push(tool.name().to_string());
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Function definitions for the chat-completions request, in
    /// registration order.
    pub fn tool_defs(&self) -> Vec<ToolDef> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDef::function(tool.name(), tool.description(), tool.parameters_schema()))
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_object_parameters(input: &ToolInput) -> Result<()> {
    if input.parameters.is_object() {
        Ok(())
    } else {
        Err(AgentError::InvalidToolInput(
            "tool_input must be a JSON object".to_string(),
        ))
    }
}

fn optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn ok_output(data: Value) -> ToolOutput {
    ToolOutput {
        success: true,
        data,
        error: None,
    }
}

//
// ================= Query Functions =================
//
// Pure functions over the dataset. The tool structs below are thin
// parameter-parsing wrappers so these stay directly testable.
//

/// Balance for one account by name, or a summary across all accounts
/// when no name is given. Unknown names yield `{error: ...}`.
pub fn balance_summary(dataset: &Dataset, account_name: Option<&str>) -> Value {
    if let Some(name) = account_name {
        return match dataset.account_by_name(name) {
            Some(account) => json!({
                "account": account.name,
                "balance": account.balance,
                "currency": account.currency,
            }),
            None => json!({
                "error": format!("Account '{}' not found", name),
            }),
        };
    }

    let total: f64 = dataset.accounts.iter().map(|a| a.balance).sum();
    json!({
        "total_balance": total,
        "currency": "NOK",
        "accounts": &dataset.accounts,
    })
}

/// Total spend (negative transactions) since `now - days`, optionally
/// filtered by account name.
///
/// An unknown account name resolves to no target id, so the filter
/// silently falls back to all accounts. Unparsable dates are skipped
/// per item. Spend sums every match; the reply carries at most the
/// first 20 matching transactions in original order.
pub fn spend_summary(
    dataset: &Dataset,
    days: i64,
    account_name: Option<&str>,
    now: NaiveDate,
) -> Value {
    // Window arithmetic can leave the representable date range for
    // extreme `days`; a huge look-back includes every valid date, a
    // huge future cutoff excludes everything.
    let cutoff = match Duration::try_days(days).and_then(|w| now.checked_sub_signed(w)) {
        Some(cutoff) => cutoff,
        None if days >= 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    };
    let target_id = account_name
        .and_then(|name| dataset.account_by_name(name))
        .map(|a| a.id.clone());

    let mut spend = 0.0;
    let mut items: Vec<&Transaction> = Vec::new();
    for t in &dataset.transactions {
        if let Some(id) = &target_id {
            if &t.account_id != id {
                continue;
            }
        }
        let Ok(date) = NaiveDate::parse_from_str(&t.date, "%Y-%m-%d") else {
            continue;
        };
        if date >= cutoff && t.amount < 0.0 {
            spend += -t.amount;
            items.push(t);
        }
    }
    items.truncate(MAX_TRANSACTIONS_RETURNED);

    json!({
        "days": days,
        "spend": round2(spend),
        "currency": "NOK",
        "transactions": items,
    })
}

/// Mock quick-loan quotes: one annuity offer per fixed APR.
///
/// A zero `term_months` makes the annuity denominator zero and the
/// payments non-finite; the original service has the same unguarded
/// division and stakeholders have been flagged, so it stays as-is.
pub fn loan_options(amount: f64, term_months: i64) -> Value {
    let offers: Vec<Value> = LOAN_APRS
        .iter()
        .map(|&apr| {
            let monthly_rate = apr / 12.0;
            let growth = (1.0 + monthly_rate).powi(term_months as i32);
            let payment = amount * (monthly_rate * growth) / (growth - 1.0);
            let monthly_payment = round2(payment);
            json!({
                "provider": format!("AI Bank {} bps", (apr * 1000.0) as i64),
                "apr": round2(apr * 100.0),
                "monthly_payment": monthly_payment,
                "term_months": term_months,
                "total_payment": round2(monthly_payment * term_months as f64),
            })
        })
        .collect();

    json!({
        "amount": amount,
        "term_months": term_months,
        "currency": "NOK",
        "offers": offers,
    })
}

//
// ================= Tools =================
//

pub struct ListAccountsTool {
    dataset: Arc<Dataset>,
}

#[async_trait::async_trait]
impl Tool for ListAccountsTool {
    fn name(&self) -> &'static str {
        "list_accounts"
    }

    fn description(&self) -> &'static str {
        "Return all bank accounts with id, name, currency, and balance"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false,
        })
    }

    async fn execute(&self, _input: &ToolInput) -> Result<ToolOutput> {
        Ok(ok_output(json!(&self.dataset.accounts)))
    }
}

pub struct GetBalanceTool {
    dataset: Arc<Dataset>,
}

#[async_trait::async_trait]
impl Tool for GetBalanceTool {
    fn name(&self) -> &'static str {
        "get_balance"
    }

    fn description(&self) -> &'static str {
        "Get balance for an account by name (e.g. 'Everyday', 'Savings'). \
         If not provided, return a summary across accounts"
    }

    fn parameters_schema(&self) -> Value {
        account_name_schema()
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        ensure_object_parameters(input)?;
        let account_name = optional_str(&input.parameters, "account_name");
        Ok(ok_output(balance_summary(
            &self.dataset,
            account_name.as_deref(),
        )))
    }
}

pub struct RecentSpendTool {
    dataset: Arc<Dataset>,
}

#[async_trait::async_trait]
impl Tool for RecentSpendTool {
    fn name(&self) -> &'static str {
        "recent_spend"
    }

    fn description(&self) -> &'static str {
        "Calculate total spend (negative transactions) in the last N days. \
         Optionally filter by account name"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "description": "Window size in calendar days (default 30)",
                },
                "account_name": {
                    "type": "string",
                    "description": "Account display name, matched case-insensitively",
                },
            },
            "additionalProperties": false,
        })
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        ensure_object_parameters(input)?;
        let days = input
            .parameters
            .get("days")
            .and_then(|v| v.as_i64())
            .unwrap_or(30);
        let account_name = optional_str(&input.parameters, "account_name");
        Ok(ok_output(spend_summary(
            &self.dataset,
            days,
            account_name.as_deref(),
            Local::now().date_naive(),
        )))
    }
}

/// Alias for `get_balance`; the model sometimes asks "how much money
/// do I have left" and picks this by name.
pub struct MoneyLeftTool {
    dataset: Arc<Dataset>,
}

#[async_trait::async_trait]
impl Tool for MoneyLeftTool {
    fn name(&self) -> &'static str {
        "money_left"
    }

    fn description(&self) -> &'static str {
        "Alias for current available balance. Optionally filter by account name; \
         otherwise summarize"
    }

    fn parameters_schema(&self) -> Value {
        account_name_schema()
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        ensure_object_parameters(input)?;
        let account_name = optional_str(&input.parameters, "account_name");
        Ok(ok_output(balance_summary(
            &self.dataset,
            account_name.as_deref(),
        )))
    }
}

pub struct QuickLoanOptionsTool;

#[async_trait::async_trait]
impl Tool for QuickLoanOptionsTool {
    fn name(&self) -> &'static str {
        "quick_loan_options"
    }

    fn description(&self) -> &'static str {
        "Return mock quick loan options for an amount and term. \
         Non-binding informational quotes"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Principal in NOK (default 50000)",
                },
                "term_months": {
                    "type": "integer",
                    "description": "Repayment term in months (default 24)",
                },
            },
            "additionalProperties": false,
        })
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        ensure_object_parameters(input)?;
        let amount = input
            .parameters
            .get("amount")
            .and_then(|v| v.as_f64())
            .unwrap_or(50_000.0);
        let term_months = input
            .parameters
            .get("term_months")
            .and_then(|v| v.as_i64())
            .unwrap_or(24);
        Ok(ok_output(loan_options(amount, term_months)))
    }
}

fn account_name_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "account_name": {
                "type": "string",
                "description": "Account display name, matched case-insensitively",
            },
        },
        "additionalProperties": false,
    })
}

/// Create the default registry with all banking tools over the shared
/// dataset.
pub fn create_default_registry(dataset: Arc<Dataset>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(ListAccountsTool {
        dataset: dataset.clone(),
    }));
    registry.register(Arc::new(GetBalanceTool {
        dataset: dataset.clone(),
    }));
    registry.register(Arc::new(RecentSpendTool {
        dataset: dataset.clone(),
    }));
    registry.register(Arc::new(MoneyLeftTool { dataset }));
    registry.register(Arc::new(QuickLoanOptionsTool));

    registry
}
