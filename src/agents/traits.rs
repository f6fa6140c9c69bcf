use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured payload for a task entering an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            context: None,
        }
    }

    pub fn with_context(input: impl Into<String>, context: serde_json::Value) -> Self {
        Self {
            input: input.into(),
            context: Some(context),
        }
    }
}

/// Outcome of one submitted task. Failures are values, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub agent: String,
    pub department: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TaskResult {
    pub fn succeeded(
        agent: impl Into<String>,
        department: impl Into<String>,
        output: impl Into<String>,
        tokens_used: u32,
        model: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            agent: agent.into(),
            department: department.into(),
            output: output.into(),
            timestamp: Utc::now(),
            tokens_used: Some(tokens_used),
            model: Some(model.into()),
        }
    }

    pub fn failed(
        agent: impl Into<String>,
        department: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            agent: agent.into(),
            department: department.into(),
            output: output.into(),
            timestamp: Utc::now(),
            tokens_used: None,
            model: None,
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens_used.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub department: String,
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub ai_provider: String,
    pub conversation_length: usize,
    pub status: String,
}

impl AgentStatus {
    /// Ordered key/value pairs for plain-text rendering.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("department", self.department.clone()),
            ("specialty", self.specialty.clone()),
        ];
        if let Some(version) = &self.version {
            fields.push(("version", version.clone()));
        }
        if let Some(company) = &self.company {
            fields.push(("company", company.clone()));
        }
        fields.push(("ai_provider", self.ai_provider.clone()));
        fields.push(("conversation_length", self.conversation_length.to_string()));
        fields.push(("status", self.status.clone()));
        fields
    }
}

#[async_trait]
pub trait AgentBehavior: Send {
    async fn handle(&mut self, request: AgentRequest) -> TaskResult;

    fn reset(&mut self);

    fn status(&self) -> AgentStatus;
}
