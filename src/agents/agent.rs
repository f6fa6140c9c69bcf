use serde_json::Value;
use tracing::{error, info, instrument};

use crate::llm_client::{CompletionRequest, SharedLlmClient};

use super::history::ConversationHistory;
use super::persona::Persona;
use super::traits::{AgentStatus, TaskResult};

/// Persona-bound wrapper around the LLM client plus its exchange history.
pub struct PersonaAgent {
    persona: Persona,
    llm_client: SharedLlmClient,
    history: ConversationHistory,
}

impl PersonaAgent {
    pub fn new(persona: Persona, llm_client: SharedLlmClient, history_limit: Option<usize>) -> Self {
        info!(
            agent = %persona.name,
            specialty = %persona.specialty,
            history_limit = ?history_limit,
            "Agent initialized"
        );

        Self {
            persona,
            llm_client,
            history: ConversationHistory::with_limit(history_limit),
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    #[cfg(test)]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Send the task plus accumulated history. History only changes on success.
    #[instrument(skip_all, fields(agent = %self.persona.name, turns = self.history.len()))]
    pub async fn submit(&mut self, task: &str, context: Option<&Value>) -> TaskResult {
        let composed = compose_task(task, context);
        let request = CompletionRequest {
            system: self.persona.system_prompt.clone(),
            messages: self.history.with_pending(&composed),
            max_tokens: self.persona.max_tokens,
        };

        match self.llm_client.complete(&request).await {
            Ok(completion) => {
                let tokens = completion.usage.total();
                self.history
                    .record_exchange(composed, completion.text.clone());
                TaskResult::succeeded(
                    &self.persona.name,
                    &self.persona.department,
                    completion.text,
                    tokens,
                    completion.model,
                )
            }
            Err(err) => {
                let message = format!("{}: {err:#}", self.persona.error_prefix);
                error!(agent = %self.persona.name, "{message}");
                TaskResult::failed(&self.persona.name, &self.persona.department, message)
            }
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
        info!(agent = %self.persona.name, "Conversation history cleared");
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            name: self.persona.name.clone(),
            department: self.persona.department.clone(),
            specialty: self.persona.specialty.clone(),
            version: self.persona.version.clone(),
            company: self.persona.company.clone(),
            ai_provider: self.llm_client.provider_label().to_string(),
            conversation_length: self.history.len(),
            status: "operational".to_string(),
        }
    }
}

fn compose_task(task: &str, context: Option<&Value>) -> String {
    let Some(context) = context.filter(|ctx| !ctx.is_null()) else {
        return task.to_string();
    };

    let rendered = match context {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    format!("{task}\n\nAdditional Context:\n{rendered}")
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::test_support::ScriptedLlmClient;
    use super::*;
    use crate::config::AppConfig;
    use crate::llm_client::Role;

    fn pulse_agent(client: SharedLlmClient) -> PersonaAgent {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        PersonaAgent::new(Persona::pulse(&AppConfig::default(), today), client, None)
    }

    #[tokio::test]
    async fn hello_on_fresh_agent_records_one_exchange() {
        let mut agent = pulse_agent(ScriptedLlmClient::always("PULSE operational.", 1));

        let result = agent.submit("hello", None).await;

        assert!(result.success);
        assert!(!result.output.is_empty());
        assert_eq!(result.tokens_used, Some(15));
        assert_eq!(result.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(agent.history().len(), 2);
        assert_eq!(agent.status().conversation_length, 2);
    }

    #[tokio::test]
    async fn history_is_two_turns_per_successful_call() {
        let client = ScriptedLlmClient::always("ok", 4);
        let mut agent = pulse_agent(client.clone());

        for n in 1..=4 {
            agent.submit(&format!("task {n}"), None).await;
            assert_eq!(agent.history().len(), 2 * n);
        }

        let requests = client.recorded();
        assert_eq!(requests[3].messages.len(), 7);
        assert_eq!(requests[3].messages[6].content, "task 4");
        assert_eq!(requests[3].max_tokens, 4096);
        assert!(requests[3].system.contains("PULSE"));
    }

    #[tokio::test]
    async fn failed_call_returns_record_and_leaves_history_untouched() {
        let client = ScriptedLlmClient::new(vec![Ok("first"), Err("rate limited"), Ok("third")]);
        let mut agent = pulse_agent(client);

        assert!(agent.submit("one", None).await.success);
        let failed = agent.submit("two", None).await;

        assert!(!failed.success);
        assert_eq!(failed.output, "Error processing request: rate limited");
        assert!(failed.tokens_used.is_none());
        assert!(failed.model.is_none());
        assert_eq!(agent.history().len(), 2);

        assert!(agent.submit("three", None).await.success);
        let turns = agent.history().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].content, "three");
        assert_eq!(turns[2].role, Role::User);
    }

    #[tokio::test]
    async fn reset_then_status_reports_empty_history() {
        let mut agent = pulse_agent(ScriptedLlmClient::always("ok", 2));
        agent.submit("a", None).await;
        agent.submit("b", None).await;

        agent.reset();
        let status = agent.status();

        assert_eq!(status.conversation_length, 0);
        assert_eq!(status.status, "operational");
        assert_eq!(status.version.as_deref(), Some("0.1.0"));
        assert_eq!(status.company.as_deref(), Some("Beechwood Corporation"));
        assert_eq!(status.ai_provider, "Scripted");
    }

    #[tokio::test]
    async fn context_is_appended_to_the_user_turn() {
        let client = ScriptedLlmClient::always("ok", 1);
        let mut agent = pulse_agent(client.clone());

        agent
            .submit("Plan the sprint", Some(&json!({"team": "beacon"})))
            .await;

        let sent = &client.recorded()[0].messages[0].content;
        assert!(sent.starts_with("Plan the sprint\n\nAdditional Context:\n"));
        assert!(sent.contains("\"team\": \"beacon\""));
        assert_eq!(&agent.history().turns()[0].content, sent);
    }

    #[test]
    fn null_or_missing_context_leaves_task_unchanged() {
        assert_eq!(compose_task("hi", None), "hi");
        assert_eq!(compose_task("hi", Some(&Value::Null)), "hi");
        assert_eq!(
            compose_task("hi", Some(&json!("raw notes"))),
            "hi\n\nAdditional Context:\nraw notes"
        );
    }
}
