use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::instrument;

use crate::config::AppConfig;
use crate::llm_client::SharedLlmClient;

use super::agent::PersonaAgent;
use super::persona::Persona;
use super::traits::{AgentBehavior, AgentRequest, AgentStatus, TaskResult};

fn format_brief(intro: &str, subject: &str, deliverables: &[&str]) -> String {
    let mut prompt = format!("{}\n\n{}\n\nProvide:\n", intro.trim(), subject.trim());
    for (idx, item) in deliverables.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", idx + 1, item));
    }
    prompt
}

/// Executive coordinator; the agent the CEO talks to by default.
pub struct PulseCoordinator {
    agent: PersonaAgent,
}

impl PulseCoordinator {
    pub fn new(config: &AppConfig, llm_client: SharedLlmClient, today: NaiveDate) -> Self {
        Self {
            agent: PersonaAgent::new(
                Persona::pulse(config, today),
                llm_client,
                config.history_limit,
            ),
        }
    }

    pub async fn process_request(&mut self, message: &str, context: Option<&Value>) -> TaskResult {
        self.agent.submit(message, context).await
    }

    pub fn clear_history(&mut self) {
        self.agent.reset();
    }

    pub fn name(&self) -> &str {
        &self.agent.persona().name
    }
}

#[async_trait]
impl AgentBehavior for PulseCoordinator {
    #[instrument(skip_all, fields(role = "PULSE"))]
    async fn handle(&mut self, request: AgentRequest) -> TaskResult {
        self.process_request(&request.input, request.context.as_ref())
            .await
    }

    fn reset(&mut self) {
        self.clear_history();
    }

    fn status(&self) -> AgentStatus {
        self.agent.status()
    }
}

pub struct EngineeringAgent {
    agent: PersonaAgent,
}

impl EngineeringAgent {
    pub fn new(config: &AppConfig, llm_client: SharedLlmClient, today: NaiveDate) -> Self {
        Self {
            agent: PersonaAgent::new(
                Persona::engineering(config, today),
                llm_client,
                config.history_limit,
            ),
        }
    }

    pub async fn execute_task(&mut self, task: &str, context: Option<&Value>) -> TaskResult {
        self.agent.submit(task, context).await
    }

    pub async fn review_code(&mut self, code: &str, filename: &str) -> TaskResult {
        self.execute_task(&Self::review_prompt(code, filename), None)
            .await
    }

    pub async fn design_architecture(&mut self, feature_description: &str) -> TaskResult {
        self.execute_task(&Self::architecture_prompt(feature_description), None)
            .await
    }

    fn review_prompt(code: &str, filename: &str) -> String {
        format_brief(
            "Review this code for quality, potential bugs, and improvements:",
            &format!("File: {filename}\n```\n{code}\n```"),
            &[
                "Overall quality rating (1-10)",
                "Security concerns (if any)",
                "Performance issues (if any)",
                "Best practice violations (if any)",
                "Specific improvement suggestions",
            ],
        )
    }

    fn architecture_prompt(feature_description: &str) -> String {
        format_brief(
            "Design the technical architecture for this feature:",
            feature_description,
            &[
                "System architecture diagram (in text/ASCII)",
                "Database schema needed",
                "API endpoints required",
                "Frontend components needed",
                "Technology stack recommendations",
                "Implementation phases",
            ],
        )
    }
}

#[async_trait]
impl AgentBehavior for EngineeringAgent {
    #[instrument(skip_all, fields(role = "Engineering AI"))]
    async fn handle(&mut self, request: AgentRequest) -> TaskResult {
        self.execute_task(&request.input, request.context.as_ref())
            .await
    }

    fn reset(&mut self) {
        self.agent.reset();
    }

    fn status(&self) -> AgentStatus {
        self.agent.status()
    }
}

pub struct SecurityAgent {
    agent: PersonaAgent,
}

impl SecurityAgent {
    pub fn new(config: &AppConfig, llm_client: SharedLlmClient, today: NaiveDate) -> Self {
        Self {
            agent: PersonaAgent::new(
                Persona::security(config, today),
                llm_client,
                config.history_limit,
            ),
        }
    }

    pub async fn execute_task(&mut self, task: &str, context: Option<&Value>) -> TaskResult {
        self.agent.submit(task, context).await
    }

    pub async fn design_emergency_system(&mut self, app_description: &str) -> TaskResult {
        let prompt = format_brief(
            "Design a comprehensive emergency response system for this app:",
            app_description,
            &[
                "Emergency activation mechanism (how users trigger it)",
                "Alert routing system (who gets notified, how, when)",
                "Location tracking protocol (privacy-first, opt-in)",
                "Real-time communication channels (audio, video, text)",
                "Fail-safe mechanisms (what happens if network/app fails)",
                "Privacy and consent architecture",
                "Data retention and deletion policies",
                "Emergency contact management",
                "Integration with emergency services (911/authorities)",
                "Testing and reliability requirements",
            ],
        );
        self.execute_task(&prompt, None).await
    }

    pub async fn assess_threat_model(&mut self, feature_description: &str) -> TaskResult {
        let prompt = format_brief(
            "Conduct a threat model assessment for this feature:",
            feature_description,
            &[
                "Potential attack vectors",
                "Privacy risks",
                "Data exposure risks",
                "Authentication/authorization weaknesses",
                "Network security concerns",
                "Mitigation strategies for each threat",
                "Security testing requirements",
            ],
        );
        self.execute_task(&prompt, None).await
    }

    pub async fn design_privacy_architecture(&mut self, data_requirements: &str) -> TaskResult {
        let prompt = format_brief(
            "Design a privacy-first architecture for this data requirement:",
            data_requirements,
            &[
                "Minimal data collection strategy (collect only what's necessary)",
                "User consent flows (explicit opt-in)",
                "Data encryption (at rest and in transit)",
                "Anonymization/pseudonymization strategies",
                "Data retention policies",
                "User data deletion mechanisms",
                "GDPR/CCPA compliance checklist",
                "Third-party data sharing policies (if any)",
            ],
        );
        self.execute_task(&prompt, None).await
    }
}

#[async_trait]
impl AgentBehavior for SecurityAgent {
    #[instrument(skip_all, fields(role = "Security AI"))]
    async fn handle(&mut self, request: AgentRequest) -> TaskResult {
        self.execute_task(&request.input, request.context.as_ref())
            .await
    }

    fn reset(&mut self) {
        self.agent.reset();
    }

    fn status(&self) -> AgentStatus {
        self.agent.status()
    }
}
