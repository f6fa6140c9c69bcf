use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::agents::{AgentBehavior, AgentRequest, AgentStatus, PulseCoordinator, TaskResult};

type SpecialistHandle = Box<dyn AgentBehavior>;

pub const COORDINATOR_KEY: &str = "pulse";

/// PULSE plus the specialists it hands work to. Owns every agent it routes to.
pub struct OrchestratorRouter {
    coordinator: PulseCoordinator,
    specialists: BTreeMap<String, SpecialistHandle>,
}

impl OrchestratorRouter {
    pub fn new(coordinator: PulseCoordinator) -> Self {
        Self {
            coordinator,
            specialists: BTreeMap::new(),
        }
    }

    pub fn with_specialist<A>(mut self, name: &str, agent: A) -> Self
    where
        A: AgentBehavior + 'static,
    {
        self.specialists
            .insert(normalize_agent_name(name), Box::new(agent));
        self
    }

    pub fn specialist_names(&self) -> Vec<&str> {
        self.specialists.keys().map(String::as_str).collect()
    }

    pub fn coordinator(&self) -> &PulseCoordinator {
        &self.coordinator
    }

    /// Hand a task to a named agent. Unknown names yield a failure record.
    #[instrument(skip_all, fields(agent_name = %agent_name))]
    pub async fn route_to_agent(&mut self, agent_name: &str, request: AgentRequest) -> RoutedTask {
        let key = normalize_agent_name(agent_name);
        let decision = RoutingDecision::new(
            intent_for(&key),
            1.0,
            format!("Caller routed to '{agent_name}'"),
            &key,
        );
        self.execute(decision, request).await
    }

    /// Pick an agent from the request text, then execute it.
    #[instrument(skip_all, fields(input_len = request.input.len()))]
    pub async fn dispatch(&mut self, request: AgentRequest) -> RoutedTask {
        let decision = self.classify_intent(&request);
        debug!(
            intent = %decision.intent,
            agent = %decision.agent,
            confidence = decision.confidence,
            "Routing decision"
        );
        self.execute(decision, request).await
    }

    pub fn reset_all(&mut self) {
        self.coordinator.reset();
        for agent in self.specialists.values_mut() {
            agent.reset();
        }
    }

    pub fn statuses(&self) -> Vec<AgentStatus> {
        std::iter::once(self.coordinator.status())
            .chain(self.specialists.values().map(|agent| agent.status()))
            .collect()
    }

    async fn execute(&mut self, decision: RoutingDecision, request: AgentRequest) -> RoutedTask {
        let result = if decision.agent == COORDINATOR_KEY {
            self.coordinator.handle(request).await
        } else if let Some(agent) = self.specialists.get_mut(&decision.agent) {
            agent.handle(request).await
        } else {
            let registered = self.specialist_names().join(", ");
            warn!(agent = %decision.agent, %registered, "No agent registered under that name");
            TaskResult::failed(
                decision.agent.clone(),
                "Unassigned",
                format!(
                    "No agent registered under '{}'. Available: {COORDINATOR_KEY}, {registered}",
                    decision.agent
                ),
            )
        };

        RoutedTask { decision, result }
    }

    fn classify_intent(&self, request: &AgentRequest) -> RoutingDecision {
        let normalized = request.input.to_lowercase();

        if let Some(explicit) = Self::explicit_agent(&normalized) {
            return RoutingDecision::new(
                intent_for(explicit),
                0.95,
                format!("User explicitly requested {explicit}"),
                explicit,
            );
        }

        ROUTING_RULES
            .iter()
            .filter(|rule| self.specialists.contains_key(rule.agent))
            .find_map(|rule| rule.evaluate(&normalized))
            .unwrap_or_else(RoutingDecision::coordinator_default)
    }

    fn explicit_agent(normalized_input: &str) -> Option<&'static str> {
        const TOKENS: &[(&str, &str)] = &[
            ("@pulse", COORDINATOR_KEY),
            ("@security", "security"),
            ("@engineering", "engineering"),
        ];

        TOKENS
            .iter()
            .find(|(token, _)| normalized_input.contains(*token))
            .map(|(_, agent)| *agent)
    }
}

/// `"Security AI"`, `"security_ai"`, `"@Security"` all map to `"security"`.
pub fn normalize_agent_name(name: &str) -> String {
    let lowered = name.trim().trim_start_matches('@').to_lowercase();
    let stripped = ["_ai", "-ai", " ai"]
        .iter()
        .find_map(|suffix| lowered.strip_suffix(suffix))
        .unwrap_or(&lowered)
        .trim();

    match stripped {
        "coordinator" | "cto" => COORDINATOR_KEY.to_string(),
        other => other.to_string(),
    }
}

fn intent_for(agent_key: &str) -> RouterIntent {
    match agent_key {
        "engineering" => RouterIntent::Engineering,
        "security" => RouterIntent::Security,
        _ => RouterIntent::Coordination,
    }
}

pub struct RoutedTask {
    pub decision: RoutingDecision,
    pub result: TaskResult,
}

impl RoutedTask {
    pub fn routed_to(&self) -> &str {
        &self.decision.agent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterIntent {
    Coordination,
    Engineering,
    Security,
}

impl fmt::Display for RouterIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RouterIntent::Coordination => "coordination",
            RouterIntent::Engineering => "engineering",
            RouterIntent::Security => "security",
        };

        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub intent: RouterIntent,
    pub confidence: f32,
    pub rationale: String,
    pub agent: String,
}

impl RoutingDecision {
    fn new(intent: RouterIntent, confidence: f32, rationale: String, agent: &str) -> Self {
        Self {
            intent,
            confidence,
            rationale,
            agent: agent.to_string(),
        }
    }

    fn coordinator_default() -> Self {
        Self {
            intent: RouterIntent::Coordination,
            confidence: 0.35,
            rationale: String::from("No specialist keywords matched; PULSE handles it directly."),
            agent: COORDINATOR_KEY.to_string(),
        }
    }
}

#[derive(Debug)]
struct RoutingRule {
    intent: RouterIntent,
    keywords: &'static [&'static str],
    rationale: &'static str,
    agent: &'static str,
    confidence: f32,
}

impl RoutingRule {
    const fn new(
        intent: RouterIntent,
        keywords: &'static [&'static str],
        rationale: &'static str,
        agent: &'static str,
        confidence: f32,
    ) -> Self {
        Self {
            intent,
            keywords,
            rationale,
            agent,
            confidence,
        }
    }

    fn evaluate(&self, normalized_input: &str) -> Option<RoutingDecision> {
        self.keywords
            .iter()
            .copied()
            .find(|keyword| normalized_input.contains(keyword))
            .map(|keyword| {
                let rationale = format!("{} (matched '{}')", self.rationale, keyword);
                RoutingDecision::new(self.intent, self.confidence, rationale, self.agent)
            })
    }
}

const ROUTING_RULES: &[RoutingRule] = &[
    RoutingRule::new(
        RouterIntent::Security,
        &[
            "security",
            "threat",
            "privacy",
            "encrypt",
            "vulnerab",
            "gdpr",
            "consent",
            "emergency protocol",
            "attack",
        ],
        "Request concerns security, privacy, or safety design",
        "security",
        0.8,
    ),
    RoutingRule::new(
        RouterIntent::Engineering,
        &[
            "code",
            "implement",
            "function",
            "schema",
            "api endpoint",
            "refactor",
            "bug",
            "architecture",
            "database",
            "frontend",
        ],
        "Request mentions engineering or code-level work",
        "engineering",
        0.78,
    ),
];

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::agents::agent::test_support::ScriptedLlmClient;
    use crate::agents::{EngineeringAgent, SecurityAgent};
    use crate::config::AppConfig;
    use crate::llm_client::SharedLlmClient;

    fn router(client: SharedLlmClient) -> OrchestratorRouter {
        let config = AppConfig::default();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        OrchestratorRouter::new(PulseCoordinator::new(&config, client.clone(), today))
            .with_specialist(
                "engineering",
                EngineeringAgent::new(&config, client.clone(), today),
            )
            .with_specialist("Security AI", SecurityAgent::new(&config, client, today))
    }

    #[test]
    fn agent_names_are_normalized() {
        assert_eq!(normalize_agent_name("Security AI"), "security");
        assert_eq!(normalize_agent_name("security_ai"), "security");
        assert_eq!(normalize_agent_name("@Engineering"), "engineering");
        assert_eq!(normalize_agent_name(" ENGINEERING-AI "), "engineering");
        assert_eq!(normalize_agent_name("coordinator"), "pulse");
        assert_eq!(normalize_agent_name("product"), "product");
    }

    #[tokio::test]
    async fn route_to_registered_specialist_returns_its_result() {
        let client = ScriptedLlmClient::always("protocol v1", 1);
        let mut router = router(client);

        let routed = router
            .route_to_agent("security", AgentRequest::new("Design the alert protocol"))
            .await;

        assert_eq!(routed.routed_to(), "security");
        assert_eq!(routed.decision.intent, RouterIntent::Security);
        assert!(routed.result.success);
        assert_eq!(routed.result.agent, "Security AI");
        assert_eq!(routed.result.output, "protocol v1");
    }

    #[tokio::test]
    async fn unknown_agent_yields_failure_without_calling_model() {
        let client = ScriptedLlmClient::always("unused", 1);
        let mut router = router(client.clone());

        let routed = router
            .route_to_agent("product", AgentRequest::new("Draft the roadmap"))
            .await;

        assert!(!routed.result.success);
        assert!(routed
            .result
            .output
            .contains("No agent registered under 'product'"));
        assert!(routed.result.output.contains("engineering, security"));
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn dispatch_classifies_by_mention_then_keywords() {
        let client = ScriptedLlmClient::always("ok", 4);
        let mut router = router(client);

        let explicit = router
            .dispatch(AgentRequest::new("@engineering check the threat model"))
            .await;
        assert_eq!(explicit.routed_to(), "engineering");
        assert!((explicit.decision.confidence - 0.95).abs() < f32::EPSILON);

        let security = router
            .dispatch(AgentRequest::new("How should we encrypt location data?"))
            .await;
        assert_eq!(security.routed_to(), "security");
        assert!(security.decision.rationale.contains("matched 'encrypt'"));

        let engineering = router
            .dispatch(AgentRequest::new("Write the database schema"))
            .await;
        assert_eq!(engineering.routed_to(), "engineering");

        let general = router
            .dispatch(AgentRequest::new("What should we focus on this week?"))
            .await;
        assert_eq!(general.routed_to(), COORDINATOR_KEY);
        assert_eq!(general.result.agent, "PULSE");
    }

    #[tokio::test]
    async fn reset_all_clears_every_history() {
        let client = ScriptedLlmClient::always("ok", 3);
        let mut router = router(client);

        router.route_to_agent("pulse", AgentRequest::new("a")).await;
        router.route_to_agent("engineering", AgentRequest::new("b")).await;
        router.route_to_agent("security", AgentRequest::new("c")).await;
        assert!(router
            .statuses()
            .iter()
            .all(|status| status.conversation_length == 2));

        router.reset_all();
        let statuses = router.statuses();
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|status| status.conversation_length == 0));
    }
}
