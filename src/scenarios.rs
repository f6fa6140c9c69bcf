//! Canned runs that exercise each agent end to end and print the outcome.

use crate::agents::{
    AgentBehavior, AgentRequest, AgentStatus, EngineeringAgent, PulseCoordinator, SecurityAgent,
    TaskResult,
};
use crate::orchestrator::OrchestratorRouter;

/// Rough blended price used for the collaboration summary.
pub const COST_PER_TOKEN_USD: f64 = 0.000003;

const PREVIEW_CHARS: usize = 800;
const HANDOFF_CHARS: usize = 1000;

const PULSE_INTRO: &str =
    "PULSE, introduce yourself and confirm you're operational. What's your primary function?";

const ENGINEERING_TASK: &str = "Create a Python function called 'calculate_factorial' that takes a number and returns its factorial. Include error handling and docstring.";

const SECURITY_TASK: &str = "Design a simple but robust emergency alert protocol for a mobile safety app.

The system needs to:
- Allow users to trigger an emergency alert with one tap
- Send SMS alerts to 3 emergency contacts
- Include the user's location in the alert
- Be privacy-first (location only shared during emergency)

Keep it concise - just the core protocol design.";

const BEACON_PROTOCOL_TASK: &str = "Design the core emergency alert protocol for BEACON app:

Requirements:
- One-tap emergency activation
- Send alerts to emergency contacts (SMS + push notifications)
- Include user's real-time location
- Privacy-first: location only tracked during emergency
- Must work even with poor network connectivity

Provide a concise protocol design that Engineering AI can implement.";

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub json: bool,
}

impl Printer {
    pub fn banner(&self, title: &str) {
        if self.json {
            return;
        }
        println!("\n{}", "=".repeat(60));
        println!("{title}");
        println!("{}\n", "=".repeat(60));
    }

    pub fn status(&self, status: &AgentStatus) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(status)?);
            return Ok(());
        }
        println!("{} status:", status.name);
        for (key, value) in status.fields() {
            println!("  {key}: {value}");
        }
        Ok(())
    }

    pub fn result(&self, label: &str, result: &TaskResult) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }
        if result.success {
            println!("{label} response:\n{}", result.output);
            println!("\nTokens used: {}", result.tokens());
        } else {
            println!("{label} error:\n{}", result.output);
        }
        Ok(())
    }
}

pub async fn run_pulse(pulse: &mut PulseCoordinator, printer: Printer) -> anyhow::Result<TaskResult> {
    printer.banner("TESTING PULSE COORDINATOR");
    printer.status(&pulse.status())?;

    let result = pulse.process_request(PULSE_INTRO, None).await;
    printer.result(pulse.name(), &result)?;
    printer.banner("PULSE TEST COMPLETE");
    Ok(result)
}

pub async fn run_engineering(
    engineering: &mut EngineeringAgent,
    printer: Printer,
) -> anyhow::Result<TaskResult> {
    printer.banner("TESTING ENGINEERING AI");
    printer.status(&engineering.status())?;

    let result = engineering.execute_task(ENGINEERING_TASK, None).await;
    printer.result("Engineering AI", &result)?;
    printer.banner("ENGINEERING AI TEST COMPLETE");
    Ok(result)
}

pub async fn run_security(
    security: &mut SecurityAgent,
    printer: Printer,
) -> anyhow::Result<TaskResult> {
    printer.banner("TESTING SECURITY AI");
    printer.status(&security.status())?;

    let result = security.execute_task(SECURITY_TASK, None).await;
    printer.result("Security AI", &result)?;
    printer.banner("SECURITY AI TEST COMPLETE");
    Ok(result)
}

#[derive(Debug, Clone)]
pub struct CollaborationSummary {
    pub security: TaskResult,
    pub engineering: TaskResult,
}

impl CollaborationSummary {
    pub fn total_tokens(&self) -> u32 {
        self.security.tokens() + self.engineering.tokens()
    }

    pub fn estimated_cost_usd(&self) -> f64 {
        f64::from(self.total_tokens()) * COST_PER_TOKEN_USD
    }
}

/// Security designs the BEACON alert protocol, then engineering plans its implementation.
pub async fn run_collaboration(
    router: &mut OrchestratorRouter,
    printer: Printer,
) -> anyhow::Result<CollaborationSummary> {
    printer.banner("BEECHWOOD CORPORATION - AI COLLABORATION TEST");

    let security = router
        .route_to_agent("security", AgentRequest::new(BEACON_PROTOCOL_TASK))
        .await
        .result;
    print_preview(printer, "SECURITY AI OUTPUT", &security)?;

    let engineering_task = engineering_handoff(&security.output);
    let engineering = router
        .route_to_agent("engineering", AgentRequest::new(engineering_task))
        .await
        .result;
    print_preview(printer, "ENGINEERING AI OUTPUT", &engineering)?;

    let summary = CollaborationSummary {
        security,
        engineering,
    };

    if !printer.json {
        println!("COLLABORATION SUMMARY:");
        println!("  - Security AI designed the emergency protocol");
        println!("  - Engineering AI created technical implementation plan");
        println!("  - Total tokens used: {}", summary.total_tokens());
        println!("  - Total cost: ~${:.4}", summary.estimated_cost_usd());
    }

    Ok(summary)
}

fn print_preview(printer: Printer, heading: &str, result: &TaskResult) -> anyhow::Result<()> {
    if printer.json {
        return printer.result(heading, result);
    }

    println!("{heading}:");
    println!("{}", "-".repeat(60));
    println!("{}", preview(&result.output, PREVIEW_CHARS));
    println!("{}", "-".repeat(60));
    if result.success {
        println!("Tokens used: {}\n", result.tokens());
    }
    Ok(())
}

fn engineering_handoff(security_output: &str) -> String {
    format!(
        "Based on Security AI's emergency protocol design, create a technical implementation plan for BEACON:

SECURITY AI'S PROTOCOL:

{protocol}...

YOUR TASK:

Provide a concise technical architecture including:
1. Database schema for emergency contacts and alerts
2. Key API endpoints needed
3. Frontend components structure
4. Real-time location tracking implementation
5. SMS/push notification integration approach

Keep it high-level - we'll build details later.",
        protocol = truncate_chars(security_output, HANDOFF_CHARS)
    )
}

/// First `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn preview(text: &str, max: usize) -> String {
    let head = truncate_chars(text, max);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
