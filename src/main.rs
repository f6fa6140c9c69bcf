mod agents;
mod config;
mod llm_client;
mod orchestrator;
mod scenarios;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use agents::{AgentRequest, EngineeringAgent, PulseCoordinator, SecurityAgent};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::AppConfig;
use llm_client::{build_llm_client, EchoLlmClient, SharedLlmClient};
use orchestrator::OrchestratorRouter;
use scenarios::Printer;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "beechwood-pulse",
    about = "Dispatch tasks to the PULSE coordinator and its Engineering/Security AI employees"
)]
struct Cli {
    /// Answer with the offline echo client instead of calling Anthropic.
    #[arg(long, global = true)]
    offline: bool,

    /// Print task results and statuses as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the status of every agent.
    Status,
    /// Ask PULSE to introduce itself.
    Pulse,
    /// Give Engineering AI a small coding task.
    Engineering,
    /// Ask Security AI for an emergency alert protocol.
    Security,
    /// Security AI designs the BEACON protocol, Engineering AI plans the build.
    Collaborate,
    /// Send one prompt to a named agent.
    Ask {
        /// Target agent: pulse, engineering, or security.
        #[arg(short, long, default_value = "pulse")]
        agent: String,
        /// Optional JSON appended to the prompt as additional context.
        #[arg(long)]
        context: Option<String>,
        prompt: String,
    },
    /// Have Engineering AI review a source file.
    Review {
        path: PathBuf,
    },
    /// Have Engineering AI design the architecture for a feature.
    Architect {
        feature: String,
    },
    /// Have Security AI design an emergency response system for an app.
    EmergencyDesign {
        app_description: String,
    },
    /// Have Security AI threat-model a feature.
    ThreatModel {
        feature: String,
    },
    /// Have Security AI design a privacy-first data architecture.
    Privacy {
        data_requirements: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    init_tracing(&config);
    let cli = Cli::parse();

    config.validate();
    let llm_client = if cli.offline {
        info!("Offline mode: using EchoLlmClient");
        EchoLlmClient::shared()
    } else {
        build_llm_client(&config.anthropic, false).context("LLM client initialization failed")?
    };

    let today = Local::now().date_naive();
    let printer = Printer { json: cli.json };

    match cli.command {
        Some(Commands::Status) => {
            let router = build_router(&config, &llm_client, today);
            for status in router.statuses() {
                printer.status(&status)?;
            }
        }
        Some(Commands::Pulse) => {
            let mut pulse = PulseCoordinator::new(&config, llm_client, today);
            scenarios::run_pulse(&mut pulse, printer).await?;
        }
        Some(Commands::Engineering) => {
            let mut engineering = EngineeringAgent::new(&config, llm_client, today);
            scenarios::run_engineering(&mut engineering, printer).await?;
        }
        Some(Commands::Security) => {
            let mut security = SecurityAgent::new(&config, llm_client, today);
            scenarios::run_security(&mut security, printer).await?;
        }
        Some(Commands::Collaborate) => {
            let mut router = build_router(&config, &llm_client, today);
            scenarios::run_collaboration(&mut router, printer).await?;
        }
        Some(Commands::Ask {
            agent,
            context,
            prompt,
        }) => {
            let request = match context {
                Some(raw) => AgentRequest::with_context(
                    prompt,
                    serde_json::from_str(&raw).context("--context must be valid JSON")?,
                ),
                None => AgentRequest::new(prompt),
            };
            let mut router = build_router(&config, &llm_client, today);
            let routed = router.route_to_agent(&agent, request).await;
            printer.result(routed.routed_to(), &routed.result)?;
        }
        Some(Commands::Review { path }) => {
            let code = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path.display().to_string();
            let mut engineering = EngineeringAgent::new(&config, llm_client, today);
            let result = engineering.review_code(&code, &filename).await;
            printer.result("Engineering AI", &result)?;
        }
        Some(Commands::Architect { feature }) => {
            let mut engineering = EngineeringAgent::new(&config, llm_client, today);
            let result = engineering.design_architecture(&feature).await;
            printer.result("Engineering AI", &result)?;
        }
        Some(Commands::EmergencyDesign { app_description }) => {
            let mut security = SecurityAgent::new(&config, llm_client, today);
            let result = security.design_emergency_system(&app_description).await;
            printer.result("Security AI", &result)?;
        }
        Some(Commands::ThreatModel { feature }) => {
            let mut security = SecurityAgent::new(&config, llm_client, today);
            let result = security.assess_threat_model(&feature).await;
            printer.result("Security AI", &result)?;
        }
        Some(Commands::Privacy { data_requirements }) => {
            let mut security = SecurityAgent::new(&config, llm_client, today);
            let result = security.design_privacy_architecture(&data_requirements).await;
            printer.result("Security AI", &result)?;
        }
        None => {
            let mut router = build_router(&config, &llm_client, today);
            run_repl(&mut router, printer).await?;
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.default_log_level()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn build_router(
    config: &AppConfig,
    llm_client: &SharedLlmClient,
    today: NaiveDate,
) -> OrchestratorRouter {
    OrchestratorRouter::new(PulseCoordinator::new(config, llm_client.clone(), today))
        .with_specialist(
            "engineering",
            EngineeringAgent::new(config, llm_client.clone(), today),
        )
        .with_specialist(
            "security",
            SecurityAgent::new(config, llm_client.clone(), today),
        )
}

async fn run_repl(router: &mut OrchestratorRouter, printer: Printer) -> anyhow::Result<()> {
    println!(
        "{} ready. Mention @engineering or @security to pick an agent; /status, /reset, exit.\n",
        router.coordinator().name()
    );
    let stdin = io::stdin();

    loop {
        print!("CEO > ");
        io::stdout().flush()?;

        let mut buffer = String::new();
        if stdin.read_line(&mut buffer)? == 0 {
            break;
        }
        let trimmed = buffer.trim();

        if trimmed.eq_ignore_ascii_case("exit") {
            info!("User exited CLI");
            break;
        }

        match trimmed {
            "" => continue,
            "/reset" => {
                router.reset_all();
                println!("All conversation histories cleared.\n");
            }
            "/status" => {
                for status in router.statuses() {
                    printer.status(&status)?;
                }
            }
            _ => {
                let routed = router.dispatch(AgentRequest::new(trimmed)).await;
                if !routed.result.success {
                    error!(agent = %routed.routed_to(), "Agent request failed");
                }
                printer.result(&routed.result.agent, &routed.result)?;
                println!();
            }
        }
    }

    Ok(())
}
