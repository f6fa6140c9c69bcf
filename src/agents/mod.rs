pub mod agent;
pub mod history;
pub mod persona;
pub mod specialists;
pub mod traits;

pub use specialists::{EngineeringAgent, PulseCoordinator, SecurityAgent};
pub use traits::{AgentBehavior, AgentRequest, AgentStatus, TaskResult};
