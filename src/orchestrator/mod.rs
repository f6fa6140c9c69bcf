pub mod router;

pub use router::OrchestratorRouter;
