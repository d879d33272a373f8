pub mod events;
pub mod phase;
pub mod runner;
pub mod simulator;
pub mod state;

pub use events::ScanEvent;
pub use phase::PhaseDefinition;
pub use runner::ToolHandle;
pub use simulator::{PhaseDelay, PhaseSimulator, SimulationReport};
pub use state::ScanStatus;
