mod feedback;
mod gateway;
mod quiz;
mod scoring;
mod timer;

pub use feedback::*;
pub use gateway::*;
pub use quiz::*;
pub use scoring::*;
pub use timer::*;
