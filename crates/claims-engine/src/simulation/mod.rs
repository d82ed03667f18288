//! Synthetic-claim simulation and load harness: a seeded claim generator, a
//! sequential simulator with aggregate statistics, and a concurrent load
//! tester with ramp-up, deadline, and cancellation support.

mod generator;
mod load;
mod simulator;

pub use generator::ClaimGenerator;
pub use load::{LoadTestConfig, LoadTestReport, LoadTester};
pub use simulator::{ClaimSimulator, SimulationAccumulator, SimulationResult};
