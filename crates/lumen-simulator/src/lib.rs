//! Virtual fixture mirror for exercising the pipeline without hardware
//! (`spec.md` §4.8).

pub mod fixture;
pub mod simulator;

pub use fixture::FixtureState;
pub use simulator::Simulator;
