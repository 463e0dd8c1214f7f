mod breakage;
mod contacts;
mod context;
mod object;
mod removal;
mod stepper;
#[cfg(test)]
pub(crate) mod testing;
mod world;

pub use breakage::{FractureHandler, FractureOutcome};
pub use contacts::{ContactScanner, ContactSide, Impact, ManifoldHit};
pub use context::{Simulation, StepReport};
pub use object::{ObjectId, RigidObject};
pub use removal::RemovalQueue;
pub use stepper::{SimulationStepper, SyncReport};
pub use world::ObjectWorld;
