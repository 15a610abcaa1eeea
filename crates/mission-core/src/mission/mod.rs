//! Mission domain: the stored tree, its integrity rules, and its repository.

pub mod model;
pub mod repository;
pub mod validation;

pub use model::{Action, Effect, Force, Mission, MissionNode, Prototype, StoredMission};
pub use repository::MissionRepository;
pub use validation::{StructuralValidator, StructureViolation};
