//! The concrete migration steps, grouped by the kind of change they make.

mod defaults;
mod identity;
mod restructure;
mod text;

pub use defaults::{
    AddActionEffects, AddForceRevealAllNodes, AddNodeDevice, AddResourceLabel, AddVersionNumber,
    AssignStructureKeys,
};
pub use identity::{ExtractPrototypes, RegenerateLegacyIds, needs_fresh_id};
pub use restructure::{
    DEFAULT_FORCE_COLOR, DEFAULT_FORCE_NAME, DEFAULT_INITIAL_RESOURCES, IntroduceForces,
    MoveInitialResourcesToForces, RenameLegacyIdFields, RenameNodeStructure, UnifyEffectTargets,
};
pub use text::{ClearPlaceholderText, LEGACY_NODE_COLORS, MapLegacyNodeColors, WrapRichText};
