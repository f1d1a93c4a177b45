//! Seams to external collaborators.

mod clock;
mod face;
mod id_generator;
mod merge;
mod relationship;

pub use clock::{Clock, SystemClock};
pub use face::FaceSignalProvider;
pub use id_generator::{IdGenerator, UuidGenerator};
pub use merge::FieldMergeFunction;
pub use relationship::RelationshipProvider;
