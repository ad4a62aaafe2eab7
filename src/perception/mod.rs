//! Spatial awareness model.
//!
//! Fuses sensor samples and realized motion into a dead-reckoned [`Pose`]
//! plus a sector-partitioned memory of nearby obstacles and light.
//!
//! ```text
//!            90° (left)
//!              │
//!   180° ──────●────── 0° (origin heading)
//!              │
//!           -90° (right)
//! ```
//!
//! Sectors are indexed by angle relative to the heading the model started
//! with. A mark is written to the sector under `heading + relative_angle`
//! at write time; sectors are never rotated afterwards.
//!
//! [`Pose`]: crate::core::Pose

mod model;
mod sector;
mod summary;

pub use model::SpatialModel;
pub use sector::{FORBIDDEN_SCORE_MAX, Sector, SectorNote};
pub use summary::{Breadcrumb, RelativeDirection, Sighting, SightingCategory, SpatialEvent, SpatialSummary};
