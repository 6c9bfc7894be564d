//! Shared primitive types used across the entire simulation.

/// A simulation day. One tick = one day. Day 1 is the first day of a session.
pub type Day = u64;

/// Grid coordinate. Signed so that out-of-range input from a front-end
/// (including negative drops) is reported as `OutOfBounds` rather than
/// failing to parse.
pub type Coord = i32;

/// An open, string-keyed resource identifier ("budget", "pollution", ...).
pub type ResourceName = String;

/// Stable identifier of an entity type in the catalog.
pub type EntityTypeId = String;

/// Row id of a persisted save.
pub type SaveId = i64;

/// The resource that pollution crises read.
pub const POLLUTION: &str = "pollution";

/// The resource that crisis penalties are scored against.
pub const SCORE: &str = "score";

/// Default name of the spendable currency resource.
pub const DEFAULT_CURRENCY: &str = "budget";
