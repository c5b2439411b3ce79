//! Strongly-typed identifiers (avoid mixing UUIDs arbitrarily).

use uuid::Uuid;

/// Member identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemberId(pub Uuid);

/// Group identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub Uuid);

/// Round identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoundId(pub Uuid);

/// Assignment (giver → recipient deed) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssignmentId(pub Uuid);

/// Assignment history entry identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssignmentEventId(pub Uuid);

/// Deed template identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TemplateId(pub Uuid);
