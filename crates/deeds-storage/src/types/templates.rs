//! Deed template types.

use chrono::{DateTime, Utc};

use super::TemplateId;

/// A reusable deed description ("Compliment someone 3 times").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeedTemplate {
    pub id: TemplateId,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
