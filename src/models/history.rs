// src/models/history.rs

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of the append-only audit log embedded in users and prospects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdateHistory {
    #[schema(example = "ApplicantName updated, Status updated")]
    pub comment: String,

    #[schema(example = "2024-04-12T15:04:05Z")]
    pub timestamp: DateTime<Utc>,

    #[schema(example = "john_doe")]
    pub actor: String,
}

impl UpdateHistory {
    pub fn new(comment: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            timestamp: now(),
            actor: actor.into(),
        }
    }
}

/// Current UTC time truncated to whole seconds, so every stored timestamp
/// serialises as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
