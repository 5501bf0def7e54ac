use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyReferralRequest {
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyReferralResponse {
    pub success: bool,
    pub new_points: i64,
}
