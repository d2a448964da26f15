//! Wire types of the definitions endpoint.

use serde::Deserialize;

use acrotip_protocols::Definition;

/// One entry of `GET /api/definitions?word=TERM`.
#[derive(Debug, Deserialize)]
pub struct ApiDefinition {
    pub definition: String,
    #[serde(default)]
    pub upvote_count: u32,
    #[serde(default)]
    pub downvote_count: u32,
}

impl From<ApiDefinition> for Definition {
    fn from(api: ApiDefinition) -> Self {
        Definition::voted(api.definition, api.upvote_count, api.downvote_count)
    }
}
