use serde::{Deserialize, Serialize};

/// Claims of tokens minted by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,

    #[serde(default)]
    pub token_type: TokenType,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    #[default]
    Access,
    Refresh,
}
