use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload for a logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,      // user ID
    pub name: String,  // display name
    pub email: String, // login email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
    pub iss: String,   // issuer
    pub aud: String,   // audience
}
