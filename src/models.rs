use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReqDto {
    #[schema(example = "jdoe")]
    pub username: String,
    pub password: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    pub position_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "sa")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
