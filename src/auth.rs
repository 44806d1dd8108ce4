use crate::config::AppConfig;
use log::warn;
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// True only when the header value equals the configured key. An unset key
/// authorizes nothing.
pub fn authorize(provided: Option<&str>, config: &AppConfig) -> bool {
    match provided {
        Some(key) => !config.api_key.is_empty() && key == config.api_key,
        None => false,
    }
}

// Guard for every protected route
pub struct ApiKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKey {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<AppConfig>() else {
            return request::Outcome::Error((Status::InternalServerError, ()));
        };

        if authorize(request.headers().get_one(API_KEY_HEADER), config) {
            request::Outcome::Success(ApiKey)
        } else {
            warn!("Rejected {} {}: invalid API key", request.method(), request.uri());
            request::Outcome::Error((Status::Unauthorized, ()))
        }
    }
}
