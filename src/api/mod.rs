mod auth;
mod client;

pub use auth::{AuthError, StaticToken, TokenFile, TokenSource, best_effort_token};
pub use client::{ApiError, ForYouResponse, HttpPaperApi, PaperApi, PaperDetail, RecommendedPaper};
