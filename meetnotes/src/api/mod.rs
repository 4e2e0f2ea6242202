mod dto;
mod extractors;
mod frontend;
mod handlers;
mod openapi;
pub mod rate_limit;
mod routes;
mod state;

pub use dto::{
    ErrorResponse, HealthResponse, SendEmailRequest, SendEmailResponse, SummarizeRequest,
    SummarizeResponse,
};
pub use extractors::{AppJson, SummarizeForm};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
