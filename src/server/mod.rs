mod attachments;
mod auth;
pub mod dto;
mod hashnames;
pub mod response;
mod router;

pub use router::{AppState, create_router};
