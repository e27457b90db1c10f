pub mod dto;
mod handlers;
mod household;
pub mod response;
mod router;

pub use household::{ActingHousehold, HOUSEHOLD_HEADER};
pub use router::{AppState, create_router};
