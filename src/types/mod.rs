mod models;
mod outcome;
mod resource;

pub use models::*;
pub use outcome::*;
pub use resource::*;
