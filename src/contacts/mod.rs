mod error;
mod handlers;
mod migration;
mod normalize;
mod service;
mod types;
mod validate;

pub use error::*;
pub use handlers::*;
pub use migration::*;
pub use normalize::*;
pub use service::*;
pub use types::*;
pub use validate::*;
