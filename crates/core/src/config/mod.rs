pub mod autocreate_config;
pub mod sources;
pub mod validation;

pub use autocreate_config::*;
pub use sources::*;
pub use validation::*;
