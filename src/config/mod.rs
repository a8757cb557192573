pub mod orb_configuration;

pub use orb_configuration::{OrbConfiguration, DEFAULT_SPEED};
