//! Optional settings file layered under the command line.
mod apply;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;

#[cfg(test)]
pub(crate) use loader::load_config_file;
