//! Configuration resource materialization

mod artifacts;
mod locator;
mod source;
mod writer;

pub use artifacts::ConfigMaterializer;
pub use locator::ClassPathLocator;
pub use source::InMemoryConfigSource;
pub use writer::write_configuration;
