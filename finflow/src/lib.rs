pub mod background;
pub mod entity;
pub mod error;
pub mod events;
pub mod import;
pub mod logging;
pub mod remote;
pub mod settings;
pub mod store;

pub use error::StoreError;
pub use store::Store;

// Always expose testing module (integration tests need it)
pub mod testing;
