pub mod ids;
pub mod registry;
pub mod server;
pub mod store;
