pub mod headless;
pub mod host;
