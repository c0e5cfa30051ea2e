pub mod command;
pub mod legacy;
pub mod space;
pub mod window;
