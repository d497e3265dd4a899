pub mod entities;
pub mod enums;
pub mod memory;
pub mod services;
pub mod store;
