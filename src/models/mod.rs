pub mod appointment;
pub mod category;
pub mod session;
pub mod user;
