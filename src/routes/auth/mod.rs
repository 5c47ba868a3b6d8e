pub mod claims;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod session;

pub use login::handle_login;
pub use login::handle_me;
pub use logout::handle_logout;
pub use refresh::handle_refresh;
