pub mod cookies;
pub mod jwt;
pub mod net;
pub mod password;

pub use cookies::*;
pub use jwt::*;
pub use net::*;
pub use password::*;
