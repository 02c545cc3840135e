pub mod logging;
pub mod request_id;
pub mod session_gate;

pub use logging::*;
pub use request_id::*;
pub use session_gate::*;
