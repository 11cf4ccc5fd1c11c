pub mod dispatch;
pub mod messages;
pub mod session;

pub use dispatch::{dispatch, process_message};
pub use messages::{Command, ObjectSummary, Response};
pub use session::{BridgeError, Session};
