// Lineage Protocol Layer
// Session records and spawn decisions shared by the kernel and its callers

pub mod session;
pub mod spawn;

pub use session::{SessionRecord, SessionSnapshot, SessionStore, StoreError, load_session_store};
pub use spawn::{SpawnDecision, ToolPolicy};
