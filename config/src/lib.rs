// Lineage Configuration System
// Layered spawn policy configuration

pub mod agent_id;
pub mod errors;
pub mod layered;
pub mod loader;
pub mod types;

pub use agent_id::{DEFAULT_AGENT_ID, normalize_agent_id, same_agent_id};
pub use errors::ConfigError;
pub use layered::{ConfigLayer, ConfigLayerSource, LayeredConfig};
pub use loader::{ConfigLoader, parse_override};
pub use types::*;
