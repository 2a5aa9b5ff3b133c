// Spawn policy: nested spawn permission and nested tool restrictions

pub mod policy;
pub mod tools;

pub use policy::{SpawnPlan, SpawnRequest, is_nested_spawn_allowed, plan_spawn};
pub use tools::resolve_nested_tools_policy;
