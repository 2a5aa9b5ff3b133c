/// Depth limit used when neither the agent nor the global defaults set one.
pub const DEFAULT_MAX_SPAWN_DEPTH: u32 = 1;

/// Hard ceiling on spawn depth. Configured limits are clamped to it and
/// ancestry traversal never walks further.
pub const ABSOLUTE_MAX_SPAWN_DEPTH: u32 = 10;

/// Returns true when a child at `child_depth` would be deeper than `max_depth`.
pub fn exceeds_spawn_depth_limit(child_depth: u32, max_depth: u32) -> bool {
  child_depth > max_depth
}

/// Clamp a configured depth limit into `[1, ABSOLUTE_MAX_SPAWN_DEPTH]`.
pub fn clamp_max_spawn_depth(configured: i64) -> u32 {
  let clamped = configured.clamp(1, i64::from(ABSOLUTE_MAX_SPAWN_DEPTH));
  u32::try_from(clamped).unwrap_or(ABSOLUTE_MAX_SPAWN_DEPTH)
}
