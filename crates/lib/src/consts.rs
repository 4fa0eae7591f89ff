/// Length of the truncated object hash used to identify a resolution.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Dependency manager major version assumed when none is given.
pub const DEFAULT_TOOL_MAJOR: u32 = 2;
