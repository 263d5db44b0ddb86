//! Process exit codes. Scripts and CI jobs rely on these values.

pub const SUCCESS: i32 = 0;
/// A check failed, a hallucination was detected or a judge reply was unusable.
pub const FAILED: i32 = 1;
/// Bad config, task, code path or reference file.
pub const CONFIG_ERROR: i32 = 2;
