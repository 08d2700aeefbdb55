/// Assertions to verify the correctness of the state of the system.
/// Used in `debug_assert!()` blocks.
pub mod assertions;
