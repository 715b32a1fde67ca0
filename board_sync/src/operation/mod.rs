/// This module represents the use cases of the board synchronisation
/// with a submodule foreach one of them.
pub mod check;
pub mod sync;
