//! Injectable time and randomness.
//!
//! Traffic jitter, synthetic incidents, waypoint deviation, timestamps and cache
//! ages all go through these traits so tests can pin them.

pub mod clock;
pub mod random;

pub use clock::*;
pub use random::*;
