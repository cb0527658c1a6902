//! Sample applications run by the `apprun` binary.

pub mod countdown;
pub mod echo;

pub use countdown::Countdown;
pub use echo::Echo;
