//! Volume control backends and fade scheduling

#[cfg(target_os = "linux")]
mod alsa;
mod applescript;
mod backend;
mod error;
mod fade;
#[cfg(target_os = "linux")]
mod linux;
mod registry;
mod spotify;

#[cfg(target_os = "linux")]
pub use alsa::*;
pub use applescript::*;
pub use backend::*;
pub use error::*;
pub use fade::*;
#[cfg(target_os = "linux")]
pub use linux::*;
pub use registry::*;
pub use spotify::*;
