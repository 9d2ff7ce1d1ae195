/// OS inspection
///
/// Everything that knows where macOS keeps its recent lists, or how to get at
/// them, lives behind `SystemInspector`. The rest of the crate only sees
/// plain records and paths.

pub mod inspector;
pub mod macos;

pub use inspector::SystemInspector;
pub use macos::{open_file, MacInspector};
