pub mod clipboard;
pub mod link;

pub use clipboard::{ClipboardError, ClipboardWriter, SystemClipboard};
pub use link::{LinkError, LinkOpener, SystemOpener};
