pub mod content;
pub mod message;

pub use content::{Content, ContentPart, ImageData};
pub use message::Message;
