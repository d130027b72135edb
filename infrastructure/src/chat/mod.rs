//! Chat platform adapters.

mod local;

pub use local::{LocalChatPlatform, PlatformActivity, is_known_emoji};
