//! Identifier value objects
//!
//! Platform identifiers (users, guilds, channels, messages) are opaque
//! numeric snowflakes handed to us by the chat platform. Record identifiers
//! (polls, choices, internal user and guild rows) are assigned by the
//! repository. Keeping them as distinct newtypes stops a message id from
//! ever being passed where a poll id is expected.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Returns the raw value.
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// A chat platform user.
    UserId(u64)
);

id_type!(
    /// A chat platform guild (server).
    GuildId(u64)
);

id_type!(
    /// A chat platform channel.
    ChannelId(u64)
);

id_type!(
    /// A chat platform message.
    MessageId(u64)
);

id_type!(
    /// Repository identity of a poll.
    PollId(i64)
);

id_type!(
    /// Repository identity of a poll choice.
    ChoiceId(i64)
);

id_type!(
    /// Repository identity of a user, created lazily from a [`UserId`].
    InternalUserId(i64)
);

id_type!(
    /// Repository identity of a registered guild.
    InternalGuildId(i64)
);

impl UserId {
    /// Mention markup for this user, e.g. `<@42>`.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}
