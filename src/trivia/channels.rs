use std::collections::HashMap;
use std::sync::RwLock;

use crate::trivia::{ChannelId, GuildId};

/// The one channel per guild where trivia happens.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<GuildId, ChannelId>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `channel` the trivia channel of its guild, replacing any earlier
    /// choice.
    pub fn set_here(&self, channel: ChannelId) {
        let mut channels = self.channels.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = channels.insert(channel.guild(), channel) {
            log::info!("Trivia channel for guild {} moved from {:?}", channel.chat, previous);
        }
    }

    pub fn trivia_channel(&self, guild: GuildId) -> Option<ChannelId> {
        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        channels.get(&guild).copied()
    }

    pub fn is_trivia_channel(&self, channel: ChannelId) -> bool {
        self.trivia_channel(channel.guild()) == Some(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_guild_has_no_trivia_channel() {
        let registry = ChannelRegistry::new();
        assert!(!registry.is_trivia_channel(ChannelId::new(1, None)));
    }

    #[test]
    fn one_channel_per_guild() {
        let registry = ChannelRegistry::new();
        let general = ChannelId::new(-100, None);
        let topic = ChannelId::new(-100, Some(5));

        registry.set_here(general);
        assert!(registry.is_trivia_channel(general));

        registry.set_here(topic);
        assert!(registry.is_trivia_channel(topic));
        assert!(!registry.is_trivia_channel(general));
        assert_eq!(registry.trivia_channel(GuildId(-100)), Some(topic));
    }

    #[test]
    fn guilds_are_independent() {
        let registry = ChannelRegistry::new();
        registry.set_here(ChannelId::new(1, None));
        registry.set_here(ChannelId::new(2, None));
        assert!(registry.is_trivia_channel(ChannelId::new(1, None)));
        assert!(registry.is_trivia_channel(ChannelId::new(2, None)));
    }
}
