use crate::domain::model::{Friend, FriendFlags, SteamId};
use crate::domain::ports::NativeBinding;
use crate::utils::error::Result;

pub struct Friends<'a> {
    binding: &'a dyn NativeBinding,
}

impl<'a> Friends<'a> {
    pub(crate) fn new(binding: &'a dyn NativeBinding) -> Self {
        Self { binding }
    }

    /// Friends matching any of the relationship flags.
    pub fn get_friends(&self, flags: FriendFlags) -> Result<Vec<Friend>> {
        let friends = self.binding.friends(flags)?;
        tracing::debug!("Found {} friends for flags {:#06x}", friends.len(), flags.bits());
        Ok(friends)
    }

    pub fn persona_name(&self, steam_id: SteamId) -> Result<String> {
        self.binding.friend_persona_name(steam_id)
    }
}
