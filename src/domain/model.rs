use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub u32);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AppId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// 64-bit account identifier, opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(pub u64);

impl SteamId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub steam_id: SteamId,
    pub name: String,
}

bitflags! {
    /// Relationship filter passed to friend enumeration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FriendFlags: u16 {
        const NONE = 0x00;
        const BLOCKED = 0x01;
        const FRIENDSHIP_REQUESTED = 0x02;
        const IMMEDIATE = 0x04;
        const CLAN_MEMBER = 0x08;
        const ON_GAME_SERVER = 0x10;
        const REQUESTING_FRIENDSHIP = 0x80;
        const REQUESTING_INFO = 0x100;
        const ALL = 0xFFFF;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenshotHandle(pub u32);

impl ScreenshotHandle {
    pub const INVALID: ScreenshotHandle = ScreenshotHandle(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Callback kinds that can be registered with the callback registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteamCallback {
    SteamServersConnected,
    SteamServerConnectFailure,
    SteamServersDisconnected,
    MicroTxnAuthorizationResponse,
    PersonaStateChange,
    GameOverlayActivated,
    GameLobbyJoinRequested,
    LobbyDataUpdate,
    LobbyChatUpdate,
    P2PSessionRequest,
    P2PSessionConnectFail,
    ScreenshotReady,
    ScreenshotRequested,
}

impl SteamCallback {
    pub const ALL: [SteamCallback; 13] = [
        SteamCallback::SteamServersConnected,
        SteamCallback::SteamServerConnectFailure,
        SteamCallback::SteamServersDisconnected,
        SteamCallback::MicroTxnAuthorizationResponse,
        SteamCallback::PersonaStateChange,
        SteamCallback::GameOverlayActivated,
        SteamCallback::GameLobbyJoinRequested,
        SteamCallback::LobbyDataUpdate,
        SteamCallback::LobbyChatUpdate,
        SteamCallback::P2PSessionRequest,
        SteamCallback::P2PSessionConnectFail,
        SteamCallback::ScreenshotReady,
        SteamCallback::ScreenshotRequested,
    ];

    /// Numeric callback id used by the SDK.
    pub fn id(self) -> i32 {
        match self {
            SteamCallback::SteamServersConnected => 101,
            SteamCallback::SteamServerConnectFailure => 102,
            SteamCallback::SteamServersDisconnected => 103,
            SteamCallback::MicroTxnAuthorizationResponse => 152,
            SteamCallback::PersonaStateChange => 304,
            SteamCallback::GameOverlayActivated => 331,
            SteamCallback::GameLobbyJoinRequested => 333,
            SteamCallback::LobbyDataUpdate => 505,
            SteamCallback::LobbyChatUpdate => 506,
            SteamCallback::P2PSessionRequest => 1202,
            SteamCallback::P2PSessionConnectFail => 1203,
            SteamCallback::ScreenshotReady => 2301,
            SteamCallback::ScreenshotRequested => 2302,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// A callback delivered by the SDK during a pump tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub kind: SteamCallback,
    pub data: Vec<u8>,
    pub received_at_ms: i64,
}

impl CallbackEvent {
    pub fn new(kind: SteamCallback, data: Vec<u8>) -> Self {
        Self {
            kind,
            data,
            received_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Leading little-endian 64-bit id, present on persona and lobby payloads.
    pub fn steam_id(&self) -> Option<SteamId> {
        let bytes: [u8; 8] = self.data.get(..8)?.try_into().ok()?;
        Some(SteamId(u64::from_le_bytes(bytes)))
    }

    /// Leading boolean byte, e.g. the overlay activation state.
    pub fn flag(&self) -> Option<bool> {
        self.data.first().map(|b| *b != 0)
    }
}
