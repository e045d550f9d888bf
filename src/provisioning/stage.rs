// src/provisioning/stage.rs

// Fixed provisioning script for the Wi-Fi module. Lengths are part of the
// wire contract: each buffer is sent whole, including the NUL that trails
// the access-point command.

/// Liveness probe, sent once by the kick-off.
pub const PROBE: &[u8; 4] = b"AT\r\n";
/// Put the module in access-point mode.
pub const SET_MODE: &[u8; 8] = b"ATPW=2\r\n";
/// SSID "MICRO2022", open, channel 11, broadcast.
pub const CONFIGURE_AP: &[u8; 23] = b"ATPA=MICRO2022,,11,0\r\n\0";
/// Enable the DHCP server.
pub const ENABLE_DHCP: &[u8; 10] = b"ATPH=1,1\r\n";
/// Open a TCP server on port 3001.
pub const OPEN_SERVER: &[u8; 13] = b"ATPS=0,3001\r\n";
/// Start the module's web server.
pub const START_WEBSERVER: &[u8; 8] = b"ATSW=c\r\n";

/// One step of the provisioning script.
///
/// Stages only move forward, one at a time; [`CommandStage::Done`] is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum CommandStage {
    /// Waiting for the module to answer the probe.
    #[default]
    Probe,
    SetMode,
    ConfigureAp,
    EnableDhcp,
    OpenServer,
    StartWebServer,
    /// Provisioning complete; nothing more is sent.
    Done,
}

impl CommandStage {
    /// Every stage in script order.
    pub const SEQUENCE: [CommandStage; 7] = [
        CommandStage::Probe,
        CommandStage::SetMode,
        CommandStage::ConfigureAp,
        CommandStage::EnableDhcp,
        CommandStage::OpenServer,
        CommandStage::StartWebServer,
        CommandStage::Done,
    ];

    /// The stage after this one. `Done` stays `Done`.
    pub const fn next(self) -> Self {
        match self {
            CommandStage::Probe => CommandStage::SetMode,
            CommandStage::SetMode => CommandStage::ConfigureAp,
            CommandStage::ConfigureAp => CommandStage::EnableDhcp,
            CommandStage::EnableDhcp => CommandStage::OpenServer,
            CommandStage::OpenServer => CommandStage::StartWebServer,
            CommandStage::StartWebServer | CommandStage::Done => CommandStage::Done,
        }
    }

    /// Bytes transmitted on entering this stage.
    pub const fn command(self) -> Option<&'static [u8]> {
        match self {
            CommandStage::Probe => Some(PROBE),
            CommandStage::SetMode => Some(SET_MODE),
            CommandStage::ConfigureAp => Some(CONFIGURE_AP),
            CommandStage::EnableDhcp => Some(ENABLE_DHCP),
            CommandStage::OpenServer => Some(OPEN_SERVER),
            CommandStage::StartWebServer => Some(START_WEBSERVER),
            CommandStage::Done => None,
        }
    }

    #[inline]
    pub const fn is_done(self) -> bool {
        matches!(self, CommandStage::Done)
    }
}
