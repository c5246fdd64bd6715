#[derive(Debug, Clone)]
pub struct Config {
    // Transport (static, baked in at build time)
    pub ws_url: &'static str,
    pub ws_token: &'static str,

    // Client identity (dynamic, may be rewritten at startup)
    pub device_id: String,
    pub client_id: String,
    pub callsign: &'static str,

    // Audio device configuration
    pub capture_device: &'static str,
    pub playback_device: &'static str,
    pub capture_sample_rate: u32,
    pub capture_channels: u32,
    pub playback_period_size: usize,

    // Capture constraints, forwarded opaquely to the device layer
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,

    // UI bridge (local UDP)
    pub ui_local_port: u16,
    pub ui_remote_port: u16,
    pub ui_buffer_size: usize,
}

impl Config {
    /// Builds the configuration from environment variables set at compile
    /// time by build.rs from config.toml.
    pub fn new() -> Result<Self, &'static str> {
        Ok(Self {
            ws_url: env!("WS_URL"),
            ws_token: env!("WS_TOKEN"),

            device_id: env!("DEVICE_ID").to_string(),
            client_id: env!("CLIENT_ID").to_string(),
            callsign: env!("CALLSIGN"),

            capture_device: env!("CAPTURE_DEVICE"),
            playback_device: env!("PLAYBACK_DEVICE"),
            capture_sample_rate: env!("CAPTURE_SAMPLE_RATE")
                .parse()
                .map_err(|_| "Failed to parse CAPTURE_SAMPLE_RATE")?,
            capture_channels: env!("CAPTURE_CHANNELS")
                .parse()
                .map_err(|_| "Failed to parse CAPTURE_CHANNELS")?,
            playback_period_size: env!("PLAYBACK_PERIOD_SIZE")
                .parse()
                .map_err(|_| "Failed to parse PLAYBACK_PERIOD_SIZE")?,

            echo_cancellation: env!("ECHO_CANCELLATION")
                .parse()
                .map_err(|_| "Failed to parse ECHO_CANCELLATION")?,
            noise_suppression: env!("NOISE_SUPPRESSION")
                .parse()
                .map_err(|_| "Failed to parse NOISE_SUPPRESSION")?,
            auto_gain_control: env!("AUTO_GAIN_CONTROL")
                .parse()
                .map_err(|_| "Failed to parse AUTO_GAIN_CONTROL")?,

            ui_local_port: env!("UI_LOCAL_PORT")
                .parse()
                .map_err(|_| "Failed to parse UI_LOCAL_PORT")?,
            ui_remote_port: env!("UI_REMOTE_PORT")
                .parse()
                .map_err(|_| "Failed to parse UI_REMOTE_PORT")?,
            ui_buffer_size: env!("UI_BUFFER_SIZE")
                .parse()
                .map_err(|_| "Failed to parse UI_BUFFER_SIZE")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new().expect("Failed to create default Config from build-time environment variables")
    }
}
