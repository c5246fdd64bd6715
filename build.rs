use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct Config {
    application: Application,
    network: Network,
    audio: Audio,
    ui: Ui,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Network {
    ws_url: String,
    ws_token: String,
    device_id: String,
    client_id: String,
    callsign: String,
}

#[derive(Deserialize)]
struct Audio {
    capture_device: String,
    playback_device: String,
    capture_sample_rate: u32,
    capture_channels: u32,
    playback_period_size: usize,
    echo_cancellation: bool,
    noise_suppression: bool,
    auto_gain_control: bool,
}

#[derive(Deserialize)]
struct Ui {
    local_port: u16,
    remote_port: u16,
    buffer_size: usize,
}

// Reads config.toml at compile time and re-exports every value as an
// environment variable for Config::new().
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    println!("cargo:rustc-env=WS_URL={}", config.network.ws_url);
    println!("cargo:rustc-env=WS_TOKEN={}", config.network.ws_token);
    println!("cargo:rustc-env=DEVICE_ID={}", config.network.device_id);
    println!("cargo:rustc-env=CLIENT_ID={}", config.network.client_id);
    println!("cargo:rustc-env=CALLSIGN={}", config.network.callsign);

    println!("cargo:rustc-env=CAPTURE_DEVICE={}", config.audio.capture_device);
    println!("cargo:rustc-env=PLAYBACK_DEVICE={}", config.audio.playback_device);
    println!(
        "cargo:rustc-env=CAPTURE_SAMPLE_RATE={}",
        config.audio.capture_sample_rate
    );
    println!(
        "cargo:rustc-env=CAPTURE_CHANNELS={}",
        config.audio.capture_channels
    );
    println!(
        "cargo:rustc-env=PLAYBACK_PERIOD_SIZE={}",
        config.audio.playback_period_size
    );
    println!(
        "cargo:rustc-env=ECHO_CANCELLATION={}",
        config.audio.echo_cancellation
    );
    println!(
        "cargo:rustc-env=NOISE_SUPPRESSION={}",
        config.audio.noise_suppression
    );
    println!(
        "cargo:rustc-env=AUTO_GAIN_CONTROL={}",
        config.audio.auto_gain_control
    );

    println!("cargo:rustc-env=UI_LOCAL_PORT={}", config.ui.local_port);
    println!("cargo:rustc-env=UI_REMOTE_PORT={}", config.ui.remote_port);
    println!("cargo:rustc-env=UI_BUFFER_SIZE={}", config.ui.buffer_size);
}
