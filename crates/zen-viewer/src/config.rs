use clap::Parser;

/// Command-line configuration for the viewer.
#[derive(Parser, Debug, Clone)]
#[command(name = "zen_viewer", about = "Hand-gesture-driven particle field")]
pub struct Config {
    /// Detector command to spawn, whitespace-split into program + args.
    /// The process must write one wire frame (JSON) per line on stdout.
    #[arg(long, env = "ZEN_TRACKER_CMD", default_value = "hand_emulator")]
    pub tracker_cmd: String,

    /// Base particle count; each particle carries trail copies on top.
    #[arg(long, env = "ZEN_PARTICLES", default_value_t = 4000)]
    pub particles: usize,

    /// Start with the detector stopped (enable it from the HUD).
    #[arg(long, env = "ZEN_TRACKER_OFF", default_value_t = false)]
    pub tracker_off: bool,
}
