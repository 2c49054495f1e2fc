use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plotdeck", version, about = "PlotDeck layer control CLI")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a session, redraw it once and print the results
    Run {
        path: String,
        /// Freeze every zone's view window before drawing
        #[arg(long)]
        lock_axes: bool,
        /// Append this many empty zones before drawing
        #[arg(long, default_value_t = 0)]
        add_zone: u32,
        /// Cancel the plot job if it is still running after this long
        #[arg(long)]
        cancel_after_ms: Option<u64>,
        /// Give up waiting for the plot job after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_seconds: u64,
        /// Print progress positions as they arrive
        #[arg(long)]
        progress: bool,
    },
    /// Check a session file and style every layer without drawing
    Validate { path: String },
    /// List the zones a session lays out and the layers placed in each
    Zones { path: String },
}
