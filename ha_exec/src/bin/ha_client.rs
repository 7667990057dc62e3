//! # Hybrid automaton client
//!
//! Sends a start request to the control server, waits for the run to complete and prints a
//! summary of every step, or writes the full result as JSON.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::info;
use std::{fs::File, path::PathBuf};
use structopt::StructOpt;

use comms_if::net::{self, zmq, NetParams, SocketOptions};
use ha_lib::{
    attack::{MagnetSpec, SpeedSpec},
    msgs::{CtrlResponse, RunResult, Start},
};
use util::{
    logger::{level_from_verbose, logger_init},
    script::CommandScript,
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "ha_client", about = "Request a survey run from the ha_exec server")]
struct Opts {
    /// Endpoint of the control server, overrides net.toml.
    #[structopt(short, long)]
    endpoint: Option<String>,

    /// Command script for the run.
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Constant compass offset in degrees.
    #[structopt(long)]
    magnet_offset: Option<f64>,

    /// Position of a dipole magnet as `x y z`, requires --magnet-moment.
    #[structopt(long, number_of_values = 3, allow_hyphen_values = true)]
    magnet_position: Option<Vec<f64>>,

    /// Moment of the dipole magnet.
    #[structopt(long)]
    magnet_moment: Option<f64>,

    /// Fixed speed of the rover.
    #[structopt(long)]
    speed: Option<f64>,

    /// Maximum number of ticks in the run.
    #[structopt(long)]
    max_ticks: Option<u64>,

    /// Write the result as JSON to this file instead of printing it.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Milliseconds to wait for the result.
    #[structopt(long, default_value = "60000")]
    timeout_ms: i32,

    /// Log at trace level.
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    let session =
        Session::new("ha_client", "sessions").wrap_err("Failed to create the session")?;
    logger_init(level_from_verbose(opts.verbose), &session)
        .wrap_err("Failed to initialise logging")?;

    let start = build_start(&opts)?;

    let endpoint = match opts.endpoint {
        Some(ref e) => e.clone(),
        None => {
            let net_params: NetParams =
                util::params::load("net.toml").wrap_err("Could not load net params")?;

            // The server binds to the wildcard address
            net_params.ctrl_endpoint.replace('*', "localhost")
        }
    };

    // ---- REQUEST ----

    let ctx = zmq::Context::new();
    let socket = net::create_socket(
        &ctx,
        zmq::REQ,
        SocketOptions {
            recv_timeout: opts.timeout_ms,
            linger: 0,
            ..Default::default()
        },
        &endpoint,
    )
    .wrap_err("Could not connect to the server")?;

    info!("Sending start request to {}", endpoint);
    net::send_json(&socket, &start).wrap_err("Could not send the start request")?;

    let result = match net::recv_json::<CtrlResponse>(&socket)
        .wrap_err("Could not recieve the response")?
    {
        Some(CtrlResponse::Result(r)) => r,
        Some(CtrlResponse::Error(e)) => return Err(eyre!("The server rejected the run: {}", e)),
        None => return Err(eyre!("No response from the server")),
    };

    // ---- OUTPUT ----

    match opts.output {
        Some(ref path) => {
            let file = File::create(path).wrap_err("Could not create the output file")?;
            serde_json::to_writer_pretty(file, &result).wrap_err("Could not write the result")?;
            info!("Result written to {:?}", path);
        }
        None => print_summary(&result),
    }

    session.exit();

    Ok(())
}

/// Build the start request from the command line.
fn build_start(opts: &Opts) -> Result<Start, Report> {
    let commands = match opts.script {
        Some(ref path) => CommandScript::new(path).wrap_err("Failed to load script")?,
        None => CommandScript::default(),
    };

    let magnet = match (opts.magnet_offset, &opts.magnet_position, opts.magnet_moment) {
        (Some(_), Some(_), _) => {
            return Err(eyre!("Give either a magnet offset or a dipole, not both"))
        }
        (Some(offset_deg), None, _) => Some(MagnetSpec::Stationary { offset_deg }),
        (None, Some(p), Some(moment)) => Some(MagnetSpec::Dipole {
            moment,
            position_m: [p[0], p[1], p[2]],
        }),
        (None, Some(_), None) => return Err(eyre!("A dipole magnet needs --magnet-moment")),
        (None, None, _) => None,
    };

    Ok(Start {
        commands,
        magnet,
        speed: opts.speed.map(|speed| SpeedSpec::Fixed { speed }),
        max_ticks: opts.max_ticks,
    })
}

fn print_summary(result: &RunResult) {
    println!(
        "{:>8} {:>9} {:>9} {:>9} {:>5} {:>6} {:>5}",
        "time", "x", "y", "heading", "state", "action", "cmd"
    );

    for s in &result.history {
        println!(
            "{:>8.2} {:>9.3} {:>9.3} {:>9.3} {:>5} {:>6} {:>5}",
            s.time_s,
            s.position_m[0],
            s.position_m[1],
            s.heading_deg,
            s.state.id().to_string(),
            s.intent.to_string(),
            s.cmd.map(|c| c.code().to_string()).unwrap_or_default()
        );
    }

    println!("Outcome: {:?}", result.outcome);
}
