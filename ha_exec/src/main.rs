//! Main hybrid automaton executable entry point.
//!
//! # Architecture
//!
//! The executable runs in one of two modes:
//!
//!     - Standalone: a single survey of the simulated rover is run, with commands taken from an
//!       optional command script. The history is archived and the process exits.
//!     - Server: the control server is bound to the control endpoint and every start request
//!       from a client runs a survey, until the process is killed.
//!
//! Every run is archived as `arch/history_<n>.csv` and saved as `result_<n>.json` in the session
//! directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use comms_if::net::{zmq, NetParams};
use ha_lib::{
    ctrl_server::CtrlServer,
    msgs::{RunResult, Start},
    params::ExecParams,
    sim,
};
use util::{
    archive::Archiver,
    logger::{level_from_verbose, logger_init},
    script::CommandScript,
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "ha_exec", about = "Hybrid automaton survey rover")]
struct Opts {
    /// Control loop frequency in Hz, overrides the parameter file.
    #[structopt(short, long)]
    frequency: Option<f64>,

    /// Serve start requests from clients rather than running once.
    #[structopt(long)]
    serve: bool,

    /// Endpoint to bind the control server to, overrides net.toml. Implies --serve.
    #[structopt(short, long)]
    endpoint: Option<String>,

    /// Command script for a standalone run.
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Pace the control loop to wall-clock time.
    #[structopt(long)]
    realtime: bool,

    /// Log at trace level.
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ha_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(level_from_verbose(opts.verbose), &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Hybrid Automaton Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut params: ExecParams =
        util::params::load("ha_exec.toml").wrap_err("Could not load exec params")?;

    if let Some(f) = opts.frequency {
        params.frequency_hz = f;
    }
    if opts.realtime {
        params.realtime = true;
    }

    if !(params.frequency_hz.is_finite() && params.frequency_hz > 0.0) {
        return Err(eyre!(
            "Control frequency must be positive, found {} Hz",
            params.frequency_hz
        ));
    }

    info!("Exec parameters loaded: {:#?}", params);

    // ---- RUN ----

    if opts.serve || opts.endpoint.is_some() {
        let endpoint = match opts.endpoint {
            Some(e) => e,
            None => {
                let net_params: NetParams =
                    util::params::load("net.toml").wrap_err("Could not load net params")?;
                net_params.ctrl_endpoint
            }
        };

        serve(&session, params, &endpoint)?;
    } else {
        let commands = match opts.script {
            Some(ref path) => {
                info!("Loading script from {:?}", path);

                let script = CommandScript::new(path).wrap_err("Failed to load script")?;

                info!(
                    "Loaded script contains {} commands, the last on tick {}\n",
                    script.get_num_cmds(),
                    script.get_last_tick()
                );

                script
            }
            None => {
                info!("No script provided, no commands will be sent\n");
                CommandScript::default()
            }
        };

        let start = Start {
            commands,
            ..Default::default()
        };

        let result = sim::run_survey(&params, &start).wrap_err("Survey run failed")?;
        archive_run(&session, 0, result)?;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Serve start requests forever.
fn serve(session: &Session, params: ExecParams, endpoint: &str) -> Result<(), Report> {
    let zmq_ctx = zmq::Context::new();

    let mut server =
        CtrlServer::new(&zmq_ctx, endpoint, params).wrap_err("Failed to start the CtrlServer")?;

    info!("Waiting for start requests\n");

    let mut run_index = 0;

    loop {
        if let Some((_, result)) = server
            .serve_one()
            .wrap_err("Error while serving the client")?
        {
            archive_run(session, run_index, result)?;
            run_index += 1;
        }
    }
}

/// Write the run's history to the archive and save the full result.
fn archive_run(session: &Session, index: usize, result: RunResult) -> Result<(), Report> {
    info!(
        "Run {} ended with {:?} after {} steps",
        index,
        result.outcome,
        result.history.len()
    );

    let mut archiver = Archiver::from_path(session, format!("history_{}.csv", index))
        .wrap_err("Failed to create the history archive")?;

    for step in &result.history {
        archiver
            .serialise(step.to_record())
            .wrap_err("Failed to archive a step")?;
    }

    session.save(format!("result_{}.json", index), result);

    Ok(())
}
