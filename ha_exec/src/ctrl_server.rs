//! # Control Server Module
//!
//! This module abstracts over the networking side of the executable when it is run as a server.
//! The server binds a REP socket, each [`Start`] request it recieves runs a fresh survey on the
//! simulated rover and the result is sent back to the client as a [`CtrlResponse`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::{self, zmq, NetError, SocketOptions};
use log::{info, warn};

use crate::{
    msgs::{CtrlResponse, RunResult, Start},
    params::ExecParams,
    sim,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Server which runs surveys on request.
pub struct CtrlServer {
    /// REP socket which accepts start requests
    socket: zmq::Socket,

    params: ExecParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`CtrlServer`]
#[derive(thiserror::Error, Debug)]
pub enum CtrlServerError {
    #[error("Network error: {0}")]
    NetError(NetError),

    #[error("Could not send the response to the client: {0}")]
    SendError(NetError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CtrlServer {
    /// Create a new instance of the control server bound to the endpoint.
    ///
    /// This function will not wait for a connection from a client before returning.
    pub fn new(
        ctx: &zmq::Context,
        endpoint: &str,
        params: ExecParams,
    ) -> Result<Self, CtrlServerError> {
        let socket_options = SocketOptions {
            bind: true,
            recv_timeout: 200,
            send_timeout: 1000,
            ..Default::default()
        };

        let socket = net::create_socket(ctx, zmq::REP, socket_options, endpoint)
            .map_err(CtrlServerError::NetError)?;

        info!("CtrlServer bound to {}", endpoint);

        Ok(Self { socket, params })
    }

    /// Serve a single request if one arrives before the recieve timeout.
    ///
    /// Returns the request and its result if a run was completed. A request which cannot be
    /// parsed or a run which fails is answered with [`CtrlResponse::Error`] and `None` is
    /// returned, the server can keep serving.
    pub fn serve_one(&mut self) -> Result<Option<(Start, RunResult)>, CtrlServerError> {
        let start: Start = match net::recv_json(&self.socket) {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(None),
            Err(e @ NetError::DeserializationError(_)) | Err(e @ NetError::NonUtf8Message) => {
                warn!("Invalid request: {}", e);
                self.respond(&CtrlResponse::Error(e.to_string()))?;
                return Ok(None);
            }
            Err(e) => return Err(CtrlServerError::NetError(e)),
        };

        info!(
            "Start recieved: {} commands, magnet {:?}, speed {:?}",
            start.commands.get_num_cmds(),
            start.magnet,
            start.speed
        );

        match sim::run_survey(&self.params, &start) {
            Ok(result) => {
                self.respond(&CtrlResponse::Result(result.clone()))?;
                Ok(Some((start, result)))
            }
            Err(e) => {
                warn!("Run failed: {}", e);
                self.respond(&CtrlResponse::Error(e.to_string()))?;
                Ok(None)
            }
        }
    }

    fn respond(&self, response: &CtrlResponse) -> Result<(), CtrlServerError> {
        net::send_json(&self.socket, response).map_err(CtrlServerError::SendError)
    }
}
