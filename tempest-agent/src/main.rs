//! # Tempest Agent
//!
//! Binds the WeatherFlow Tempest broadcast port, feeds every datagram
//! through the [`tempest`] pipeline, and writes one line-protocol
//! metric per record to stdout. Designed to sit under telegraf's
//! `inputs.execd` plugin.
//!
//! ## Usage
//!
//! ```bash
//! # defaults: port 50222, logs to stderr
//! tempest-agent
//!
//! # log as '# ' comments interleaved with the metrics on stdout
//! tempest-agent --log stdout
//! ```

mod logging;

use clap::Parser;
use log::{error, info};
use std::io;
use std::net::UdpSocket;
use std::process;
use tempest::{LineEncoder, LogDiagnostics, Pipeline, DEFAULT_PORT, MAX_DATAGRAM_BYTES};

/// WeatherFlow Tempest UDP to line-protocol bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Reject metric lines longer than this many bytes (unlimited when omitted)
    #[arg(long)]
    max_line_bytes: Option<usize>,

    /// Log destination: stderr, stdout (rendered as '# ' comments), or a file path
    #[arg(long, default_value = "stderr")]
    log: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = logging::init(&args.log, &args.log_level) {
        eprintln!("unable to open log destination '{}': {err}", args.log);
        process::exit(2);
    }

    info!("tempest-agent v{} listening on udp/{}", tempest::VERSION, args.port);

    let socket = match UdpSocket::bind(("0.0.0.0", args.port)) {
        Ok(socket) => socket,
        Err(err) => {
            error!("unable to listen on udp/{}: {err}", args.port);
            process::exit(1);
        }
    };

    let encoder = match args.max_line_bytes {
        Some(max) => LineEncoder::with_max_line_bytes(max),
        None => LineEncoder::new(),
    };

    let stdout = io::stdout();
    let mut pipeline = Pipeline::with_encoder(stdout.lock(), LogDiagnostics, encoder);

    // One datagram at a time, fully processed before the next read;
    // bursts queue in the kernel socket buffer.
    let mut buf = [0u8; MAX_DATAGRAM_BYTES];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, _)) => pipeline.process_datagram(&buf[..len]),
            Err(err) => {
                // the socket is not expected to recover once it errors
                error!("could not read from socket: {err}");
                process::exit(1);
            }
        }
    }
}
