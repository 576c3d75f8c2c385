// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A tiny line oriented "hosted process" running on top of the bridge, in your real
//! terminal. The host only ever sees descriptors: it writes a prompt to `1`, reads a line
//! from `0`, and echoes it back. Everything else (echo, backspace, <kbd>Ctrl+C</kbd>) is
//! the bridge's line discipline.
//!
//! ```text
//! cargo run --bin stdio_bridge_repl -- --enable-logging --log-level trace
//! tail -f log.txt
//! ```

use clap::{Parser, ValueEnum};
use stdio_bridge::{BridgeConfig, BridgeHandle, CommonResult, InputDevice, OutputDevice,
                   RawModeGuard, STDOUT_FD, StdioBridge, TracingConfig, ok,
                   report_host_failure, throws, try_initialize_logging_global};
use tokio::sync::broadcast;
use tracing_core::LevelFilter;

#[derive(Debug, Parser)]
#[command(bin_name = "stdio_bridge_repl")]
#[command(about = "Drive a line oriented host through a cooked-mode terminal bridge")]
#[command(version)]
#[command(next_line_help = true)]
/// More info: <https://docs.rs/clap/latest/clap/_derive/#overview>
pub struct CLIArg {
    #[arg(
        long,
        short = 'l',
        help = "Log to a file named `log.txt` in the current directory"
    )]
    pub enable_logging: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Debug, help = "Most verbose level to log")]
    pub log_level: LogLevel,

    #[arg(
        long,
        help = "Pass host output through as is, without turning `\\n` into `\\r\\n`"
    )]
    pub no_convert_eol: bool,

    #[arg(long, default_value = "> ", help = "Prompt the host writes before each read")]
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "x"];

#[tokio::main]
#[allow(clippy::needless_return)]
async fn main() -> CommonResult<()> {
    throws!({
        let cli_arg = CLIArg::parse();

        let enable_logging = cli_arg.enable_logging;
        enable_logging.then(|| {
            let level_filter = LevelFilter::from(cli_arg.log_level);
            try_initialize_logging_global(TracingConfig::from(level_filter)).ok();
            // % is Display, ? is Debug.
            tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
        });

        let config = BridgeConfig::default().with_convert_eol(!cli_arg.no_convert_eol);
        let bridge = StdioBridge::install_on_output_device(
            &config,
            OutputDevice::new_stdout(),
            None,
        );
        let handle = BridgeHandle::new(bridge);

        let raw_mode_guard = RawModeGuard::new()?;
        let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);

        let host_task = tokio::spawn({
            let handle = handle.clone();
            let prompt = cli_arg.prompt.clone();
            async move {
                let result = run_host(&handle, &prompt).await;
                if let Err(error) = &result {
                    tracing::error!(message = "Host failed", error = ?error);
                    report_host_failure(handle.lock().sink_mut(), error).ok();
                }
                // No receivers left is fine, the pump may already be done.
                shutdown_sender.send(()).ok();
                result
            }
        });

        handle
            .run_event_pump(InputDevice::new_event_stream(), shutdown_receiver)
            .await?;

        // The input stream can end while the host is still parked on a read.
        if !host_task.is_finished() {
            host_task.abort();
        }
        let host_result = host_task.await;

        drop(raw_mode_guard);

        enable_logging.then(|| {
            tracing::debug!(message = "Stop logging...", host_result = ?host_result);
        });
    })
}

/// The "hosted process". It only talks to the bridge through descriptors.
async fn run_host(handle: &BridgeHandle, prompt: &str) -> CommonResult<()> {
    handle
        .write(
            STDOUT_FD,
            b"Type a line and press Enter. Ctrl+C drops the line. `exit` quits.\n",
        )
        .await?;

    loop {
        handle.write(STDOUT_FD, prompt.as_bytes()).await?;
        let line = handle.read_line().await?;

        match line.trim() {
            // Blank line, or an interrupt.
            "" => {}
            it if EXIT_COMMANDS.contains(&it) => {
                handle.write(STDOUT_FD, b"Goodbye!\n").await?;
                break;
            }
            it => {
                let reply = format!("You typed: {it}\n");
                handle.write(STDOUT_FD, reply.as_bytes()).await?;
            }
        }
    }

    ok!()
}
