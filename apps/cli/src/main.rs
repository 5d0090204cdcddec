//! ReportDrop: uploads report files to the backend in chunks.

mod cli;
mod config;
mod console;
mod http;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reportdrop_transfer::FileHandle;
use reportdrop_upload::{
    BatchCoordinator, BatchMetadata, BatchOutcome, FileRegistry, UploadMode, assign_and_notify,
    submit_and_notify,
};

use cli::CliOptions;
use config::AppConfig;
use console::ConsoleSink;
use http::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reportdrop=debug")),
        )
        .init();

    let opts = CliOptions::parse();
    let mut cfg = AppConfig::load(opts.config.as_deref())?;
    if let Some(url) = opts.url {
        cfg.upload_url = url;
    }
    if let Some(chunk_size) = opts.chunk_size {
        cfg.chunk_size = chunk_size;
    }
    if opts.whole_file {
        cfg.chunked = false;
    }

    if opts.list_types {
        for report in &cfg.report_types {
            println!("{:<16} {}", report.key, report.label);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let sink = ConsoleSink;
    let registry = Arc::new(FileRegistry::new(cfg.report_types.clone())?);

    for (key, path) in &opts.files {
        let file = FileHandle::from_path(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if assign_and_notify(&registry, key, file, &sink).is_err() {
            return Ok(ExitCode::FAILURE);
        }
    }

    let mode = if cfg.chunked {
        UploadMode::Chunked
    } else {
        UploadMode::WholeFile
    };
    let mut coordinator = BatchCoordinator::new(Arc::clone(&registry))
        .with_chunk_size(cfg.chunk_size)
        .with_mode(mode);

    let printer = coordinator.take_events().map(|mut events_rx| {
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if let Some(line) = console::render_event(&event) {
                    println!("{line}");
                }
            }
        })
    });

    let transport = HttpTransport::new(cfg.upload_url.clone(), cfg.request_timeout())?;
    let metadata = BatchMetadata {
        report_date: opts.date,
    };
    tracing::info!(url = %cfg.upload_url, chunk_size = cfg.chunk_size, ?mode, "starting upload");

    let result = {
        let submit = submit_and_notify(&coordinator, &transport, &metadata, &sink);
        tokio::pin!(submit);
        tokio::select! {
            result = &mut submit => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("interrupted, cancelling uploads");
                coordinator.cancel_all();
                submit.await
            }
        }
    };

    drop(coordinator);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    print!("{}", console::render_snapshots(&registry.snapshots()));

    Ok(match result {
        Ok(report) if report.outcome() == BatchOutcome::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
