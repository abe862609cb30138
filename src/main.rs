// certwatch - Scheduled TLS certificate expiry check
// Copyright (C) 2025 certwatch contributors
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use certwatch::{
    Args, DryRunPublisher, HttpTopicPublisher, Publisher, Result, RustlsDialer, handle,
    report_json,
};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let dialer = RustlsDialer::new(args.timeout())?.with_port(args.port);
    let publisher: Box<dyn Publisher> = if args.dry_run {
        info!("Dry run: warnings will be logged, not published");
        Box::new(DryRunPublisher)
    } else {
        Box::new(HttpTopicPublisher::new(args.timeout())?)
    };

    let result = handle(|key| std::env::var(key).ok(), &dialer, publisher.as_ref()).await;

    if args.json {
        println!("{}", report_json(&result)?);
    } else if let Ok(outcome) = &result
        && !outcome.message().is_empty()
    {
        println!("{}", outcome.message());
    }

    result?;
    Ok(())
}
