use crate::cycle::RewriteMode;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pagesmith",
    about = "AI-assisted content refresh daemon for WordPress sites",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scheduler and HTTP gateway until interrupted.
    Serve,
    /// Run one refresh cycle and print the per-target report.
    Run {
        /// Only refresh the configured target with this page id.
        #[arg(long)]
        target: Option<u64>,
        /// Validate the rewrite but publish nothing.
        #[arg(long)]
        dry_run: bool,
        /// Override the configured rewrite mode (html, css, advisory-json).
        #[arg(long)]
        mode: Option<RewriteMode>,
        /// Override the configured output language.
        #[arg(long)]
        language: Option<String>,
    },
}
