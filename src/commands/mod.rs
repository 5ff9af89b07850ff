use crate::commands::disc::{LookupCommand, PlayCommand, TocCommand};
use clap::{Parser, Subcommand};

pub mod disc;

/// CLI for reading audio CD layouts, looking up their titles and playing them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Toc(TocCommand),
    Lookup(LookupCommand),
    Play(PlayCommand),
}
