// File: args.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dash_player::TemplateBinding;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogLevel {
    Trace = 0, // Designates very fine-grained informational events, extremely verbose.
    Debug = 1, // Designates fine-grained informational events.
    Info = 2, // Designates informational messages.
    Warn = 3, // Designates hazardous situations.
    Error = 4, // Designates very serious errors.
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum TemplateBindingArg {
    /// Template of the adaptation set (or representation) that holds the selected representation
    Owning,
    /// Template of the first video/mp4 adaptation set
    FirstVideoSet,
}

impl From<TemplateBindingArg> for TemplateBinding {
    fn from(arg: TemplateBindingArg) -> Self {
        match arg {
            TemplateBindingArg::Owning => TemplateBinding::Owning,
            TemplateBindingArg::FirstVideoSet => TemplateBinding::FirstVideoSet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Simple command line tool for reading emsg boxes in MP4.")]
pub struct Args {
    /// URL of the DASH manifest (MPD)
    #[arg(short, long, required_unless_present = "segment_file")]
    pub manifest: Option<String>,
    /// Read a segment from disk instead of resolving a manifest
    #[arg(long, conflicts_with = "manifest")]
    pub segment_file: Option<PathBuf>,
    /// Which SegmentTemplate addresses the selected representation
    #[arg(long, value_enum, default_value = "owning")]
    pub template_binding: TemplateBindingArg,
    /// HTTP request timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn get_log_level_filter(args: &Args) -> LevelFilter {
    // Map the LogLevel enum to the LevelFilter enum
    match args.log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}
