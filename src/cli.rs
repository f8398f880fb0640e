//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::{RawConfig, DEFAULT_CHECK_INTERVAL_MINUTES};
use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::version::{VersionPattern, DEFAULT_VERSION_PATTERN};

/// qcsync - keep the newest QC APK build in a target directory.
#[derive(Parser, Debug)]
#[command(name = "qcsync")]
#[command(
    author,
    version,
    about,
    long_about = r#"qcsync finds APK files whose names contain "qc" and a numeric version
(e.g. qc_app1.10.0.apk), ranks them numerically, and keeps the newest one in a
target directory, removing older builds of the same series.

Versions compare component by component as integers, so 1.10.0 is newer
than 1.2.3.

Examples:
    qcsync scan --search ./builds
    qcsync sync --search ./builds --target /mnt/device
    qcsync watch --search ./builds --target /mnt/device --interval 5
"#
)]
pub struct Cli {
    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "md",
        value_name = "FORMAT",
        long_help = "Select the output format for scan results.\n\n\
Supported values:\n\
- md (default): a listing with the max version highlighted\n\
- jsonl: one JSON object per file\n\
- json: a single JSON array\n\
- raw: the listing without heading or colors"
    )]
    pub format: String,

    /// Disable colored output.
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. The NO_COLOR environment variable is honored too."
    )]
    pub no_color: bool,

    /// Quiet mode (no log lines, errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug diagnostics on stderr. RUST_LOG overrides the level."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List QC APK files under a directory, newest version first.
    #[command(long_about = "Recursively scan DIR for *.apk files containing \"qc\" and a\n\
numeric version. Files without a resolvable version are left out.\n\n\
Example:\n\
  qcsync scan --search ./builds --format jsonl\n")]
    Scan {
        /// Root directory to scan (recursively).
        #[arg(long, env = "QCSYNC_SEARCH", value_name = "DIR")]
        search: PathBuf,

        /// Version pattern with exactly one capture group (case-insensitive).
        #[arg(long, env = "QCSYNC_PATTERN", value_name = "REGEX", default_value = DEFAULT_VERSION_PATTERN)]
        pattern: String,
    },

    /// Copy the newest QC APK into the target, deleting older builds there.
    #[command(long_about = "Scan once, then copy the newest file into TARGET under its own\n\
name. Older files of the same series in TARGET are deleted first.\n\n\
Deletion and copy are not transactional: if the copy fails after the\n\
deletion, TARGET holds no build of that series until the next sync.\n\n\
Example:\n\
  qcsync sync --search ./builds --target /mnt/device\n")]
    Sync {
        /// Root directory to scan (recursively).
        #[arg(long, env = "QCSYNC_SEARCH", value_name = "DIR")]
        search: PathBuf,

        /// Directory receiving the newest build.
        #[arg(long, env = "QCSYNC_TARGET", value_name = "DIR")]
        target: PathBuf,

        /// Version pattern with exactly one capture group (case-insensitive).
        #[arg(long, env = "QCSYNC_PATTERN", value_name = "REGEX", default_value = DEFAULT_VERSION_PATTERN)]
        pattern: String,
    },

    /// Monitor a directory and keep the target up to date.
    #[command(long_about = "Start monitoring: scan immediately, then every INTERVAL minutes.\n\
Whenever a version newer than any seen before appears, it is copied into\n\
TARGET (unless --no-auto-copy) and older builds of the series are deleted.\n\n\
Commands read from stdin, one per line:\n\
  now    scan immediately\n\
  stop   pause the periodic scans\n\
  start  resume the periodic scans\n\
  copy   copy the newest file of the last scan into TARGET\n\
  quit   exit (Ctrl-C works too)\n\n\
Example:\n\
  qcsync watch --search ./builds --target /mnt/device --interval 5\n")]
    Watch {
        /// Root directory to scan (recursively).
        #[arg(long, env = "QCSYNC_SEARCH", value_name = "DIR")]
        search: String,

        /// Directory receiving the newest build.
        #[arg(long, env = "QCSYNC_TARGET", value_name = "DIR")]
        target: String,

        /// Minutes between scans.
        #[arg(
            long,
            env = "QCSYNC_INTERVAL",
            value_name = "MINUTES",
            default_value_t = DEFAULT_CHECK_INTERVAL_MINUTES.to_string()
        )]
        interval: String,

        /// Version pattern with exactly one capture group (case-insensitive).
        #[arg(long, env = "QCSYNC_PATTERN", value_name = "REGEX", default_value = DEFAULT_VERSION_PATTERN)]
        pattern: String,

        /// Only track the newest version; never copy or delete.
        #[arg(long, env = "QCSYNC_NO_AUTO_COPY")]
        no_auto_copy: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::new(format)
        .with_pretty(cli.pretty)
        .with_color(!cli.no_color);

    match cli.command {
        Commands::Scan { search, pattern } => {
            let pattern = VersionPattern::new(&pattern)?;
            crate::backends::scan::run_scan(&search, &pattern, render_config)
        }

        Commands::Sync {
            search,
            target,
            pattern,
        } => {
            let pattern = VersionPattern::new(&pattern)?;
            crate::backends::sync::run_sync(&search, &target, &pattern, render_config)
        }

        Commands::Watch {
            search,
            target,
            interval,
            pattern,
            no_auto_copy,
        } => {
            let config = RawConfig {
                search_path: search,
                target_path: target,
                check_interval: interval,
                version_pattern: pattern,
                auto_copy: !no_auto_copy,
            }
            .validate()?;
            crate::backends::watch::run_watch(config, render_config, cli.quiet)
        }
    }
}
