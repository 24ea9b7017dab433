//! errside: Show Go error checks beside the statements they check.
//!
//! Usage:
//!   errside [options] <dir>...
//!
//! Every Go file of each directory is printed to stdout, preceded by a
//! `== file <path> ==` header, with each `if err != nil` that directly
//! follows the assignment of `err` moved to the side column. Source files
//! are never written.

use clap::Parser as ClapParser;
use errside_compiler::process_dir;
use errside_options::{find_config_file, parse_config_file, RenderOptions};
use errside_printer::RenderConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "errside", about = "Move Go error checks to a side column")]
struct Cli {
    /// Directories of Go packages to process.
    #[arg(value_name = "DIR", required = true)]
    dirs: Vec<PathBuf>,

    /// Column the error checks start at [default: 40].
    #[arg(short = 'e', value_name = "COLUMN")]
    column: Option<usize>,

    /// Tab width used to compute columns [default: 8].
    #[arg(long = "tab-width", value_name = "N")]
    tab_width: Option<usize>,

    /// Pad the side column with spaces only.
    #[arg(long = "use-spaces")]
    use_spaces: bool,

    /// JSON configuration file (default ./errside.json if present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More logging on stderr; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> RenderOptions {
        RenderOptions {
            column: self.column,
            tab_width: self.tab_width,
            use_spaces: self.use_spaces.then_some(true),
        }
    }
}

/// Exit codes.
const EXIT_OK: i32 = 0;
const EXIT_FAILED_DIRS: i32 = 1;
const EXIT_FATAL: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            print_error(&message);
            process::exit(EXIT_FATAL);
        }
    };
    tracing::debug!(?config, "render configuration");

    process::exit(run(&cli.dirs, &config));
}

/// `RUST_LOG` wins when set; otherwise `-v` picks the level.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Flags over the configuration file over the defaults.
fn resolve_config(cli: &Cli) -> Result<RenderConfig, String> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(Path::new(".")),
    };
    let file = match path {
        Some(path) => parse_config_file(&path).map_err(|e| e.to_string())?,
        None => RenderOptions::default(),
    };
    file.merge(cli.overrides()).resolve().map_err(|e| e.to_string())
}

/// Process every directory, reporting failures as `<dir>: <message>` on
/// stdout and carrying on. A fatal error stops the run at once.
fn run(dirs: &[PathBuf], config: &RenderConfig) -> i32 {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(dirs, config, &mut out)
}

/// [`run`] against any writer. Output that cannot be written is logged and
/// fails the run.
fn run_to(dirs: &[PathBuf], config: &RenderConfig, out: &mut dyn Write) -> i32 {
    let mut code = EXIT_OK;

    for dir in dirs {
        match process_dir(dir, config, out) {
            Ok(report) => {
                tracing::info!(dir = %dir.display(), files = report.files, composites = report.composites, "processed");
            }
            Err(err) if err.is_fatal() => {
                if let Err(e) = out.flush() {
                    tracing::warn!(error = %e, "flushing output failed");
                }
                print_error(&err.to_string());
                return EXIT_FATAL;
            }
            Err(err) => {
                if let Err(e) = writeln!(out, "{}: {}", dir.display(), err) {
                    tracing::warn!(dir = %dir.display(), error = %e, "writing failure report failed");
                }
                code = EXIT_FAILED_DIRS;
            }
        }
    }

    if let Err(e) = out.flush() {
        tracing::warn!(error = %e, "flushing output failed");
        code = code.max(EXIT_FAILED_DIRS);
    }
    code
}

fn print_error(msg: &str) {
    eprintln!("errside: {}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["errside", "-e", "48", "--use-spaces", "-vv", "a", "b"]).unwrap();
        assert_eq!(cli.dirs, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.verbose, 2);
        let overrides = cli.overrides();
        assert_eq!(overrides.column, Some(48));
        assert_eq!(overrides.tab_width, None);
        assert_eq!(overrides.use_spaces, Some(true));
    }

    #[test]
    fn test_no_spaces_flag_leaves_file_setting() {
        let cli = Cli::try_parse_from(["errside", "."]).unwrap();
        let file = RenderOptions {
            use_spaces: Some(true),
            ..RenderOptions::default()
        };
        assert!(file.merge(cli.overrides()).resolve().unwrap().use_spaces);
    }

    /// Accepts writes, refuses to flush.
    struct Unflushable(Vec<u8>);

    impl Write for Unflushable {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    /// Refuses everything.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_directory_is_reported() {
        let mut out = Vec::new();
        let code = run_to(&[PathBuf::from("no/such/dir")], &RenderConfig::default(), &mut out);
        assert_eq!(code, EXIT_FAILED_DIRS);
        assert!(String::from_utf8(out).unwrap().starts_with("no/such/dir: "));
    }

    #[test]
    fn test_unwritable_report_still_fails_the_run() {
        let code = run_to(&[PathBuf::from("no/such/dir")], &RenderConfig::default(), &mut Closed);
        assert_eq!(code, EXIT_FAILED_DIRS);
    }

    #[test]
    fn test_flush_failure_fails_the_run() {
        let dir = std::env::temp_dir().join(format!("errside_cli_flush_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("p.go"), "package p\n").unwrap();

        let mut out = Unflushable(Vec::new());
        let code = run_to(&[dir.clone()], &RenderConfig::default(), &mut out);
        assert_eq!(code, EXIT_FAILED_DIRS);
        assert!(String::from_utf8(out.0).unwrap().ends_with("package p\n"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["errside"]).is_err());
        assert!(Cli::try_parse_from(["errside", "-e"]).is_err());
    }
}
