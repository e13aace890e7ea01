//! Log output for the `toolzer` binary.
//!
//! Records go to stderr so rendered reports on stdout stay clean, and
//! optionally to an append-only file opened after startup. The filter can be
//! swapped at runtime, which `watch` mode exposes as `:log <level>`.

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
        writer::OptionalWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `<local time> <LEVEL> <target> <fields>`, colored when the writer
/// supports ANSI escapes.
struct LocalFmt;

impl LocalFmt {
    fn painted(
        writer: &mut Writer<'_>,
        color: &str,
        text: impl std::fmt::Display,
    ) -> std::fmt::Result {
        if writer.has_ansi_escapes() {
            write!(writer, "{color}{text}{RESET} ")
        } else {
            write!(writer, "{text} ")
        }
    }
}

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();

        Self::painted(&mut writer, DIM, Local::now().format(TIMESTAMP))?;
        Self::painted(&mut writer, level_color(level), format_args!("{level:>5}"))?;
        Self::painted(&mut writer, CYAN, meta.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log file that can be opened once logging is already running.
///
/// Until a file is set every record for it is dropped.
#[derive(Clone, Default)]
struct LogFile(Arc<RwLock<Option<Arc<File>>>>);

/// Shared handle to the open file; `&File` implements `Write`.
struct SharedFile(Arc<File>);

impl Write for SharedFile {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

impl LogFile {
    fn replace(
        &self,
        file: File,
    ) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(file));
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = OptionalWriter<SharedFile>;

    fn make_writer(&'a self) -> Self::Writer {
        match &*self.0.read().unwrap_or_else(PoisonError::into_inner) {
            Some(file) => OptionalWriter::some(SharedFile(Arc::clone(file))),
            None => OptionalWriter::none(),
        }
    }
}

/// Handles kept after initialization to adjust logging at runtime.
struct LogControl {
    filter: reload::Handle<EnvFilter, Registry>,
    file: LogFile,
}

static CONTROL: OnceLock<LogControl> = OnceLock::new();

fn control() -> Result<&'static LogControl> {
    CONTROL
        .get()
        .ok_or_else(|| anyhow!("logging not yet initialized"))
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).with_context(|| format!("invalid log level '{directives}'"))
}

/// `RUST_LOG` wins over the command-line level.
fn make_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(level),
    }
}

/// Changes the active filter. Accepts a bare level such as `debug` or any
/// `EnvFilter` directive list.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter = parse_filter(level)?;
    control()?
        .filter
        .reload(filter)
        .map_err(|e| anyhow!("filter reload failed: {e}"))
}

/// Appends log records to `path` from now on, replacing any earlier file.
/// The parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    control()?.file.replace(file);
    Ok(())
}

/// Installs the global subscriber. Later calls leave the first one in place.
pub fn init_logging(level: &str) -> Result<()> {
    let (filter, filter_handle) = reload::Layer::new(make_filter(level)?);
    let file = LogFile::default();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(file.clone());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        bail_if_uncontrolled()?;
        return Ok(());
    }

    let _ = CONTROL.set(LogControl {
        filter: filter_handle,
        file,
    });
    Ok(())
}

fn bail_if_uncontrolled() -> Result<()> {
    if CONTROL.get().is_none() {
        bail!("another global subscriber is already installed");
    }
    Ok(())
}

/// Logs a failed background task under its name.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, ?error, "background task failed");
    }
}
