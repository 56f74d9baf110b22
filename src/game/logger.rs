//! Bump-allocating duel logger
//!
//! Messages are formatted into a scratch [`Bump`] arena and only copied into an
//! owned `String` when they are actually printed or captured. The arena is reset
//! after every message so it never grows past the longest line.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::fmt::Write as FmtWrite;
use std::ops::Deref;

/// Verbosity level for duel output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output
    Silent = 0,
    /// Minimal - only duel outcome and fatal problems
    Minimal = 1,
    /// Normal - phases, activations and resolutions (default)
    #[default]
    Normal = 2,
    /// Verbose - costs, lingering expiry, trigger scans
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Subsystem that produced the line ("phase", "chain", "cost", ...)
    pub category: Option<&'static str>,
}

/// Read-only view over captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Log through a state's logger without paying for formatting when the
/// `verbose-logging` feature is off
///
/// ```ignore
/// game_log!(self, Normal, "chain", "{} activates {}", player, card);
/// ```
#[macro_export]
macro_rules! game_log {
    ($state:expr, $level:ident, $category:expr, $($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            $state.logger.log_fmt(
                $crate::game::VerbosityLevel::$level,
                $category,
                format_args!($($arg)*),
            );
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$state;
        }
    }};
}

/// Centralized logger carried by every [`GameState`](crate::game::GameState)
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,

    /// Scratch arena for message formatting, reset after each message
    format_bump: RefCell<Bump>,

    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture into memory and stop printing
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn disable_capture(&mut self) {
        self.output_mode = OutputMode::Stdout;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Captured entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
        self.format_bump.borrow_mut().reset();
    }

    /// Print buffered entries allowed by the verbosity, then clear the buffer
    pub fn flush_buffer(&mut self) {
        let buffer = self.log_buffer.borrow();
        for entry in buffer.iter() {
            if entry.level <= self.verbosity {
                Self::log_to_stdout(entry.level, &entry.message);
            }
        }
        drop(buffer);
        self.clear_logs();
    }

    #[inline]
    fn log_to_stdout(level: VerbosityLevel, message: &str) {
        if level == VerbosityLevel::Minimal {
            println!("{message}");
        } else {
            println!("  {message}");
        }
    }

    /// Format `args` in the scratch arena and emit it at `level`
    pub fn log_fmt(&self, level: VerbosityLevel, category: &'static str, args: fmt::Arguments<'_>) {
        if level == VerbosityLevel::Silent {
            return;
        }
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both)
            && level <= self.verbosity;
        if !should_capture && !should_output {
            return;
        }

        let mut bump = self.format_bump.borrow_mut();
        {
            let mut scratch = bumpalo::collections::String::new_in(&bump);
            if scratch.write_fmt(args).is_err() {
                return;
            }
            if should_output {
                Self::log_to_stdout(level, &scratch);
            }
            if should_capture {
                self.log_buffer.borrow_mut().push(LogEntry {
                    level,
                    message: scratch.as_str().to_string(),
                    category: Some(category),
                });
            }
        }
        bump.reset();
    }

    pub fn minimal(&self, message: &str) {
        self.log_fmt(VerbosityLevel::Minimal, "duel", format_args!("{message}"));
    }

    pub fn normal(&self, message: &str) {
        self.log_fmt(VerbosityLevel::Normal, "duel", format_args!("{message}"));
    }

    pub fn verbose(&self, message: &str) {
        self.log_fmt(VerbosityLevel::Verbose, "duel", format_args!("{message}"));
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

/// Clones carry settings only; the captured buffer stays with the original
impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}

impl Serialize for GameLogger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("GameLogger", 2)?;
        state.serialize_field("verbosity", &self.verbosity)?;
        state.serialize_field("output_mode", &self.output_mode)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for GameLogger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GameLoggerData {
            #[serde(default)]
            verbosity: VerbosityLevel,
            #[serde(default)]
            output_mode: OutputMode,
        }

        let data = GameLoggerData::deserialize(deserializer)?;
        let mut logger = GameLogger::with_verbosity(data.verbosity);
        logger.output_mode = data.output_mode;
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert!(!logger.is_capturing());
    }

    #[test]
    fn test_log_capture() {
        let mut logger = GameLogger::new();
        logger.enable_capture();

        logger.normal("test message");
        logger.minimal("minimal message");
        logger.log_fmt(VerbosityLevel::Verbose, "chain", format_args!("link {}", 2));

        let logs = logger.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "test message");
        assert_eq!(logs[1].message, "minimal message");
        assert_eq!(logs[2].message, "link 2");
        assert_eq!(logs[2].category, Some("chain"));
    }

    #[test]
    fn test_silent_level_never_captured() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        logger.log_fmt(VerbosityLevel::Silent, "duel", format_args!("nothing"));
        assert!(logger.logs().is_empty());
    }

    struct Holder {
        logger: GameLogger,
    }

    #[test]
    fn test_game_log_as_match_arm() {
        let mut holder = Holder {
            logger: GameLogger::new(),
        };
        holder.logger.enable_capture();
        for target in [Some(7), None] {
            match target {
                Some(t) => game_log!(holder, Normal, "combat", "attacks card {}", t),
                None => game_log!(holder, Normal, "combat", "attacks directly"),
            }
        }
        #[cfg(feature = "verbose-logging")]
        {
            let logs = holder.logger.logs();
            assert_eq!(logs.len(), 2);
            assert_eq!(logs[0].message, "attacks card 7");
            assert_eq!(logs[1].message, "attacks directly");
        }
    }

    #[test]
    fn test_flush_buffer() {
        let mut logger = GameLogger::new();
        logger.enable_capture();

        logger.normal("message 1");
        logger.normal("message 2");
        assert_eq!(logger.logs().len(), 2);

        logger.flush_buffer();
        assert_eq!(logger.logs().len(), 0);
    }

    #[test]
    fn test_clone_and_serde_drop_buffer() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        logger.normal("captured");

        let clone = logger.clone();
        assert!(clone.logs().is_empty());
        assert_eq!(clone.verbosity(), VerbosityLevel::Verbose);

        let json = serde_json::to_string(&logger).unwrap();
        let back: GameLogger = serde_json::from_str(&json).unwrap();
        assert_eq!(back.verbosity(), VerbosityLevel::Verbose);
        assert_eq!(back.output_mode(), OutputMode::Memory);
        assert!(back.logs().is_empty());
    }
}
