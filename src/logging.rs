use std::path::Path;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

pub const LOG_FILE_PREFIX: &str = "app";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const DEFAULT_LOG_DIR: &str = "logs";
/// Rotated files kept on disk, one per day.
pub const LOG_RETENTION: usize = 7;

/// Daily rotating `app.<date>.log` files under `dir`.
///
/// Fails when the directory cannot be created or written, e.g. on a
/// read-only filesystem; callers then log to the console only.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_RETENTION)
        .build(dir)
}
