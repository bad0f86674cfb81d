//! CSV session loading and timestamp normalization.
//!
//! Thin I/O boundary in front of the pipeline: a data directory holds one
//! subdirectory per activity label, each with accelerometer recordings
//! (`time,x,y,z`) and optional gyroscope companions
//! (`<stem>_gyro.csv`, `time,gyro_x,gyro_y,gyro_z`). Raw recordings carry
//! integer nanosecond-since-epoch timestamps; [`rewrite_timestamps`]
//! converts them to RFC 3339 in place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use signal::Accelerometer;

const GYRO_SUFFIX: &str = "_gyro";

#[derive(Debug, thiserror::Error)]
#[error("expected csv file {path} is missing")]
pub struct MissingFileError {
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    MissingFile(#[from] MissingFileError),
    #[error("failed to read {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("bad timestamp {value:?} in {path}")]
    Timestamp { value: String, path: PathBuf },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, serde::Deserialize)]
struct AccelerometerRow {
    time: String,
    x: f64,
    y: f64,
    z: f64,
}

/// One labeled recording on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub label: String,
    pub path: PathBuf,
    /// Companion gyroscope file, when recorded
    pub gyro: Option<PathBuf>,
}

/// Walk `root`, one subdirectory per activity label, collecting every
/// accelerometer csv in a deterministic order. Gyroscope companions are
/// attached to their recording, never listed as sessions of their own.
pub fn labeled_sessions(root: &Path) -> Result<Vec<Session>, SessionError> {
    let mut sessions = Vec::new();

    for entry in read_dir(root)? {
        let label_dir = entry.path();

        if !label_dir.is_dir() {
            continue;
        }

        let label = entry.file_name().to_string_lossy().into_owned();

        for entry in read_dir(&label_dir)? {
            let path = entry.path();

            let is_recording = path.extension().is_some_and(|ext| ext == "csv")
                && !path
                    .file_stem()
                    .is_some_and(|stem| stem.to_string_lossy().ends_with(GYRO_SUFFIX));

            if !is_recording {
                continue;
            }

            sessions.push(Session {
                label: label.clone(),
                gyro: gyro_companion(&path),
                path,
            });
        }
    }

    sessions.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(sessions)
}

/// `<stem>_gyro.csv` next to an accelerometer recording, when present.
pub fn gyro_companion(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let companion = path.with_file_name(format!("{stem}{GYRO_SUFFIX}.csv"));

    companion.exists().then_some(companion)
}

/// Load one accelerometer recording. The `time` field is either a raw
/// integer (nanoseconds since epoch) or an already rewritten RFC 3339 stamp.
pub fn load_accelerometer(path: &Path) -> Result<Vec<Accelerometer>, SessionError> {
    if !path.exists() {
        return Err(MissingFileError {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|source| SessionError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = Vec::new();

    for row in reader.deserialize::<AccelerometerRow>() {
        let row = row.map_err(|source| SessionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let timestamp =
            parse_timestamp(&row.time).ok_or_else(|| SessionError::Timestamp {
                value: row.time.clone(),
                path: path.to_path_buf(),
            })?;

        samples.push(Accelerometer {
            timestamp,
            x: row.x,
            y: row.y,
            z: row.z,
        });
    }

    Ok(samples)
}

/// Convert integer nanosecond timestamps in the first column to RFC 3339,
/// rewriting the file in place. Schema-agnostic, so accelerometer and
/// gyroscope files go through the same path. Returns the number of rows
/// converted; already rewritten rows pass through unchanged.
pub fn rewrite_timestamps(path: &Path) -> Result<usize, SessionError> {
    if !path.exists() {
        return Err(MissingFileError {
            path: path.to_path_buf(),
        }
        .into());
    }

    let csv_error = |source| SessionError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    let mut converted = 0;

    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut fields = record.iter().map(str::to_owned).collect::<Vec<_>>();

        if let Some(first) = fields.first_mut() {
            if let Ok(nanos) = first.trim().parse::<i128>() {
                *first = OffsetDateTime::from_unix_timestamp_nanos(nanos)
                    .ok()
                    .and_then(|stamp| stamp.format(&Rfc3339).ok())
                    .ok_or_else(|| SessionError::Timestamp {
                        value: first.clone(),
                        path: path.to_path_buf(),
                    })?;
                converted += 1;
            }
        }

        rows.push(fields);
    }

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

    writer.write_record(&headers).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(converted)
}

fn read_dir(path: &Path) -> Result<Vec<std::fs::DirEntry>, SessionError> {
    let io_error = |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::read_dir(path)
        .map_err(io_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)
}

/// Raw integer nanoseconds since epoch, or an already rewritten RFC 3339
/// stamp.
fn parse_timestamp(value: &str) -> Option<Duration> {
    let value = value.trim();

    if let Ok(nanos) = value.parse::<u64>() {
        return Some(Duration::from_nanos(nanos));
    }

    let stamp = OffsetDateTime::parse(value, &Rfc3339).ok()?;

    u64::try_from(stamp.unix_timestamp_nanos())
        .ok()
        .map(Duration::from_nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("context-{}-{name}.csv", std::process::id()));
        fs::write(&path, content).expect("temp dir is writable");
        path
    }

    #[test]
    fn test_load_raw_nanosecond_timestamps() {
        let path = temp_csv(
            "load-raw",
            "time,x,y,z\n1000000000,1.0,2.0,2.0\n1020000000,0.0,3.0,4.0\n",
        );

        let samples = load_accelerometer(&path).expect("file exists");
        fs::remove_file(&path).expect("file exists");

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, Duration::from_secs(1));
        assert_eq!(samples[1].timestamp, Duration::from_millis(1020));
        assert!((samples[1].z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rewrite_then_reload_keeps_timestamps() {
        let path = temp_csv(
            "rewrite",
            "time,x,y,z\n1000000000,1.0,0.0,0.0\n1020000000,0.0,1.0,0.0\n",
        );

        let before = load_accelerometer(&path).expect("file exists");

        assert_eq!(rewrite_timestamps(&path).expect("file exists"), 2);
        // second pass finds nothing left to convert
        assert_eq!(rewrite_timestamps(&path).expect("file exists"), 0);

        let after = load_accelerometer(&path).expect("file exists");
        let raw = fs::read_to_string(&path).expect("file exists");
        fs::remove_file(&path).expect("file exists");

        assert_eq!(before, after);
        assert!(raw.contains("1970-01-01T00:00:01Z"));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("context-does-not-exist.csv");

        assert!(matches!(
            load_accelerometer(&path),
            Err(SessionError::MissingFile(_))
        ));
        assert!(matches!(
            rewrite_timestamps(&path),
            Err(SessionError::MissingFile(_))
        ));
    }

    #[test]
    fn test_labeled_sessions_skip_gyro_companions() {
        let root = std::env::temp_dir().join(format!("context-tree-{}", std::process::id()));
        let walking = root.join("walking");
        fs::create_dir_all(&walking).expect("temp dir is writable");

        fs::write(walking.join("a.csv"), "time,x,y,z\n").expect("temp dir is writable");
        fs::write(walking.join("a_gyro.csv"), "time,gyro_x,gyro_y,gyro_z\n")
            .expect("temp dir is writable");
        fs::write(walking.join("b.csv"), "time,x,y,z\n").expect("temp dir is writable");

        let sessions = labeled_sessions(&root).expect("tree exists");
        fs::remove_dir_all(&root).expect("tree exists");

        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|this| this.label == "walking"));
        assert_eq!(sessions[0].gyro.as_deref(), Some(walking.join("a_gyro.csv").as_path()));
        assert_eq!(sessions[1].gyro, None);
    }
}
