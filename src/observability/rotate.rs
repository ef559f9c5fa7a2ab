//! Size-bounded rotating log files.
//!
//! When a write would push the active file past `max_size`, the file is renamed
//! to `<stem>-<UTC timestamp>.log`, a fresh file is opened, and the backups are
//! milled: gzip-compressed, pruned by age and pruned by count.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use flate2::write::GzEncoder;
use flate2::Compression;

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.9f";

/// Retention settings for one rotating file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Maximum bytes in the active file.
    pub max_size: u64,
    /// Backups older than this are removed. `None` keeps them.
    pub max_age: Option<Duration>,
    /// Number of backups to retain. 0 keeps all.
    pub max_backups: usize,
    /// Gzip rotated files.
    pub compress: bool,
}

impl RotationPolicy {
    /// Build a policy from configuration units (megabytes, days).
    pub fn from_units(max_size_mb: u64, max_age_days: u64, max_backups: usize) -> Self {
        let max_size_mb = if max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            max_size_mb
        };
        Self {
            max_size: max_size_mb * MEGABYTE,
            max_age: (max_age_days > 0).then(|| Duration::from_secs(max_age_days * SECONDS_PER_DAY)),
            max_backups,
            compress: true,
        }
    }
}

/// An append-only file that rotates itself once it grows past its policy.
///
/// Not synchronized; callers wrap it in a mutex.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    policy: RotationPolicy,
}

impl RotatingFile {
    /// Open (or create) the active file in append mode.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            size,
            policy,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record followed by a newline, rotating first if needed.
    ///
    /// A record never straddles two files.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let len = line.len() as u64 + 1;
        if len > self.policy.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "record of {} bytes exceeds maximum file size {}",
                    len, self.policy.max_size
                ),
            ));
        }

        if self.size + len > self.policy.max_size {
            self.rotate()?;
        }

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.file.write_all(&buf)?;
        self.size += len;
        Ok(())
    }

    /// Flush and fsync the active file.
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }

    /// Close the active file, move it aside and start a new one.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let backup = self.next_backup_path();
        fs::rename(&self.path, &backup)?;

        self.file = open_append(&self.path)?;
        self.size = 0;

        if let Err(e) = self.mill() {
            // the tracing pipeline ends here, so stderr is the only place left
            eprintln!("log rotation cleanup failed for {}: {}", self.path.display(), e);
        }
        Ok(())
    }

    /// Rotated files belonging to this log, newest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.list_backups()?.into_iter().map(|(p, _)| p).collect())
    }

    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        (stem, ext)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn next_backup_path(&self) -> PathBuf {
        let (stem, ext) = self.stem_and_ext();
        let stamp = chrono::Utc::now().format(BACKUP_TIME_FORMAT);
        let base = format!("{stem}-{stamp}");

        let mut candidate = self.dir().join(format!("{base}.{ext}"));
        let mut n = 1;
        while candidate.exists() || gz_path(&candidate).exists() {
            candidate = self.dir().join(format!("{base}-{n}.{ext}"));
            n += 1;
        }
        candidate
    }

    fn list_backups(&self) -> io::Result<Vec<(PathBuf, SystemTime)>> {
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{stem}-");
        let plain = format!(".{ext}");
        let compressed = format!(".{ext}.gz");

        let mut backups = Vec::new();
        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&prefix) {
                continue;
            }
            if !(name.ends_with(&plain) || name.ends_with(&compressed)) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            backups.push((entry.path(), modified));
        }

        // names embed the rotation time, so they break mtime ties
        backups.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| backup_key(&b.0).cmp(&backup_key(&a.0)))
        });
        Ok(backups)
    }

    fn mill(&self) -> io::Result<()> {
        let mut backups = self.list_backups()?;
        let mut expired = Vec::new();

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            expired.extend(backups.split_off(self.policy.max_backups));
        }

        if let Some(max_age) = self.policy.max_age {
            if let Some(cutoff) = SystemTime::now().checked_sub(max_age) {
                let (keep, old): (Vec<_>, Vec<_>) =
                    backups.into_iter().partition(|(_, modified)| *modified >= cutoff);
                backups = keep;
                expired.extend(old);
            }
        }

        for (path, _) in expired {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        if self.policy.compress {
            for (path, _) in backups {
                if path.extension().and_then(|e| e.to_str()) != Some("gz") {
                    compress_file(&path)?;
                }
            }
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn backup_key(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.strip_suffix(".gz").unwrap_or(name).to_string()
}

/// Gzip `path` into `path.gz` and remove the original.
fn compress_file(path: &Path) -> io::Result<()> {
    let mut source = File::open(path)?;
    let target = File::create(gz_path(path))?;
    let mut encoder = GzEncoder::new(target, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?;
    fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn small_policy(max_size: u64, max_backups: usize, compress: bool) -> RotationPolicy {
        RotationPolicy {
            max_size,
            max_age: None,
            max_backups,
            compress,
        }
    }

    #[test]
    fn test_policy_from_units() {
        let policy = RotationPolicy::from_units(0, 0, 3);
        assert_eq!(policy.max_size, 100 * MEGABYTE);
        assert_eq!(policy.max_age, None);
        assert_eq!(policy.max_backups, 3);
        assert!(policy.compress);

        let policy = RotationPolicy::from_units(5, 2, 0);
        assert_eq!(policy.max_size, 5 * MEGABYTE);
        assert_eq!(policy.max_age, Some(Duration::from_secs(2 * SECONDS_PER_DAY)));
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.log");

        {
            let mut file = RotatingFile::open(&path, small_policy(1024, 0, false)).unwrap();
            file.write_line("first").unwrap();
        }
        {
            let mut file = RotatingFile::open(&path, small_policy(1024, 0, false)).unwrap();
            file.write_line("second").unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.log");
        let mut file = RotatingFile::open(&path, small_policy(16, 0, false)).unwrap();

        file.write_line("0123456789").unwrap(); // 11 bytes
        file.write_line("abcdefghij").unwrap(); // would be 22 -> rotate first

        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghij\n");
        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "0123456789\n");
        let name = backups[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("default-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_compresses_backups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("error.log");
        let mut file = RotatingFile::open(&path, small_policy(16, 0, true)).unwrap();

        file.write_line("0123456789").unwrap();
        file.write_line("abcdefghij").unwrap();

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].extension().unwrap(), "gz");

        let mut decoder = flate2::read::GzDecoder::new(File::open(&backups[0]).unwrap());
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert_eq!(content, "0123456789\n");
    }

    #[test]
    fn test_keeps_at_most_max_backups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.log");
        let mut file = RotatingFile::open(&path, small_policy(8, 2, false)).unwrap();

        for i in 0..6 {
            file.write_line(&format!("line-{i}")).unwrap(); // 7 bytes each, one per file
        }

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 2);
        // newest backups survive
        let contents: Vec<String> = backups
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert!(contents.contains(&"line-4\n".to_string()));
        assert!(contents.contains(&"line-3\n".to_string()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "line-5\n");
    }

    #[test]
    fn test_prunes_backups_older_than_max_age() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("default-2020-01-01T00-00-00.000000000.log");
        fs::write(&stale, "stale\n").unwrap();
        File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(2 * SECONDS_PER_DAY))
            .unwrap();

        let path = temp_dir.path().join("default.log");
        let policy = RotationPolicy {
            max_age: Some(Duration::from_secs(SECONDS_PER_DAY)),
            ..small_policy(8, 0, false)
        };
        let mut file = RotatingFile::open(&path, policy).unwrap();
        file.write_line("line-0").unwrap();
        file.write_line("line-1").unwrap();

        assert!(!stale.exists());
        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "line-0\n");
    }

    #[test]
    fn test_other_logs_in_directory_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("error-2020-01-01T00-00-00.000.log"), "x\n").unwrap();

        let path = temp_dir.path().join("default.log");
        let mut file = RotatingFile::open(&path, small_policy(8, 1, false)).unwrap();
        file.write_line("line-0").unwrap();
        file.write_line("line-1").unwrap();

        assert_eq!(file.backups().unwrap().len(), 1);
        assert!(temp_dir
            .path()
            .join("error-2020-01-01T00-00-00.000.log")
            .exists());
    }

    #[test]
    fn test_oversized_record_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.log");
        let mut file = RotatingFile::open(&path, small_policy(4, 0, false)).unwrap();

        let err = file.write_line("too long").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
