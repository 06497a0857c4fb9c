//! Counter snapshots and the sources they are read from.
//!
//! A counter source is a line-oriented table in kstat format:
//!
//! ```text
//! 13 1 0x01 147 39984 5817075592 1238391584928
//! name                            type data
//! hits                            4    1284379
//! misses                          4    184939
//! ```
//!
//! The first two lines are a header and are always discarded. Every other
//! non-empty line must have exactly three whitespace-separated fields.

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::CollectError;
use crate::watchdog::run_with_timeout;

/// Number of header lines skipped at the top of every counter table.
pub const HEADER_LINES: usize = 2;

/// Accepted counter values: signed and unsigned 64-bit kstat data types.
/// Differences and small sums of values in this range fit an `i128`.
pub const COUNTER_RANGE: RangeInclusive<i128> = (i64::MIN as i128)..=(u64::MAX as i128);

/// Full set of counters captured at one point in time.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    values: HashMap<String, i128>,
    captured_at: Instant,
}

impl CounterSnapshot {
    pub fn new(values: HashMap<String, i128>) -> Self {
        Self {
            values,
            captured_at: Instant::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<i128> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i128)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

/// Parses a counter table into a name → value map.
///
/// Line numbers in `MalformedRecord` are 1-based and count the header.
pub fn parse_counter_table(content: &str) -> Result<HashMap<String, i128>, CollectError> {
    let mut values = HashMap::new();

    for (idx, line) in content.lines().enumerate().skip(HEADER_LINES) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = || CollectError::MalformedRecord {
            line: idx + 1,
            content: line.to_string(),
        };

        let mut fields = line.split_whitespace();
        let (name, _kind, raw) = match (fields.next(), fields.next(), fields.next(), fields.next())
        {
            (Some(name), Some(kind), Some(raw), None) => (name, kind, raw),
            _ => return Err(malformed()),
        };

        let value: i128 = raw.parse().map_err(|_| malformed())?;
        if !COUNTER_RANGE.contains(&value) {
            return Err(malformed());
        }
        values.insert(name.to_string(), value);
    }

    Ok(values)
}

/// A source of counter snapshots.
#[async_trait]
pub trait SnapshotReader: Send + Sync {
    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;

    /// Reads the full current counter set.
    async fn read(&self) -> Result<CounterSnapshot, CollectError>;
}

/// Reads counters from a kstat pseudo-file such as `/proc/spl/kstat/zfs/arcstats`.
#[derive(Debug, Clone)]
pub struct KstatFileReader {
    path: PathBuf,
}

impl KstatFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotReader for KstatFileReader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<CounterSnapshot, CollectError> {
        // procfs reads are served from kernel memory and never block for long
        let bytes =
            fs::read(&self.path).map_err(|e| CollectError::unavailable(self.describe(), e))?;
        let content = String::from_utf8(bytes).map_err(|e| CollectError::MalformedRecord {
            line: 0,
            content: format!("{} is not valid UTF-8: {}", self.describe(), e),
        })?;
        Ok(CounterSnapshot::new(parse_counter_table(&content)?))
    }
}

/// Reads counters from the standard output of a command (e.g. `kstat -p` wrappers).
#[derive(Debug, Clone)]
pub struct CommandReader {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandReader {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl SnapshotReader for CommandReader {
    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn read(&self) -> Result<CounterSnapshot, CollectError> {
        let stdout = run_with_timeout(&self.program, &self.args, self.timeout).await?;
        Ok(CounterSnapshot::new(parse_counter_table(&stdout)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ARCSTATS: &str = "13 1 0x01 147 39984 5817075592 1238391584928
name                            type data
hits                            4    1284379
misses                          4    184939

size                            4    2147483648
memory_available_bytes          3    -41943040
";

    #[test]
    fn test_parse_counter_table() {
        let values = parse_counter_table(ARCSTATS).expect("valid table");
        assert_eq!(values.len(), 4);
        assert_eq!(values["hits"], 1284379);
        assert_eq!(values["misses"], 184939);
        assert_eq!(values["size"], 2147483648);
        assert_eq!(values["memory_available_bytes"], -41943040);
    }

    #[test]
    fn test_header_is_skipped_regardless_of_content() {
        // The header lines here would parse as valid records; they must still be dropped.
        let content = "hits 4 1\nmisses 4 2\nc 4 3\n";
        let values = parse_counter_table(content).expect("valid table");
        assert_eq!(values.len(), 1);
        assert_eq!(values["c"], 3);
    }

    #[test]
    fn test_header_only_yields_empty_table() {
        let values = parse_counter_table("13 1 0x01\nname type data\n").expect("valid");
        assert!(values.is_empty());
    }

    #[test]
    fn test_two_fields_is_malformed() {
        let content = "header\nheader\nhits 4 10\nmisses 20\n";
        match parse_counter_table(content) {
            Err(CollectError::MalformedRecord { line, content }) => {
                assert_eq!(line, 4);
                assert_eq!(content, "misses 20");
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_four_fields_is_malformed() {
        let content = "header\nheader\nhits 4 10 extra\n";
        assert!(matches!(
            parse_counter_table(content),
            Err(CollectError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn test_non_numeric_value_is_malformed() {
        let content = "header\nheader\nhits 4 lots\n";
        assert!(matches!(
            parse_counter_table(content),
            Err(CollectError::MalformedRecord { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_reader() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("arcstats");
        std::fs::write(&path, ARCSTATS).expect("Failed to write arcstats");

        let snapshot = KstatFileReader::new(&path).read().await.expect("readable");
        assert_eq!(snapshot.get("hits"), Some(1284379));
        assert!(!snapshot.contains("l2_size"));
    }

    #[test]
    fn test_values_outside_64_bit_range_are_malformed() {
        let content = "header\nheader\nhits 4 -170141183460469231731687303715884105728\n";
        assert!(matches!(
            parse_counter_table(content),
            Err(CollectError::MalformedRecord { line: 3, .. })
        ));

        let content = "header\nheader\nhits 4 18446744073709551616\n";
        assert!(parse_counter_table(content).is_err());

        let content = "header\nheader\nhits 4 18446744073709551615\nfree 3 -9223372036854775808\n";
        let values = parse_counter_table(content).expect("64-bit extremes are valid");
        assert_eq!(values["hits"], u64::MAX as i128);
        assert_eq!(values["free"], i64::MIN as i128);
    }

    #[tokio::test]
    async fn test_file_reader_invalid_utf8_is_malformed() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("arcstats");
        std::fs::write(&path, b"header\nheader\nhits 4 \xff\xfe\n").expect("write");

        assert!(matches!(
            KstatFileReader::new(&path).read().await,
            Err(CollectError::MalformedRecord { line: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_file_reader_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let reader = KstatFileReader::new(dir.path().join("arcstats"));
        assert!(matches!(
            reader.read().await,
            Err(CollectError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_command_reader() {
        let reader = CommandReader::new(
            "sh",
            vec!["-c".into(), "printf 'h\\nh\\nhits 4 7\\n'".into()],
            Duration::from_secs(5),
        );
        let snapshot = reader.read().await.expect("command output");
        assert_eq!(snapshot.get("hits"), Some(7));
        assert!(reader.describe().starts_with("sh -c"));
    }
}
