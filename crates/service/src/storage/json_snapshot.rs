use std::{
    collections::{BTreeMap, HashMap},
    ffi::OsString,
    path::{Path, PathBuf},
};

use models::student::{StudentId, StudentRecord};
use serde::Serialize;
use tokio::fs;

use crate::errors::ServiceError;

/// Largest id accepted from disk. Keeps ids representable as signed JSON
/// integers and leaves the counter room to advance.
pub const MAX_STUDENT_ID: StudentId = i64::MAX as StudentId;

/// In-memory image of the persisted state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub records: HashMap<StudentId, StudentRecord>,
    /// Next id of the monotonic counter. `None` when the sidecar is absent
    /// or the registry does not use a counter.
    pub next_id: Option<StudentId>,
}

/// JSON document on disk holding every student keyed by stringified id.
///
/// Writes go to `<file>.tmp` and are renamed over the target, so a crash
/// mid-flush leaves either the old or the new document, never a truncated one.
/// The id counter lives in a `<file>.seq` sidecar so the document keeps its
/// plain `{"<id>": {...}}` layout.
#[derive(Clone, Debug)]
pub struct JsonSnapshotFile {
    file_path: PathBuf,
    seq_path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    let tmp = with_suffix(path, ".tmp");
    // Stage the full payload next to the target.
    fs::write(&tmp, data)
        .await
        .map_err(|e| ServiceError::io(format!("write {}", tmp.display()), e))?;
    // Rename is atomic within a filesystem; readers see old or new, never partial.
    fs::rename(&tmp, path)
        .await
        .map_err(|e| ServiceError::io(format!("rename {} -> {}", tmp.display(), path.display()), e))
}

impl JsonSnapshotFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let file_path = path.into();
        let seq_path = with_suffix(&file_path, ".seq");
        Self { file_path, seq_path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and decode the document. A missing file is `Io`, a malformed one `Decode`.
    /// An unreadable counter sidecar is ignored; the registry rebuilds it from the keys.
    pub async fn load(&self) -> Result<Snapshot, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::io(format!("read {}", self.file_path.display()), e))?;
        let records = decode_document(&bytes)?;
        let next_id = match fs::read_to_string(&self.seq_path).await {
            Ok(s) => s.trim().parse::<StudentId>().ok().filter(|n| *n <= MAX_STUDENT_ID),
            Err(_) => None,
        };
        Ok(Snapshot { records, next_id })
    }

    /// Overwrite the document (and the counter sidecar when present) with `snapshot`.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::io(format!("create {}", parent.display()), e))?;
            }
        }
        let data = encode_document(&snapshot.records)?;
        write_atomic(&self.file_path, &data).await?;
        if let Some(next_id) = snapshot.next_id {
            write_atomic(&self.seq_path, next_id.to_string().as_bytes()).await?;
        }
        Ok(())
    }
}

/// Pretty-print with four-space indentation, keys in ascending id order.
pub fn encode_document(records: &HashMap<StudentId, StudentRecord>) -> Result<Vec<u8>, ServiceError> {
    let ordered: BTreeMap<StudentId, &StudentRecord> = records.iter().map(|(k, v)| (*k, v)).collect();
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    ordered
        .serialize(&mut ser)
        .map_err(|e| ServiceError::Io(format!("encode registry: {e}")))?;
    Ok(buf)
}

/// Decode a document, checking every key is an integer in `1..=MAX_STUDENT_ID`
/// equal to its record's `ID`.
pub fn decode_document(bytes: &[u8]) -> Result<HashMap<StudentId, StudentRecord>, ServiceError> {
    let raw: HashMap<String, StudentRecord> =
        serde_json::from_slice(bytes).map_err(|e| ServiceError::Decode(e.to_string()))?;
    let mut records = HashMap::with_capacity(raw.len());
    for (key, record) in raw {
        let id = match key.parse::<StudentId>() {
            Ok(id) if (1..=MAX_STUDENT_ID).contains(&id) => id,
            _ => return Err(ServiceError::Decode(format!("invalid student key {key:?}"))),
        };
        if record.id != id {
            return Err(ServiceError::Decode(format!("record under key {id} has ID {}", record.id)));
        }
        records.insert(id, record);
    }
    Ok(records)
}
