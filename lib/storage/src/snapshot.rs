// Snapshot archives of the steering vector set
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use steerx_core::VectorSnapshot;
use tracing::info;

const EXTENSION: &str = "snapshot";

/// Archive description for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDescription {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub version: u64,
    pub dimensions: Vec<String>,
    pub size: u64,
    pub checksum: String,
}

/// Archive contents
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotArchive {
    created_at: DateTime<Utc>,
    snapshot: VectorSnapshot,
}

pub struct SnapshotManager {
    snapshot_dir: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_dir: P) -> Result<Self> {
        let snapshot_dir = snapshot_dir.as_ref().to_path_buf();
        fs::create_dir_all(&snapshot_dir)
            .with_context(|| format!("creating snapshot dir {}", snapshot_dir.display()))?;
        Ok(Self { snapshot_dir })
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Timestamped name with microsecond resolution plus the snapshot version
    fn generate_snapshot_name(now: &DateTime<Utc>, version: u64) -> String {
        format!("vectors-{}-v{}.{}", now.format("%Y-%m-%d-%H-%M-%S-%6f"), version, EXTENSION)
    }

    /// Write a gzip-compressed archive of `snapshot`
    pub fn create(&self, snapshot: &VectorSnapshot) -> Result<SnapshotDescription> {
        let created_at = Utc::now();
        let name = Self::generate_snapshot_name(&created_at, snapshot.version());
        let archive = SnapshotArchive {
            created_at,
            snapshot: snapshot.clone(),
        };
        let path = self.write_archive(&name, &archive)?;

        let description = Self::describe(&path, &name, &archive)?;
        info!(
            name = %description.name,
            version = description.version,
            size = description.size,
            "created vector snapshot"
        );
        Ok(description)
    }

    /// Write `archive` under a fresh name. Never replaces an existing archive.
    fn write_archive(&self, name: &str, archive: &SnapshotArchive) -> Result<PathBuf> {
        let path = self.checked_path(name)?;
        let json_data = serde_json::to_vec(archive)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(&json_data)?;
        encoder.finish()?.flush()?;
        Ok(path)
    }

    /// All archives, newest first
    pub fn list(&self) -> Result<Vec<SnapshotDescription>> {
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.snapshot_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                let archive = Self::read_archive(&path)?;
                snapshots.push(Self::describe(&path, name, &archive)?);
            }
        }

        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.name.cmp(&a.name)));
        Ok(snapshots)
    }

    /// Load the vector set stored in archive `name`, re-checking its invariants
    pub fn load(&self, name: &str) -> Result<VectorSnapshot> {
        let path = self.path_of(name)?;
        let archive = Self::read_archive(&path)?;
        crate::file::revalidate(archive.snapshot)
            .with_context(|| format!("snapshot '{name}' holds invalid vectors"))
    }

    /// Verify an archive against a previously recorded checksum
    pub fn verify(&self, name: &str, checksum: &str) -> Result<bool> {
        let path = self.path_of(name)?;
        Ok(Self::checksum(&path)? == checksum)
    }

    /// Remove archive `name`. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.checked_path(name)?;
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Path of an archive name inside the snapshot dir. Names are plain file
    /// names with the archive extension.
    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        let path = Path::new(name);
        let plain = !name.contains(['/', '\\']) && !name.starts_with('.');
        if !plain || path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
            return Err(anyhow!("invalid snapshot name '{}'", name));
        }
        Ok(self.snapshot_dir.join(name))
    }

    fn path_of(&self, name: &str) -> Result<PathBuf> {
        let path = self.checked_path(name)?;
        if !path.exists() {
            return Err(anyhow!("Snapshot '{}' not found", name));
        }
        Ok(path)
    }

    fn read_archive(path: &Path) -> Result<SnapshotArchive> {
        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut json_data = Vec::new();
        decoder
            .read_to_end(&mut json_data)
            .with_context(|| format!("decompressing {}", path.display()))?;
        Ok(serde_json::from_slice(&json_data)?)
    }

    fn checksum(path: &Path) -> Result<String> {
        let file_data = fs::read(path)?;
        Ok(format!("{:x}", Sha256::digest(&file_data)))
    }

    fn describe(path: &Path, name: &str, archive: &SnapshotArchive) -> Result<SnapshotDescription> {
        Ok(SnapshotDescription {
            name: name.to_string(),
            created_at: archive.created_at,
            version: archive.snapshot.version(),
            dimensions: archive.snapshot.dimensions().into_iter().collect(),
            size: fs::metadata(path)?.len(),
            checksum: Self::checksum(path)?,
        })
    }
}
