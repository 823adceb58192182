// File: src/persistence.rs
use crate::cache::ResultCache;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Error};
use std::path::Path;
use tempfile::NamedTempFile;

/// Bump when the persisted layout changes. A file with a different
/// version loads as an empty cache rather than a decode error.
const CACHE_FORMAT_VERSION: u32 = 1;

/// The on-disk shape of the result cache.
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedCache {
    version: u32,
    cache: ResultCache,
}

/// Write the cache atomically: serialize into a temp file next to the
/// destination, then persist over it, so a crash mid-write can never
/// leave a truncated cache behind.
pub fn save_to_disk(cache: &ResultCache, path: &Path) -> Result<(), Error> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let state = PersistedCache {
        version: CACHE_FORMAT_VERSION,
        cache: cache.clone(),
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let writer = BufWriter::new(&temp_file);

    bincode::serialize_into(writer, &state)
        .map_err(|e| Error::new(std::io::ErrorKind::Other, e))?;

    temp_file.persist(path)?;
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<ResultCache, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let state: PersistedCache = bincode::deserialize_from(reader)?;

    if state.version != CACHE_FORMAT_VERSION {
        log::warn!(
            "cache file {} has format version {}, expected {}; starting empty",
            path.display(),
            state.version,
            CACHE_FORMAT_VERSION
        );
        return Ok(ResultCache::new());
    }

    Ok(state.cache)
}
