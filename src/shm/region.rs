//! Named shared-memory regions with a file-like lifecycle.
//!
//! Regions are addressed by leading-slash POSIX shared-memory names and
//! backed by files under `/dev/shm`, so unrelated processes can attach by
//! name. The engine process `create`s each region; consumers `open` it;
//! whoever owns shutdown calls `unlink` so no new opens succeed (existing
//! mappings stay valid until dropped).

use memmap2::MmapMut;
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::mem::size_of;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ShmError;

/// Directory backing POSIX shared-memory names on Linux.
const SHM_DIR: &str = "/dev/shm";

/// A typed mapping of one named shared-memory region.
///
/// `T` must be a `#[repr(C)]` header type whose all-zero byte pattern is a
/// valid initial state; `create` relies on the kernel zero-filling the
/// backing file. Exactly one producer process writes through the header's
/// atomics; any number of readers may attach.
pub struct SharedRegion<T> {
    name: String,
    mmap: MmapMut,
    _marker: PhantomData<T>,
}

// SAFETY: the mapping is owned, page-aligned and lives as long as the
// region; all shared mutation goes through the atomics of `T`, which is
// required to be Sync.
unsafe impl<T: Sync> Send for SharedRegion<T> {}
unsafe impl<T: Sync> Sync for SharedRegion<T> {}

impl<T> SharedRegion<T> {
    /// Create (or re-create) the named region sized to `T`, mapped
    /// read-write and zero-initialised.
    pub fn create(name: &str) -> Result<Self, ShmError> {
        let path = backing_path(name)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| ShmError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?;

        // A fresh length extends with zero pages, which is the valid
        // initial state for every header type used here.
        file.set_len(size_of::<T>() as u64).map_err(|e| ShmError::Io {
            message: e.to_string(),
            path: Some(path.clone()),
        })?;

        // SAFETY: the backing file was just created by this process and is
        // not truncated while the mapping is live.
        let mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|e| ShmError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
        };

        debug!("created shared memory region {} ({} bytes)", name, size_of::<T>());
        Ok(Self {
            name: name.to_string(),
            mmap,
            _marker: PhantomData,
        })
    }

    /// Attach to an existing named region read-write.
    ///
    /// Consumers that only read snapshots still attach read-write because
    /// the trade-ring consumer publishes its head index into the region.
    pub fn open(name: &str) -> Result<Self, ShmError> {
        let path = backing_path(name)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| ShmError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?;

        let len = file
            .metadata()
            .map_err(|e| ShmError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
            .len() as usize;
        if len < size_of::<T>() {
            return Err(ShmError::SizeMismatch {
                name: name.to_string(),
                expected: size_of::<T>(),
                actual: len,
            });
        }

        // SAFETY: the region was sized by its creator and checked above;
        // the producer never truncates a live region.
        let mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|e| ShmError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
        };

        debug!("opened shared memory region {}", name);
        Ok(Self {
            name: name.to_string(),
            mmap,
            _marker: PhantomData,
        })
    }

    /// The shared header at the start of the region.
    #[must_use]
    pub fn get(&self) -> &T {
        // SAFETY: the mapping is page-aligned (satisfying T's alignment),
        // at least size_of::<T>() bytes (checked at create/open), and T's
        // all-zero bit pattern is valid by the contract of this module.
        unsafe { &*(self.mmap.as_ptr() as *const T) }
    }

    /// The region's POSIX name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Remove a region name so no new opens succeed. Existing mappings remain
/// valid until dropped.
pub fn unlink(name: &str) -> Result<(), ShmError> {
    let path = backing_path(name)?;
    fs::remove_file(&path).map_err(|e| ShmError::Io {
        message: e.to_string(),
        path: Some(path),
    })?;
    debug!("unlinked shared memory region {}", name);
    Ok(())
}

/// Translates a POSIX shm name (`/name`) into its backing file path.
fn backing_path(name: &str) -> Result<PathBuf, ShmError> {
    let stripped = name.strip_prefix('/').ok_or_else(|| ShmError::InvalidName {
        name: name.to_string(),
    })?;
    if stripped.is_empty() || stripped.contains('/') {
        return Err(ShmError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(Path::new(SHM_DIR).join(stripped))
}
