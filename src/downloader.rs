//! File and archive handling for driver artifacts.

use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Error;
use crate::http::Http;

/// Downloads `url` to `dest` unless the file is already present.
///
/// Returns `false` when the destination existed and no request was made.
/// There is no overwrite and no integrity check; an existing file is
/// trusted as-is.
pub async fn download(http: &Http, url: &str, dest: &Path) -> Result<bool, Error> {
    if dest.exists() {
        debug!(path = %dest.display(), "archive already present, skipping download");
        return Ok(false);
    }

    debug!(%url, path = %dest.display(), "downloading driver archive");
    http.download(url, dest).await?;
    Ok(true)
}

/// Extracts `archive` into `dest_dir`, dispatching on the file extension:
/// `.zip` archives are read in-process, `.tar.gz`/`.gz` are gunzipped and
/// unpacked. Optionally deletes the archive afterwards.
pub async fn extract(archive: &Path, dest_dir: &Path, delete_after: bool) -> Result<(), Error> {
    let extension = archive
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "zip" => {
            let archive_buf = archive.to_path_buf();
            let dest_buf = dest_dir.to_path_buf();
            tokio::task::spawn_blocking(move || unzip(&archive_buf, &dest_buf))
                .await
                .unwrap() // Propagate panics from the blocking task.
        }
        "gz" => {
            let archive_buf = archive.to_path_buf();
            let dest_buf = dest_dir.to_path_buf();
            tokio::task::spawn_blocking(move || untar(&archive_buf, &dest_buf))
                .await
                .unwrap() // Propagate panics from the blocking task.
        }
        _ => Err(Error::UnsupportedArchive {
            path: archive.to_path_buf(),
        }),
    }?;

    if delete_after {
        fs::remove_file(archive).await.map_err(|e| Error::Io {
            path: archive.to_path_buf(),
            source: e,
        })?;
    }

    Ok(())
}

fn unzip(archive_path: &Path, extract_to: &Path) -> Result<(), Error> {
    let file = std::fs::File::open(archive_path).map_err(|e| Error::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Zip {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    std::fs::create_dir_all(extract_to).map_err(|e| Error::Io {
        path: extract_to.to_path_buf(),
        source: e,
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| Error::Zip {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let outpath = match entry.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => continue,
        };

        if entry.name().ends_with('/') {
            std::fs::create_dir_all(&outpath).map_err(|e| Error::Io {
                path: outpath.clone(),
                source: e,
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut outfile = std::fs::File::create(&outpath).map_err(|e| Error::Io {
            path: outpath.clone(),
            source: e,
        })?;

        std::io::copy(&mut entry, &mut outfile).map_err(|e| Error::Io {
            path: outpath.clone(),
            source: e,
        })?;

        // Preserve executable bits recorded in the archive.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).map_err(
                    |e| Error::Io {
                        path: outpath.clone(),
                        source: e,
                    },
                )?;
            }
        }
    }

    Ok(())
}

fn untar(archive_path: &Path, extract_to: &Path) -> Result<(), Error> {
    let file = std::fs::File::open(archive_path).map_err(|e| Error::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    std::fs::create_dir_all(extract_to).map_err(|e| Error::Io {
        path: extract_to.to_path_buf(),
        source: e,
    })?;

    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.unpack(extract_to).map_err(|e| Error::Io {
        path: extract_to.to_path_buf(),
        source: e,
    })
}

/// Marks `path` executable. No-op on Windows.
pub fn make_executable(path: &Path) -> Result<(), Error> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        std::fs::set_permissions(path, permissions).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Searches `search_path` for the extracted driver executable.
///
/// Archives sometimes nest the binary inside a top-level directory, so this
/// walks the tree instead of assuming a flat layout.
pub fn find_binary(search_path: &Path, name: &str) -> Result<PathBuf, Error> {
    for entry in WalkDir::new(search_path).into_iter().flatten() {
        if let Some(file_name) = entry.path().file_name().and_then(|n| n.to_str()) {
            if file_name == name && entry.file_type().is_file() {
                return Ok(entry.path().to_path_buf());
            }
        }
    }

    Err(Error::BinaryNotFound {
        name: name.to_string(),
        path: search_path.to_path_buf(),
    })
}
