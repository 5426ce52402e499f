//! Archive extraction
//!
//! Native extraction of tar (plain, gz, xz, bz2, zst) and zip archives with
//! path-traversal and link-escape checks. Upstream release archives wrap
//! everything in a single `<project>-<version>/` directory; `strip_root`
//! removes it so the sources land directly in the destination.

use crate::core::output;
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect archive format from a file name or URL.
    pub fn detect(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let name = name.split('?').next().unwrap_or(&name);
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    // Lexically normalize a path (no filesystem access) to validate link
    // targets without following symlinks.
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

fn ensure_link_target_within_dest(dest: &Path, link_parent: &Path, link_name: &Path) -> Result<()> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        bail!("tar contains unsafe link target (absolute): {}", link_name.display());
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    let norm_dest = normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        bail!(
            "tar contains unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        );
    }

    Ok(())
}

fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path
        .strip_prefix(dest)
        .map_err(|_| anyhow::anyhow!("tar contains path outside destination: {}", full_path.display()))?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            bail!(
                "tar extraction blocked: symlink in path component: {}",
                cur.display()
            );
        }
    }

    Ok(())
}

fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().context("tar read error")? {
        let mut entry = entry.context("tar entry error")?;
        if matches!(
            entry.header().entry_type(),
            tar::EntryType::XGlobalHeader | tar::EntryType::XHeader
        ) {
            continue;
        }
        let path = entry.path().context("tar path error")?.into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            bail!("tar contains unsafe path: {}", path.display());
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let full_path = dest.join(&path);
        ensure_no_symlink_components(dest, &full_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry.link_name().context("tar link_name error")?;
            match link_name {
                Some(link_name) => {
                    let link_parent = full_path.parent().unwrap_or(dest);
                    ensure_link_target_within_dest(dest, link_parent, &link_name)?;
                }
                None => bail!("tar contains link without target: {}", path.display()),
            }
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }

        entry
            .unpack(&full_path)
            .with_context(|| format!("unpack error for {}", path.display()))?;
    }

    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("cannot open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("zip read error")?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).context("zip entry error")?;

        // Entries with unsafe paths are skipped
        let Some(enclosed) = file.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(enclosed);

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)
                .with_context(|| format!("cannot create directory {}", outpath.display()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }

        let mut outfile = File::create(&outpath)
            .with_context(|| format!("cannot create {}", outpath.display()))?;
        std::io::copy(&mut file, &mut outfile)
            .with_context(|| format!("write error for {}", outpath.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

fn unpack(archive_path: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let open = || -> Result<BufReader<File>> {
        let file = File::open(archive_path)
            .with_context(|| format!("cannot open {}", archive_path.display()))?;
        Ok(BufReader::new(file))
    };

    match format {
        ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(open()?), dest),
        ArchiveFormat::TarXz => extract_tar(xz2::read::XzDecoder::new(open()?), dest),
        ArchiveFormat::TarBz2 => extract_tar(bzip2::read::BzDecoder::new(open()?), dest),
        ArchiveFormat::TarZst => {
            let decoder = zstd::stream::read::Decoder::new(open()?).context("zstd init error")?;
            extract_tar(decoder, dest)
        }
        ArchiveFormat::Tar => extract_tar(open()?, dest),
        ArchiveFormat::Zip => extract_zip(archive_path, dest),
    }
}

/// Move the contents of the archive's single top-level directory into `dest`.
fn hoist_root(staging: &Path, dest: &Path) -> Result<()> {
    let entries: Vec<_> = std::fs::read_dir(staging)
        .with_context(|| format!("cannot read {}", staging.display()))?
        .collect::<std::io::Result<_>>()?;

    let root = match entries.as_slice() {
        [only] if only.path().is_dir() => only.path(),
        _ => bail!(
            "cannot strip root: archive has {} top-level entries, expected a single directory",
            entries.len()
        ),
    };

    std::fs::create_dir_all(dest)
        .with_context(|| format!("cannot create destination directory {}", dest.display()))?;
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        std::fs::rename(entry.path(), &target)
            .with_context(|| format!("cannot move {} into {}", entry.path().display(), dest.display()))?;
    }

    Ok(())
}

/// Extract `archive_path` into `dest`.
///
/// The archive is unpacked into a staging directory next to `dest` first, so
/// a failed extraction never leaves a partial tree behind.
pub fn extract(archive_path: &Path, dest: &Path, format: ArchiveFormat, strip_root: bool) -> Result<()> {
    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("cannot create directory {}", parent.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(parent)
        .context("cannot create staging directory")?;

    let pb = output::spinner(&format!("extracting {}", filename));
    let result = unpack(archive_path, staging.path(), format).and_then(|()| {
        if strip_root {
            hoist_root(staging.path(), dest)
        } else {
            std::fs::create_dir_all(dest)?;
            for entry in std::fs::read_dir(staging.path())? {
                let entry = entry?;
                std::fs::rename(entry.path(), dest.join(entry.file_name()))?;
            }
            Ok(())
        }
    });
    pb.finish_and_clear();

    result.with_context(|| format!("Failed to extract {}", archive_path.display()))?;
    output::detail(&format!("extracted {} to {}", filename, dest.display()));
    Ok(())
}
