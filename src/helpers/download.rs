//! Source archive downloads
//!
//! Archives are cached by file name under the download cache directory
//! (`$RECIPE_CACHE`, or the user cache dir). A cached archive is reused only
//! when its checksum still matches. `file://` URLs are read from the local
//! filesystem, which allows local source mirrors.

use crate::core::output;
use crate::helpers::hash;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout for establishing a connection and reading each chunk
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Default cache directory for downloaded archives.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var("RECIPE_CACHE") {
        return PathBuf::from(path);
    }

    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("open62541pp-recipe")
        .join("downloads")
}

/// Extract filename from a URL.
pub fn url_filename(url: &str) -> String {
    url.rsplit('/')
        .next()
        .unwrap_or("download")
        .split('?')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// Fetch `url` into `cache_dir`, verifying it against `sha256`.
///
/// Returns the path of the verified archive.
pub fn fetch(url: &str, sha256: &str, cache_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(cache_dir)
        .with_context(|| format!("cannot create cache directory {}", cache_dir.display()))?;

    let filename = url_filename(url);
    let dest = cache_dir.join(&filename);

    if dest.is_file() && hash::verify_sha256(&dest, sha256).is_ok() {
        output::detail(&format!("using cached {}", filename));
        return Ok(dest);
    }

    // Download next to the final location, then rename once verified
    let mut staged = tempfile::NamedTempFile::new_in(cache_dir)
        .context("cannot create temporary download file")?;
    let total_bytes = match url.strip_prefix("file://") {
        Some(path) => copy_local(Path::new(path), staged.as_file_mut())?,
        None => download_with_progress(url, staged.as_file_mut(), &filename)?,
    };
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));

    hash::verify_sha256(staged.path(), sha256)?;
    staged
        .persist(&dest)
        .with_context(|| format!("cannot store {}", dest.display()))?;

    Ok(dest)
}

fn copy_local(path: &Path, file: &mut std::fs::File) -> Result<u64> {
    let mut src = std::fs::File::open(path)
        .with_context(|| format!("cannot open local source {}", path.display()))?;
    std::io::copy(&mut src, file).with_context(|| format!("cannot copy {}", path.display()))
}

fn download_with_progress(url: &str, file: &mut std::fs::File, filename: &str) -> Result<u64> {
    let pb = output::spinner(&format!("downloading {}", filename));

    let agent = ureq::AgentBuilder::new()
        .timeout_connect(HTTP_TIMEOUT)
        .timeout_read(HTTP_TIMEOUT)
        .build();
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(e) => {
            pb.finish_and_clear();
            return Err(anyhow::anyhow!("download failed: {}: {}", url, e));
        }
    };

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("read error while downloading {}", url))?;
        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .context("write error while downloading")?;
        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_url_filename() {
        assert_eq!(
            url_filename("https://github.com/open62541pp/open62541pp/archive/refs/tags/v0.3.0.tar.gz"),
            "v0.3.0.tar.gz"
        );
        assert_eq!(url_filename("https://example.com/file.zip?token=abc"), "file.zip");
        assert_eq!(url_filename("https://example.com/"), "download");
    }

    #[test]
    fn test_cached_archive_reused_without_network() {
        let cache = TempDir::new().unwrap();
        std::fs::write(cache.path().join("v0.3.0.tar.gz"), "hello world").unwrap();

        // Unroutable URL: succeeds only if the cache short-circuits the download
        let path = fetch(
            "http://127.0.0.1:9/v0.3.0.tar.gz",
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
            cache.path(),
        )
        .unwrap();
        assert_eq!(path, cache.path().join("v0.3.0.tar.gz"));
    }

    #[test]
    fn test_file_url_is_verified() {
        let temp = TempDir::new().unwrap();
        let mirror = temp.path().join("v0.3.0.tar.gz");
        std::fs::write(&mirror, "hello world").unwrap();
        let cache = temp.path().join("cache");
        let url = format!("file://{}", mirror.display());

        let path = fetch(
            &url,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
            &cache,
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello world");

        let err = fetch(&url, &"0".repeat(64), &temp.path().join("other")).unwrap_err();
        assert!(format!("{:#}", err).to_lowercase().contains("integrity check failed"), "{:#}", err);
        assert!(!temp.path().join("other/v0.3.0.tar.gz").exists());
    }

    #[test]
    fn test_unreachable_url_fails() {
        let cache = TempDir::new().unwrap();
        let result = fetch("http://127.0.0.1:9/missing.tar.gz", "00", cache.path());
        assert!(result.is_err());
        assert!(!cache.path().join("missing.tar.gz").exists());
    }
}
