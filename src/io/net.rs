use crate::{
    error::{CoverError, Result},
    io::progress::{emit, CoverProgress},
};
use anyhow::Context;
use reqwest::blocking::Client;
use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60 * 60))
        .build()
        .context("reqwest client build failed")?;
    Ok(client)
}

/// GET `url` and write the whole body to `dest`, replacing any existing file.
///
/// The body is streamed into a sibling temp file that is only moved over
/// `dest` once complete, so a failed transfer never leaves a truncated file.
pub fn download_to(client: &Client, url: &str, dest: &Path) -> Result<PathBuf> {
    let transport = |e: reqwest::Error| {
        debug!(url, error = %e, "request failed");
        CoverError::Download {
            url: url.to_string(),
            status: None,
        }
    };

    let mut resp = client.get(url).send().map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(CoverError::Download {
            url: url.to_string(),
            status: Some(status.as_u16()),
        });
    }

    let total = resp.content_length().unwrap_or(0);
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    emit(CoverProgress::Download {
        file: file_name.clone(),
        done: 0,
        total,
    });

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    let mut downloaded: u64 = 0;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = resp.read(&mut buf).map_err(|e| {
            debug!(url, error = %e, "download interrupted");
            CoverError::Download {
                url: url.to_string(),
                status: Some(status.as_u16()),
            }
        })?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buf[..n])?;
        downloaded += n as u64;
        emit(CoverProgress::Download {
            file: file_name.clone(),
            done: downloaded,
            total,
        });
    }
    tmp.flush()?;

    tmp.persist(dest).map_err(|e| CoverError::from(e.error))?;

    emit(CoverProgress::Download {
        file: file_name,
        done: total.max(downloaded),
        total: total.max(downloaded),
    });
    info!(url, dest = %dest.display(), bytes = downloaded, "downloaded");

    Ok(dest.to_path_buf())
}
