// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Streaming directory upload into a container.
//!
//! The local tree is written as a tar stream into one end of an in-memory
//! pipe by a blocking task while `tar xmf -` runs remotely reading the other
//! end from its stdin. Nothing is buffered beyond the pipe capacity.

use crate::error::{OperatorError, Result};
use crate::kubernetes::exec::{command, ContainerRef, PodExec};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};
use tokio_util::io::SyncIoBridge;
use tracing::{error, info, instrument, warn};

/// Capacity of the pipe between archive producer and remote extractor
const PIPE_CAPACITY: usize = 64 * 1024;

/// Upload the content of `local_dir` into `remote_dir` of the target container.
/// A missing or empty `local_dir` uploads nothing and is not an error.
#[instrument(skip(exec, target), fields(container = %target))]
pub async fn upload_dir(
    exec: &dyn PodExec,
    target: &ContainerRef,
    local_dir: &Path,
    remote_dir: &str,
) -> Result<()> {
    info!(
        "Copying the content of '{}' directory to '{}:{}'",
        local_dir.display(),
        target,
        remote_dir
    );

    if !has_entries(local_dir)? {
        warn!(
            "Source directory '{}' is missing or empty. There is nothing to copy.",
            local_dir.display()
        );
        return Ok(());
    }

    let remote_dir = normalize_remote_dir(remote_dir);

    info!("Creating '{}:{}' if not exists", target, remote_dir);
    exec.exec(target, None, command(&["mkdir", "-p", remote_dir]))
        .await
        .inspect_err(|e| error!("Creating destination directory failed: {}", e))?;

    let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let bridge = SyncIoBridge::new(writer);
    let src = local_dir.to_path_buf();
    let producer = tokio::task::spawn_blocking(move || {
        if let Err(e) = write_archive(&src, bridge) {
            error!("Making tar stream of '{}' failed: {}", src.display(), e);
        }
    });

    let extracted = exec
        .exec(
            target,
            Some(Box::new(reader)),
            command(&["tar", "xmf", "-", "-C", remote_dir]),
        )
        .await;

    // The reader is gone once exec returns, so the producer finishes
    // either normally or on a broken pipe.
    if let Err(e) = producer.await {
        error!("Tar producer task for '{}' panicked: {}", local_dir.display(), e);
    }

    info!(
        "Copying the content of '{}' directory to '{}:{}' finished",
        local_dir.display(),
        target,
        remote_dir
    );
    extracted.map(|_| ())
}

/// True when `path` is a directory with at least one entry
fn has_entries(path: &Path) -> Result<bool> {
    match fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OperatorError::Io(e)),
    }
}

/// Strip trailing slashes except for the root directory
pub(crate) fn normalize_remote_dir(dir: &str) -> &str {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() && dir.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Write `src` as a tar stream into `writer`. The archive is terminated even
/// when walking the tree fails part way, so the reader sees a clean end.
pub(crate) fn write_archive<W: Write>(src: &Path, writer: W) -> io::Result<()> {
    let mut builder = Builder::new(writer);
    builder.follow_symlinks(false);

    let walked = append_tree(&mut builder, src, Path::new(""));
    let finished = builder.into_inner().and_then(|mut w| w.flush());

    walked.and(finished)
}

fn append_tree<W: Write>(builder: &mut Builder<W>, path: &Path, name: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    let file_type = meta.file_type();

    if file_type.is_dir() {
        let mut children = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();

        if children.is_empty() && !name.as_os_str().is_empty() {
            builder.append_dir(name, path)?;
        }

        for child in children {
            append_tree(builder, &path.join(&child), &name.join(&child))?;
        }
    } else if file_type.is_symlink() {
        let target: PathBuf = fs::read_link(path)?;
        let mut header = Header::new_gnu();
        header.set_metadata(&meta);
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        builder.append_link(&mut header, name, target)?;
    } else {
        builder.append_path_with_name(path, name)?;
    }

    Ok(())
}
