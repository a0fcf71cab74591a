use crate::core_fs::error::FsError;
use crate::core_fs::sandbox::ResolvedPath;
use log::{debug, info};
use std::io;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Reads the entry names of a directory, sorted by name.
pub async fn list_names(path: &ResolvedPath) -> Result<Vec<String>, FsError> {
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| FsError::cant_access(path.as_path(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FsError::cant_access(path.as_path(), e))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    debug!("Listed {} entries in {:?}", names.len(), path.as_path());
    Ok(names)
}

/// Writes one name per line, CRLF terminated.
pub async fn write_listing<W>(names: &[String], data: &mut W) -> Result<(), FsError>
where
    W: AsyncWrite + Unpin,
{
    for name in names {
        data.write_all(name.as_bytes())
            .await
            .map_err(FsError::Transfer)?;
        data.write_all(b"\r\n").await.map_err(FsError::Transfer)?;
    }
    data.flush().await.map_err(FsError::Transfer)
}

/// Opens a regular file for RETR.
pub async fn open_for_retrieve(path: &ResolvedPath) -> Result<File, FsError> {
    let file = File::open(path)
        .await
        .map_err(|e| FsError::cant_access(path.as_path(), e))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| FsError::cant_access(path.as_path(), e))?;
    if metadata.is_dir() {
        return Err(FsError::cant_access(
            path.as_path(),
            io::Error::new(io::ErrorKind::Other, "is a directory"),
        ));
    }

    Ok(file)
}

/// Checks that STOR could create `path`: the parent must be an existing
/// directory and the target must not be one.
pub async fn check_storable(path: &ResolvedPath) -> Result<(), FsError> {
    if let Ok(metadata) = fs::metadata(path).await {
        if metadata.is_dir() {
            return Err(FsError::cant_access(
                path.as_path(),
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            ));
        }
    }

    let parent = path.as_path().parent().ok_or(FsError::InvalidPath)?;
    match fs::metadata(parent).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(FsError::cant_access(
            parent,
            io::Error::new(io::ErrorKind::Other, "not a directory"),
        )),
        Err(e) => Err(FsError::cant_access(parent, e)),
    }
}

/// Streams `source` to the data connection.
///
/// Binary mode copies bytes unchanged. Text mode ends every line with CRLF,
/// replacing whatever line ending it had.
pub async fn send_file<R, W>(
    source: R,
    data: &mut W,
    binary: bool,
    buffer_size: usize,
) -> Result<u64, FsError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::with_capacity(buffer_size, source);

    let sent = if binary {
        tokio::io::copy_buf(&mut reader, data)
            .await
            .map_err(FsError::Transfer)?
    } else {
        copy_lines(&mut reader, data, b"\r\n").await?
    };

    data.flush().await.map_err(FsError::Transfer)?;
    Ok(sent)
}

/// Creates `path` and fills it from the data connection.
///
/// Text mode stores every received line with a plain `\n` ending. A failure
/// halfway leaves whatever was written so far in place.
pub async fn store_file<R>(
    path: &ResolvedPath,
    data: R,
    binary: bool,
    buffer_size: usize,
) -> Result<u64, FsError>
where
    R: AsyncRead + Unpin,
{
    let mut file = File::create(path)
        .await
        .map_err(|e| FsError::cant_access(path.as_path(), e))?;

    let mut reader = BufReader::with_capacity(buffer_size, data);
    let stored = if binary {
        tokio::io::copy_buf(&mut reader, &mut file)
            .await
            .map_err(FsError::Transfer)?
    } else {
        copy_lines(&mut reader, &mut file, b"\n").await?
    };

    file.flush().await.map_err(FsError::Transfer)?;
    info!("Stored {} bytes into {:?}", stored, path.as_path());
    Ok(stored)
}

async fn copy_lines<R, W>(reader: &mut R, writer: &mut W, ending: &[u8]) -> Result<u64, FsError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut written = 0u64;

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(FsError::Transfer)?;
        if n == 0 {
            break;
        }

        strip_line_ending(&mut line);
        line.extend_from_slice(ending);
        writer.write_all(&line).await.map_err(FsError::Transfer)?;
        written += line.len() as u64;
    }

    Ok(written)
}

fn strip_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}
