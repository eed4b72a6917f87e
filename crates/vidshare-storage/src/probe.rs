//! Container probing for uploaded videos
//!
//! Reads the movie header (`moov/mvhd`) of an ISO base media file (MP4, MOV) to find its
//! playback duration. Only box headers and the `mvhd` payload are read, never media data.

use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::traits::StorageResult;

const BOX_HEADER_LEN: u64 = 8;
const MAX_BOXES: usize = 1024;

struct BoxHeader {
    kind: [u8; 4],
    /// Offset of the payload from the start of the file
    payload_start: u64,
    /// Offset one past the end of the box
    end: u64,
}

async fn read_box_header(file: &mut File, offset: u64, limit: u64) -> StorageResult<Option<BoxHeader>> {
    if offset + BOX_HEADER_LEN > limit {
        return Ok(None);
    }

    file.seek(SeekFrom::Start(offset)).await?;
    let mut header = [0u8; 8];
    if file.read_exact(&mut header).await.is_err() {
        return Ok(None);
    }

    let size32 = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
    let kind = [header[4], header[5], header[6], header[7]];

    let (size, header_len) = match size32 {
        0 => (limit - offset, BOX_HEADER_LEN),
        1 => {
            let mut large = [0u8; 8];
            if file.read_exact(&mut large).await.is_err() {
                return Ok(None);
            }
            (u64::from_be_bytes(large), BOX_HEADER_LEN + 8)
        }
        n => (n, BOX_HEADER_LEN),
    };

    if size < header_len || offset.saturating_add(size) > limit {
        return Ok(None);
    }

    Ok(Some(BoxHeader {
        kind,
        payload_start: offset + header_len,
        end: offset + size,
    }))
}

async fn find_box(
    file: &mut File,
    mut offset: u64,
    limit: u64,
    wanted: &[u8; 4],
) -> StorageResult<Option<BoxHeader>> {
    for _ in 0..MAX_BOXES {
        match read_box_header(file, offset, limit).await? {
            Some(header) if &header.kind == wanted => return Ok(Some(header)),
            Some(header) => offset = header.end,
            None => return Ok(None),
        }
    }
    Ok(None)
}

fn duration_from_mvhd(payload: &[u8]) -> Option<f64> {
    let version = *payload.first()?;
    // version(1) + flags(3), then creation/modification times, timescale, duration
    let (timescale, duration) = if version == 1 {
        let timescale = u32::from_be_bytes(payload.get(20..24)?.try_into().ok()?);
        let duration = u64::from_be_bytes(payload.get(24..32)?.try_into().ok()?);
        (timescale, duration)
    } else {
        let timescale = u32::from_be_bytes(payload.get(12..16)?.try_into().ok()?);
        let duration = u32::from_be_bytes(payload.get(16..20)?.try_into().ok()?) as u64;
        (timescale, duration)
    };

    if timescale == 0 || duration == u64::MAX || duration == u32::MAX as u64 {
        return None;
    }
    Some(duration as f64 / timescale as f64)
}

/// Duration in seconds of the MP4/MOV file at `path`, or `None` when it has no readable
/// movie header.
pub async fn mp4_duration(path: &Path) -> StorageResult<Option<f64>> {
    let mut file = File::open(path).await?;
    let len = file.metadata().await?.len();

    let Some(moov) = find_box(&mut file, 0, len, b"moov").await? else {
        return Ok(None);
    };
    let Some(mvhd) = find_box(&mut file, moov.payload_start, moov.end, b"mvhd").await? else {
        return Ok(None);
    };

    let payload_len = (mvhd.end - mvhd.payload_start).min(32) as usize;
    let mut payload = vec![0u8; payload_len];
    file.seek(SeekFrom::Start(mvhd.payload_start)).await?;
    file.read_exact(&mut payload).await?;

    Ok(duration_from_mvhd(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    fn mvhd_v0(timescale: u32, duration: u32) -> Vec<u8> {
        let mut payload = vec![0u8; 4]; // version + flags
        payload.extend_from_slice(&0u32.to_be_bytes()); // creation
        payload.extend_from_slice(&0u32.to_be_bytes()); // modification
        payload.extend_from_slice(&timescale.to_be_bytes());
        payload.extend_from_slice(&duration.to_be_bytes());
        payload.extend_from_slice(&[0u8; 80]);
        mp4_box(b"mvhd", &payload)
    }

    #[tokio::test]
    async fn reads_duration_from_movie_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mp4");

        let mut file = mp4_box(b"ftyp", b"isom\0\0\x02\0isomiso2");
        file.extend(mp4_box(b"mdat", &[0u8; 64]));
        let mut moov_payload = mp4_box(b"iods", &[0u8; 8]);
        moov_payload.extend(mvhd_v0(1000, 12_500));
        file.extend(mp4_box(b"moov", &moov_payload));
        tokio::fs::write(&path, &file).await.unwrap();

        let duration = mp4_duration(&path).await.unwrap();
        assert_eq!(duration, Some(12.5));
    }

    #[tokio::test]
    async fn non_mp4_has_no_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        tokio::fs::write(&path, b"\x1a\x45\xdf\xa3 not an iso file").await.unwrap();

        assert_eq!(mp4_duration(&path).await.unwrap(), None);
    }

    #[test]
    fn version_one_header() {
        let mut payload = vec![1u8, 0, 0, 0];
        payload.extend_from_slice(&0u64.to_be_bytes());
        payload.extend_from_slice(&0u64.to_be_bytes());
        payload.extend_from_slice(&600u32.to_be_bytes());
        payload.extend_from_slice(&1800u64.to_be_bytes());
        assert_eq!(duration_from_mvhd(&payload), Some(3.0));
    }
}
