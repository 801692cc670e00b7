//! Frame loading from a directory of decoded images
//!
//! Video decoding happens outside this tool (for example
//! `ffmpeg -i eye.mp4 frames/%05d.png`); frames are read in file-name
//! order on a blocking task and streamed to the single consumer that
//! owns the screening pipeline.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use video_frame::VideoFrame;

/// Image extensions accepted as frames
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frames decoded ahead of the consumer
pub const DECODE_QUEUE_DEPTH: usize = 8;

/// List frame images in a directory, sorted by file name
pub fn list_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading frame directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_frame {
            paths.push(path);
        } else {
            debug!("Skipping non-frame entry {}", path.display());
        }
    }

    if paths.is_empty() {
        bail!("no frame images found in {}", dir.display());
    }

    paths.sort();
    Ok(paths)
}

/// Decode one frame image into RGB
pub fn decode_frame(path: &Path, sequence: u64) -> anyhow::Result<VideoFrame> {
    let image = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
    Ok(VideoFrame::from_rgb_image(image.to_rgb8(), sequence))
}

/// Decode frames in order on a blocking task
///
/// The task stops early when the receiver is dropped.
pub fn spawn_decoder(
    paths: Vec<PathBuf>,
) -> (
    mpsc::Receiver<anyhow::Result<VideoFrame>>,
    JoinHandle<u64>,
) {
    let (tx, rx) = mpsc::channel(DECODE_QUEUE_DEPTH);

    let handle = tokio::task::spawn_blocking(move || {
        let mut sent = 0u64;
        for (sequence, path) in paths.iter().enumerate() {
            let frame = decode_frame(path, sequence as u64);
            let failed = frame.is_err();
            if tx.blocking_send(frame).is_err() {
                debug!("Consumer stopped after {} frames", sent);
                break;
            }
            if failed {
                warn!("Stopping decoder at {}", path.display());
                break;
            }
            sent += 1;
        }
        sent
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["00002.png", "00001.PNG", "notes.txt", "00003.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let names: Vec<String> = list_frames(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["00001.PNG", "00002.png", "00003.jpg"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_frames(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_decoder_streams_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5u8 {
            let img = image::RgbImage::from_pixel(4, 3, image::Rgb([i, i, i]));
            img.save(dir.path().join(format!("{:05}.png", i))).unwrap();
        }

        let (mut rx, handle) = spawn_decoder(list_frames(dir.path()).unwrap());
        let mut seen = Vec::new();
        while let Some(frame) = rx.recv().await {
            let frame = frame.unwrap();
            seen.push((frame.sequence(), frame.get_pixel(0, 0).unwrap()[0]));
        }

        assert_eq!(seen, (0..5u64).map(|i| (i, i as u8)).collect::<Vec<_>>());
        assert_eq!(handle.await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_decoder_reports_corrupt_frame() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("00000.png"), b"not a png").unwrap();

        let (mut rx, handle) = spawn_decoder(list_frames(dir.path()).unwrap());
        assert!(rx.recv().await.unwrap().is_err());
        assert!(rx.recv().await.is_none());
        assert_eq!(handle.await.unwrap(), 0);
    }
}
