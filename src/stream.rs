//! 文件分块流与 MIME 识别。

use mime_guess::mime::Mime;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::config::CHUNK_SIZE;

/// 打开文件并返回固定块大小的字节流；句柄随流一起释放。
pub async fn open_chunks(path: &Path) -> io::Result<ReaderStream<File>> {
    let file = File::open(path).await?;
    Ok(ReaderStream::with_capacity(file, CHUNK_SIZE))
}

/// 根据路径推断 MIME 类型，未知时回退到 application/octet-stream。
pub fn mimetype(path: &Path) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

#[cfg(test)]
mod tests {
    use super::{mimetype, open_chunks};
    use crate::config::CHUNK_SIZE;
    use futures_util::StreamExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn chunks_concatenate_to_exact_file_bytes() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("blob.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).expect("write");

        let mut stream = open_chunks(&path).await.expect("open");
        let mut collected = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.expect("read chunk");
            assert!(chunk.len() <= CHUNK_SIZE);
            collected.extend_from_slice(&chunk);
            chunks += 1;
        }

        assert_eq!(collected, content);
        // 10_000 bytes in 4096-byte chunks: two full, one short tail.
        assert_eq!(chunks, 3);
    }

    #[tokio::test]
    async fn repeated_streams_do_not_exhaust_handles() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("small.bin");
        std::fs::write(&path, b"abc").expect("write");

        for _ in 0..512 {
            let mut stream = open_chunks(&path).await.expect("open");
            let chunk = stream.next().await.expect("one chunk").expect("read");
            assert_eq!(&chunk[..], b"abc");
        }
    }

    #[tokio::test]
    async fn abandoned_stream_releases_its_handle() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("big.bin");
        std::fs::write(&path, vec![0u8; CHUNK_SIZE * 8]).expect("write");

        for _ in 0..512 {
            let mut stream = open_chunks(&path).await.expect("open");
            let _first = stream.next().await.expect("one chunk").expect("read");
            drop(stream);
        }
    }

    #[tokio::test]
    async fn open_fails_for_missing_file() {
        let temp = tempdir().expect("tempdir");
        let result = open_chunks(&temp.path().join("gone.bin")).await;
        assert!(result.is_err());
    }

    #[test]
    fn mimetype_detects_known_extensions() {
        assert_eq!(mimetype("a.png".as_ref()).essence_str(), "image/png");
        assert_eq!(mimetype("a.jpg".as_ref()).essence_str(), "image/jpeg");
    }

    #[test]
    fn mimetype_falls_back_to_octet_stream() {
        assert_eq!(
            mimetype("mystery.qqq".as_ref()).essence_str(),
            "application/octet-stream"
        );
    }
}
