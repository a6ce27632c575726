//! LogForwarder - 子プロセスの出力を行単位でログに流す
//!
//! 子プロセスは誰も pipe を読まないと書き込みでブロックし、
//! 親は子の終了を待ってブロックする。両者が同時に進めるよう、
//! ストリームごとに専用の task で読み続ける。
//!
//! # 使用例
//! ```ignore
//! let mut forwarder = LogForwarder::new();
//! forwarder.forward("stdout", child.stdout.take().unwrap());
//! let status = child.wait().await?;
//! let lines = forwarder.join().await;
//! ```

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct LogForwarder {
    tasks: Vec<JoinHandle<u64>>,
}

impl LogForwarder {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// `reader` を EOF まで読み、各行を debug で出す task を起動する
    ///
    /// UTF-8 でない行も lossy 変換して流す（途中で読むのをやめると子がブロックするため）。
    pub fn forward<R>(&mut self, stream: &'static str, reader: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            let mut lines = 0u64;
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        tracing::debug!(stream, "{}", line.trim_end_matches(['\n', '\r']));
                        lines += 1;
                    }
                    Err(err) => {
                        tracing::warn!(stream, error = %err, "stopped forwarding process output");
                        break;
                    }
                }
            }
            lines
        });
        self.tasks.push(task);
    }

    /// 全 task の終了を待ち、転送した行数の合計を返す
    ///
    /// 書き込み側がすべて閉じてから呼ぶこと。開いたままだと EOF が来ず戻らない。
    pub async fn join(self) -> u64 {
        let mut total = 0;
        for task in self.tasks {
            match task.await {
                Ok(lines) => total += lines,
                Err(err) => tracing::warn!(error = %err, "log forwarding task failed"),
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn forwards_every_line_until_writer_closes() {
        let (mut writer, reader) = tokio::io::duplex(16);
        let mut forwarder = LogForwarder::new();
        forwarder.forward("stdout", reader);

        // larger than the duplex buffer: only completes if the reader drains concurrently
        for i in 0..100 {
            writer
                .write_all(format!("pg_dump: dumping table {i}\n").as_bytes())
                .await
                .unwrap();
        }
        drop(writer);

        assert_eq!(forwarder.join().await, 100);
    }

    #[tokio::test]
    async fn keeps_going_past_invalid_utf8_and_unterminated_tail() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut forwarder = LogForwarder::new();
        forwarder.forward("stderr", reader);

        writer.write_all(b"ok\n\xff\xfe broken\nlast").await.unwrap();
        drop(writer);

        assert_eq!(forwarder.join().await, 3);
    }

    #[tokio::test]
    async fn join_sums_all_streams() {
        let (mut out_w, out_r) = tokio::io::duplex(64);
        let (mut err_w, err_r) = tokio::io::duplex(64);
        let mut forwarder = LogForwarder::new();
        forwarder.forward("stdout", out_r);
        forwarder.forward("stderr", err_r);

        out_w.write_all(b"a\nb\n").await.unwrap();
        err_w.write_all(b"c\n").await.unwrap();
        drop(out_w);
        drop(err_w);

        assert_eq!(forwarder.join().await, 3);
    }
}
