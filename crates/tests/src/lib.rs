//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端测试：InputStream -> Dispatcher -> 真实文件 + 直通输出
//! - 故障隔离、追加语义、中断关闭

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let config = contracts::TeeConfig::default();
        assert!(config_loader::validate(&config).is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use contracts::{ContractError, DataSink, ReadMode};
    use dispatcher::{
        CancellationToken, Dispatcher, FileSink, Passthrough, RunOutcome, ShutdownController,
        SinkSet,
    };
    use ingestion::InputStream;
    use tempfile::{tempdir, TempDir};
    use tokio::io::AsyncWriteExt;

    const LINE: ReadMode = ReadMode::Line { max_line_len: 4096 };
    const CHUNKED: ReadMode = ReadMode::Chunked { block_size: 2048 };

    /// FileSink that fails on one chosen write
    struct FlakySink {
        inner: FileSink,
        fail_at: usize,
        writes: usize,
        failed: bool,
    }

    impl FlakySink {
        async fn open(path: &Path, fail_at: usize) -> Self {
            Self {
                inner: FileSink::open(path, false).await.unwrap(),
                fail_at,
                writes: 0,
                failed: false,
            }
        }
    }

    impl DataSink for FlakySink {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn is_active(&self) -> bool {
            !self.failed && self.inner.is_active()
        }

        async fn write(&mut self, bytes: &[u8]) -> Result<(), ContractError> {
            let index = self.writes;
            self.writes += 1;
            if index == self.fail_at {
                self.failed = true;
                return Err(ContractError::sink_write(
                    self.inner.name(),
                    io::Error::other("injected failure"),
                ));
            }
            self.inner.write(bytes).await
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            self.inner.flush().await
        }

        async fn close(&mut self) {
            self.inner.close().await;
        }
    }

    fn paths(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| dir.path().join(n)).collect()
    }

    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 256) as u8).collect()
    }

    #[tokio::test]
    async fn test_two_files_with_passthrough() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["a.txt", "b.txt"]);
        let input = b"hello\nworld\n";

        let sinks = SinkSet::open_all(&outputs, false).await;
        let mut dispatcher = Dispatcher::new(
            InputStream::new(&input[..]),
            LINE,
            sinks,
            Some(Passthrough::new(Vec::new())),
            CancellationToken::new(),
        );
        let report = dispatcher.run().await.unwrap();

        assert_eq!(report.outcome, RunOutcome::EndOfInput);
        assert_eq!(fs::read(&outputs[0]).unwrap(), input);
        assert_eq!(fs::read(&outputs[1]).unwrap(), input);
        assert_eq!(
            dispatcher.passthrough().unwrap().get_ref().as_slice(),
            input
        );
    }

    #[tokio::test]
    async fn test_fidelity_in_both_read_modes() {
        let mut input = sample_bytes(50_000);
        // Sprinkle newlines and end without one
        for i in (0..input.len()).step_by(97) {
            input[i] = b'\n';
        }
        input.push(b'z');

        for mode in [LINE, CHUNKED, ReadMode::Line { max_line_len: 7 }] {
            let dir = tempdir().unwrap();
            let outputs = paths(&dir, &["1", "2", "3"]);

            let sinks = SinkSet::open_all(&outputs, false).await;
            let mut dispatcher = Dispatcher::new(
                InputStream::new(&input[..]),
                mode,
                sinks,
                Some(Passthrough::new(Vec::new())),
                CancellationToken::new(),
            );
            let report = dispatcher.run().await.unwrap();

            assert_eq!(report.bytes, input.len() as u64, "mode {mode:?}");
            for path in &outputs {
                assert_eq!(fs::read(path).unwrap(), input, "mode {mode:?}");
            }
            assert_eq!(
                dispatcher.passthrough().unwrap().get_ref().as_slice(),
                &input[..]
            );
        }
    }

    #[tokio::test]
    async fn test_piped_5000_bytes_one_sink() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["out.bin"]);
        let input = sample_bytes(5000);

        let sinks = SinkSet::open_all(&outputs, false).await;
        let mut dispatcher = Dispatcher::new(
            InputStream::new(&input[..]),
            CHUNKED,
            sinks,
            None::<Passthrough<Vec<u8>>>,
            CancellationToken::new(),
        );
        let report = dispatcher.run().await.unwrap();

        assert_eq!(fs::read(&outputs[0]).unwrap(), input);
        assert!(report.sinks[0].metrics.write_count <= 3);
        assert_eq!(report.sinks[0].metrics.bytes_written, 5000);
    }

    #[tokio::test]
    async fn test_passthrough_suppressed() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["out.txt"]);

        let sinks = SinkSet::open_all(&outputs, false).await;
        let mut dispatcher: Dispatcher<_, FileSink, Vec<u8>> = Dispatcher::new(
            InputStream::new(&b"quiet\n"[..]),
            LINE,
            sinks,
            None,
            CancellationToken::new(),
        );
        dispatcher.run().await.unwrap();

        assert!(dispatcher.passthrough().is_none());
        assert_eq!(fs::read(&outputs[0]).unwrap(), b"quiet\n");
    }

    #[tokio::test]
    async fn test_append_law() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["log.txt"]);

        for (append, expected) in [(true, &b"X-existing\nY-input\n"[..]), (false, &b"Y-input\n"[..])] {
            fs::write(&outputs[0], b"X-existing\n").unwrap();

            let sinks = SinkSet::open_all(&outputs, append).await;
            let mut dispatcher = Dispatcher::new(
                InputStream::new(&b"Y-input\n"[..]),
                CHUNKED,
                sinks,
                None::<Passthrough<Vec<u8>>>,
                CancellationToken::new(),
            );
            dispatcher.run().await.unwrap();

            assert_eq!(fs::read(&outputs[0]).unwrap(), expected, "append={append}");
        }
    }

    #[tokio::test]
    async fn test_fault_isolation_injected() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["ok1", "flaky", "ok2"]);
        let input = b"line0\nline1\nline2\nline3\n";

        let mut sinks = SinkSet::new();
        sinks.push(FlakySink::open(&outputs[0], usize::MAX).await);
        // Fails on the third chunk
        sinks.push(FlakySink::open(&outputs[1], 2).await);
        sinks.push(FlakySink::open(&outputs[2], usize::MAX).await);

        let mut dispatcher = Dispatcher::new(
            InputStream::new(&input[..]),
            LINE,
            sinks,
            Some(Passthrough::new(Vec::new())),
            CancellationToken::new(),
        );
        let report = dispatcher.run().await.unwrap();

        assert_eq!(report.outcome, RunOutcome::EndOfInput);
        assert_eq!(report.chunks, 4);
        assert_eq!(fs::read(&outputs[0]).unwrap(), input);
        assert_eq!(fs::read(&outputs[1]).unwrap(), b"line0\nline1\n");
        assert_eq!(fs::read(&outputs[2]).unwrap(), input);
        assert_eq!(
            dispatcher.passthrough().unwrap().get_ref().as_slice(),
            input
        );

        assert!(!report.sinks[1].active);
        assert_eq!(report.sinks[1].metrics.failure_count, 1);
        assert!(report.sinks[0].active);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_fault_isolation_device_full() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let outputs = vec![PathBuf::from("/dev/full"), good.clone()];
        let input = sample_bytes(10_000);

        let sinks = SinkSet::open_all(&outputs, false).await;
        assert_eq!(sinks.len(), 2);

        let mut dispatcher = Dispatcher::new(
            InputStream::new(&input[..]),
            CHUNKED,
            sinks,
            None::<Passthrough<Vec<u8>>>,
            CancellationToken::new(),
        );
        let report = dispatcher.run().await.unwrap();

        assert_eq!(report.outcome, RunOutcome::EndOfInput);
        assert_eq!(fs::read(&good).unwrap(), input);
        assert!(!report.sinks[0].active);
        assert_eq!(report.sinks[0].metrics.failure_count, 1);
    }

    #[tokio::test]
    async fn test_no_sink_guard() {
        let dir = tempdir().unwrap();
        let outputs = vec![
            dir.path().to_path_buf(),
            dir.path().join("*.log"),
            dir.path().join("missing").join("x.txt"),
        ];

        let sinks = SinkSet::open_all(&outputs, false).await;
        assert!(sinks.is_empty());

        let mut dispatcher = Dispatcher::new(
            InputStream::new(&b"never read"[..]),
            CHUNKED,
            sinks,
            Some(Passthrough::new(Vec::new())),
            CancellationToken::new(),
        );
        let result = dispatcher.run().await;

        assert!(matches!(result, Err(ContractError::NoSinksAvailable)));
        assert!(dispatcher.passthrough().unwrap().get_ref().is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_mid_stream() {
        let dir = tempdir().unwrap();
        let outputs = paths(&dir, &["a.txt", "b.txt"]);
        let first = sample_bytes(3000);

        let (mut writer, reader) = tokio::io::duplex(64 * 1024);
        writer.write_all(&first).await.unwrap();

        let controller = ShutdownController::new(CancellationToken::new());
        let sinks = SinkSet::open_all(&outputs, false).await;
        let mut dispatcher = Dispatcher::new(
            InputStream::new(reader),
            CHUNKED,
            sinks,
            Some(Passthrough::new(Vec::new())),
            controller.token(),
        );

        let handle = tokio::spawn(async move {
            let report = dispatcher.run().await;
            (report, dispatcher)
        });

        // Wait until the first bytes reached both files
        let wait = async {
            loop {
                let done = outputs
                    .iter()
                    .all(|p| fs::metadata(p).map(|m| m.len()).unwrap_or(0) == first.len() as u64);
                if done {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("first bytes were not dispatched");

        controller.trigger();
        // Arrives after the interrupt and must not be dispatched
        writer.write_all(b"late bytes").await.unwrap();

        let (report, dispatcher) = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("dispatcher did not stop")
            .unwrap();
        let report = report.unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert!(report.outcome.is_success());
        assert_eq!(report.bytes, first.len() as u64);
        assert!(dispatcher.sinks().is_closed());
        for path in &outputs {
            assert_eq!(fs::read(path).unwrap(), first);
        }
        assert_eq!(
            dispatcher.passthrough().unwrap().get_ref().as_slice(),
            &first[..]
        );
    }
}
