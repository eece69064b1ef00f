//! Engine Server Tests
//!
//! Integration tests over real loopback sockets: a full request/response
//! round trip, protocol failures answered with error frames, accept-loop
//! resilience, and the shutdown signal.

#[cfg(test)]
mod tests {
    use crate::engine::server::EngineServer;
    use crate::protocol::framing;
    use crate::protocol::types::{EngineResponse, Record};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;

    async fn spawn_engine() -> (u16, watch::Sender<bool>, JoinHandle<anyhow::Result<()>>) {
        let server = EngineServer::bind(0).unwrap();
        let port = server.local_addr().unwrap().port();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(server.run(shutdown_rx));
        (port, shutdown_tx, handle)
    }

    async fn connect(port: u16) -> TcpStream {
        TcpStream::connect(("127.0.0.1", port)).await.unwrap()
    }

    async fn stop(shutdown: watch::Sender<bool>, handle: JoinHandle<anyhow::Result<()>>) {
        shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }

    // ============================================================
    // TEST 1: Request/response round trip
    // ============================================================

    #[tokio::test]
    async fn test_engine_round_trip() {
        let (port, shutdown, handle) = spawn_engine().await;

        let batch = vec![
            Record { year: 2020, score: 80.0 },
            Record { year: 2020, score: 90.0 },
            Record { year: 2021, score: 70.0 },
        ];

        let mut stream = connect(port).await;
        framing::write_message(&mut stream, &batch).await.unwrap();
        let response: EngineResponse = framing::read_message(&mut stream).await.unwrap();

        match response {
            EngineResponse::Stats(stats) => {
                let y2020 = &stats["2020"];
                assert_eq!(y2020.min, 80.0);
                assert_eq!(y2020.max, 90.0);
                assert_eq!(y2020.avg, 85);

                let y2021 = &stats["2021"];
                assert_eq!(y2021.min, 70.0);
                assert_eq!(y2021.max, 70.0);
                assert_eq!(y2021.avg, 70);
            }
            EngineResponse::Failure { error } => panic!("engine reported error: {error}"),
        }

        stop(shutdown, handle).await;
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_map() {
        let (port, shutdown, handle) = spawn_engine().await;

        let mut stream = connect(port).await;
        framing::write_message(&mut stream, &Vec::<Record>::new())
            .await
            .unwrap();
        let response: EngineResponse = framing::read_message(&mut stream).await.unwrap();

        match response {
            EngineResponse::Stats(stats) => assert!(stats.is_empty()),
            EngineResponse::Failure { error } => panic!("engine reported error: {error}"),
        }

        stop(shutdown, handle).await;
    }

    // ============================================================
    // TEST 2: Protocol failures get error replies
    // ============================================================

    #[tokio::test]
    async fn test_malformed_header_gets_error_reply() {
        let (port, shutdown, handle) = spawn_engine().await;

        let mut stream = connect(port).await;
        stream.write_all(b"notanum!").await.unwrap();
        let response: EngineResponse = framing::read_message(&mut stream).await.unwrap();

        assert!(matches!(response, EngineResponse::Failure { .. }));

        stop(shutdown, handle).await;
    }

    #[tokio::test]
    async fn test_garbage_payload_gets_error_reply() {
        let (port, shutdown, handle) = spawn_engine().await;

        let mut stream = connect(port).await;
        framing::write_frame(&mut stream, b"this is not json")
            .await
            .unwrap();
        let response: EngineResponse = framing::read_message(&mut stream).await.unwrap();

        assert!(matches!(response, EngineResponse::Failure { .. }));

        stop(shutdown, handle).await;
    }

    #[tokio::test]
    async fn test_truncated_request_gets_error_reply() {
        let (port, shutdown, handle) = spawn_engine().await;

        // Claim 100 bytes, deliver 4, then close the write half.
        let mut stream = connect(port).await;
        stream.write_all(b"     100").await.unwrap();
        stream.write_all(b"[{},").await.unwrap();
        stream.shutdown().await.unwrap();

        let response: EngineResponse = framing::read_message(&mut stream).await.unwrap();
        assert!(matches!(response, EngineResponse::Failure { .. }));

        stop(shutdown, handle).await;
    }

    // ============================================================
    // TEST 3: Accept loop resilience and shutdown
    // ============================================================

    #[tokio::test]
    async fn test_listener_survives_bad_connection() {
        let (port, shutdown, handle) = spawn_engine().await;

        // First client misbehaves.
        {
            let mut bad = connect(port).await;
            bad.write_all(b"garbage!").await.unwrap();
            let _: EngineResponse = framing::read_message(&mut bad).await.unwrap();
        }

        // Second client still gets served.
        let batch = vec![Record { year: 1999, score: 50.0 }];
        let mut good = connect(port).await;
        framing::write_message(&mut good, &batch).await.unwrap();
        let response: EngineResponse = framing::read_message(&mut good).await.unwrap();

        match response {
            EngineResponse::Stats(stats) => assert_eq!(stats["1999"].avg, 50),
            EngineResponse::Failure { error } => panic!("engine reported error: {error}"),
        }

        stop(shutdown, handle).await;
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_accept_loop() {
        let (_port, shutdown, handle) = spawn_engine().await;

        stop(shutdown, handle).await;
    }
}
