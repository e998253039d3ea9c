//! Fake upstreams for exercising the backend relay.

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Address that refuses connections: bound once, then released.
pub async fn closed_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Backend that announces a 100-byte JSON body but sends only part of it.
///
/// With `hold` set the connection stays open that long after the partial
/// body; otherwise it is closed immediately.
pub async fn truncating_backend(hold: Option<Duration>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };

        // Drain the request (headers plus JSON object body) before replying.
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"}") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = "HTTP/1.1 200 OK\r\n\
                    Content-Type: application/json\r\n\
                    Content-Length: 100\r\n\
                    \r\n\
                    {\"answer\":";
        if stream.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let _ = stream.flush().await;

        match hold {
            Some(d) => tokio::time::sleep(d).await,
            None => {
                let _ = stream.shutdown().await;
            }
        }
    });

    format!("http://{addr}")
}
