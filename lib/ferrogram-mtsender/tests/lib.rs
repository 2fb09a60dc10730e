// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Exercises the sender against a synthetic server on localhost, using
//! the plain MTP variant so the exchange stays inspectable.
use ferrogram_mtproto::mtp;
use ferrogram_mtproto::transport::Full;
use ferrogram_mtsender::{Sender, ServerAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reads one full-transport frame and returns its payload.
async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await.unwrap();
    let len = i32::from_le_bytes(len_bytes) as usize;

    let mut rest = vec![0u8; len - 4];
    stream.read_exact(&mut rest).await.unwrap();

    // seq (4) + payload + crc (4)
    rest[4..rest.len() - 4].to_vec()
}

/// Writes one full-transport frame around the payload.
async fn write_frame(stream: &mut TcpStream, seq: i32, payload: &[u8]) {
    let len = (payload.len() + 12) as i32;
    let mut frame = Vec::with_capacity(len as usize);
    frame.extend(len.to_le_bytes());
    frame.extend(seq.to_le_bytes());
    frame.extend(payload);

    let crc = {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&frame);
        hasher.finalize()
    };
    frame.extend(crc.to_le_bytes());

    stream.write_all(&frame).await.unwrap();
}

/// Wraps a body in a plain MTP envelope the way a server would.
fn plain_response(msg_id: i64, body: &[u8]) -> Vec<u8> {
    assert_eq!(msg_id % 4, 1);
    let mut payload = Vec::with_capacity(20 + body.len());
    payload.extend(0i64.to_le_bytes()); // auth_key_id
    payload.extend(msg_id.to_le_bytes());
    payload.extend((body.len() as i32).to_le_bytes());
    payload.extend(body);
    payload
}

#[tokio::test]
async fn sender_round_trips_plain_requests() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // First request arrives with the plain header.
        let payload = read_frame(&mut stream).await;
        assert_eq!(&payload[..8], &[0; 8]); // auth_key_id = 0
        let len = i32::from_le_bytes(payload[16..20].try_into().unwrap()) as usize;
        assert_eq!(&payload[20..20 + len], b"ping");

        write_frame(&mut stream, 0, &plain_response(5, b"pong")).await;

        // A second request reuses the same connection and transport
        // sequence numbers.
        let payload = read_frame(&mut stream).await;
        let len = i32::from_le_bytes(payload[16..20].try_into().unwrap()) as usize;
        assert_eq!(&payload[20..20 + len], b"seconds!");

        write_frame(&mut stream, 1, &plain_response(9, b"reply!!!")).await;
    });

    let mut sender = Sender::connect(
        Full::new(),
        mtp::Plain::new(),
        ServerAddr::Tcp { address: addr },
    )
    .await
    .unwrap();

    let rx = sender.enqueue_body(b"ping".to_vec());
    let mut rx = rx;
    let response = loop {
        sender.step().await.unwrap();
        match rx.try_recv() {
            Ok(response) => break response.unwrap(),
            Err(tokio::sync::oneshot::error::TryRecvError::Empty) => continue,
            Err(e) => panic!("request dropped: {e}"),
        }
    };
    assert_eq!(response, b"pong");

    let mut rx = sender.enqueue_body(b"seconds!".to_vec());
    let response = loop {
        sender.step().await.unwrap();
        match rx.try_recv() {
            Ok(response) => break response.unwrap(),
            Err(tokio::sync::oneshot::error::TryRecvError::Empty) => continue,
            Err(e) => panic!("request dropped: {e}"),
        }
    };
    assert_eq!(response, b"reply!!!");

    server.await.unwrap();
}

#[tokio::test]
async fn closed_connection_surfaces_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut sender = Sender::connect(
        Full::new(),
        mtp::Plain::new(),
        ServerAddr::Tcp { address: addr },
    )
    .await
    .unwrap();

    server.await.unwrap();

    let err = loop {
        match sender.step().await {
            Ok(_) => continue,
            Err(e) => break e,
        }
    };
    assert!(matches!(err, ferrogram_mtsender::ReadError::Io(_)));
}
