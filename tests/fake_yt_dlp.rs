//! End-to-end tests against a scripted stand-in for yt-dlp
//!
//! These exercise the real process runner, argument construction, output discovery and
//! the HTTP surface without network access.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use media_dl::{ItemStatus, TaskId, api};
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn downloads_each_url_in_order_with_titles() {
    let (queue, temp_dir) = create_fake_queue().await;
    assert_eq!(queue.fetcher_name(), "yt-dlp");

    let (task_id, total) = queue
        .create_task(
            vec![
                "https://media.test/v/one".to_string(),
                "https://media.test/v/two".to_string(),
            ],
            "bestaudio--mp3",
        )
        .await
        .unwrap();
    assert_eq!(total, 2);

    let snapshot = wait_for_completion(&queue, &task_id).await;
    assert_eq!(snapshot.completed_count, 2);
    assert_eq!(snapshot.items[0].filename.as_deref(), Some("Title of one.mp3"));
    assert_eq!(snapshot.items[1].filename.as_deref(), Some("Title of two.mp3"));

    let first = queue.next_completed(&task_id).await.unwrap().unwrap();
    assert_eq!(first.index, 0);
    assert_eq!(
        std::fs::read_to_string(&first.filepath).unwrap(),
        "https://media.test/v/one"
    );

    // download + title lookup per item, strictly one item after the other
    let calls = recorded_calls(temp_dir.path());
    assert_eq!(calls.len(), 4);
    assert!(calls[0].contains("--extract-audio --audio-format mp3"));
    assert!(calls[0].contains("--no-playlist"));
    assert!(calls[0].ends_with("-- https://media.test/v/one"));
    assert!(calls[1].starts_with("--print title"));
    assert!(calls[2].ends_with("-- https://media.test/v/two"));
}

#[tokio::test]
async fn failures_and_missing_titles_do_not_stop_the_task() {
    let (queue, temp_dir) = create_fake_queue().await;

    let (task_id, _) = queue
        .create_task(
            vec![
                "https://media.test/fail".to_string(),
                "https://media.test/untitled".to_string(),
            ],
            "best--mp4",
        )
        .await
        .unwrap();

    let snapshot = wait_for_completion(&queue, &task_id).await;
    assert_eq!(snapshot.items[0].status, ItemStatus::Error);
    assert!(
        snapshot.items[0]
            .error
            .as_deref()
            .unwrap()
            .contains("Unsupported URL")
    );
    assert_eq!(snapshot.items[1].status, ItemStatus::Completed);
    assert_eq!(snapshot.items[1].filename.as_deref(), Some("download.mp4"));

    // Only the completed item's file remains
    assert_eq!(work_files(&temp_dir).len(), 1);

    assert!(queue.cleanup_task(&task_id).await);
    assert!(work_files(&temp_dir).is_empty());
}

#[tokio::test]
async fn http_client_flow_over_a_real_socket() {
    let (queue, temp_dir) = create_fake_queue().await;
    let addr = queue.get_config().server.api.bind_address;

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(api::serve_with_shutdown(
        queue.clone(),
        queue.get_config(),
        async move {
            rx.await.ok();
        },
    ));
    wait_for_listener(addr).await;

    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/queue/create"))
        .json(&serde_json::json!({
            "urls": ["https://media.test/v/café"],
            "format": "bestaudio--mp3"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["total"], 1);
    let task_id = created["taskId"].as_str().unwrap().to_string();

    wait_for_completion(&queue, &TaskId::from(task_id.as_str())).await;

    let next: Value = client
        .get(format!("{base}/queue/next/{task_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(next["hasFile"], true);
    assert_eq!(next["filename"], "Title of café.mp3");

    let response = client
        .get(format!("{base}/queue/download/{task_id}/0"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Title of caf.mp3\"; filename*=UTF-8''Title%20of%20caf%C3%A9.mp3"
    );
    assert_eq!(
        response.text().await.unwrap(),
        "https://media.test/v/café"
    );

    let deleted: Value = client
        .delete(format!("{base}/queue/{task_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["success"], true);
    assert!(work_files(&temp_dir).is_empty());

    let status = client
        .get(format!("{base}/queue/status/{task_id}"))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn shutdown_removes_every_task_file() {
    let (queue, temp_dir) = create_fake_queue().await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let (id, _) = queue
            .create_task(vec![format!("https://media.test/v/{n}")], "best")
            .await
            .unwrap();
        ids.push(id);
    }
    for id in &ids {
        wait_for_completion(&queue, id).await;
    }
    assert_eq!(work_files(&temp_dir).len(), 3);

    queue.shutdown().await.unwrap();
    assert_eq!(queue.task_count().await, 0);
    assert!(work_files(&temp_dir).is_empty());
    assert!(queue.create_task(vec!["x".into()], "best").await.is_err());
}

async fn wait_for_listener(addr: std::net::SocketAddr) {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server never started listening on {addr}");
}
