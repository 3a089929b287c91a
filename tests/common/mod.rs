//! Common utilities for media-dl integration tests

use media_dl::{Config, MediaQueue, TaskId, TaskSnapshot, TaskStatus};
use std::net::{SocketAddr, TcpListener};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Stand-in for yt-dlp
///
/// Honors `-o`, `--audio-format`/`--recode-video` and `--print title`. URLs containing
/// `fail` exit 1 with an error on stderr; URLs containing `untitled` fail the title lookup.
/// Every invocation is appended to `calls.log` next to the script.
const FAKE_YT_DLP: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
echo "$*" >> "$log"
out=""; target=""; url=""; print=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    --audio-format|--recode-video) target="$2"; shift 2 ;;
    --print) print="$2"; shift 2 ;;
    --) url="$2"; shift 2 ;;
    *) shift ;;
  esac
done
case "$url" in
  *fail*) echo "ERROR: Unsupported URL: $url" >&2; exit 1 ;;
esac
if [ -n "$print" ]; then
  case "$url" in
    *untitled*) echo "ERROR: no title" >&2; exit 1 ;;
  esac
  echo "Title of ${url##*/}"
  exit 0
fi
ext="${target:-webm}"
file=$(printf '%s' "$out" | sed "s/%(ext)s/$ext/")
printf '%s' "$url" > "$file"
"#;

/// Write the fake yt-dlp script into `dir` and mark it executable
pub fn install_fake_yt_dlp(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, FAKE_YT_DLP).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Argument lines the fake binary was invoked with, in call order
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Ask the OS for a free loopback port
pub fn free_local_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at the fake binary with an isolated temp directory
pub fn fake_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.tools.yt_dlp_path = Some(install_fake_yt_dlp(temp_dir.path()));
    config.tools.search_path = false;
    config.queue.temp_dir = temp_dir.path().join("work");
    config.server.api.bind_address = free_local_addr();
    config
}

/// Queue wired to the fake binary
pub async fn create_fake_queue() -> (MediaQueue, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let queue = MediaQueue::new(fake_config(&temp_dir)).await.unwrap();
    (queue, temp_dir)
}

/// Poll until the task reports `completed`
pub async fn wait_for_completion(queue: &MediaQueue, task_id: &TaskId) -> TaskSnapshot {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = queue.task_status(task_id).await.unwrap();
            if snapshot.status == TaskStatus::Completed {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap()
}

/// Files left in the queue's temp directory
pub fn work_files(temp_dir: &TempDir) -> Vec<PathBuf> {
    match std::fs::read_dir(temp_dir.path().join("work")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
