//! Shared test utilities for the exchange and add/cat integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use common::blockstore::{BlobsStore, Blockstore};
use common::cancel::CancellationToken;
use common::dag::{DagBuilder, DagReader, DagService, Layout, SizeSplitter};
use common::exchange::{Session, SessionGenerator};
use common::linked_data::Cid;
use tempfile::TempDir;

/// Route crate logs to the test harness output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A generator with two sessions, the adder first
pub async fn setup_pair(
    network_latency: Duration,
    routing_latency: Duration,
) -> (SessionGenerator, Session, Session) {
    let mut generator = SessionGenerator::with_latency(network_latency, routing_latency);
    let adder = generator.next().await.unwrap();
    let catter = generator.next().await.unwrap();
    (generator, adder, catter)
}

/// A DAG service over a filesystem-backed store
pub async fn setup_fs_dag() -> (DagService, Arc<dyn Blockstore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn Blockstore> =
        Arc::new(BlobsStore::fs(&temp_dir.path().join("blobs")).await.unwrap());
    (DagService::offline(store.clone()), store, temp_dir)
}

/// Build `data` into a DAG and return the root
pub async fn build(dag: &DagService, data: &[u8], chunk_size: usize, layout: Layout) -> Cid {
    DagBuilder::new(dag.clone())
        .with_layout(layout)
        .build(
            Cursor::new(data.to_vec()),
            &SizeSplitter::new(chunk_size),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
}

/// Read the whole DAG under `root`
pub async fn read(dag: &DagService, root: &Cid) -> Vec<u8> {
    let cancel = CancellationToken::new();
    let node = dag.get(root, &cancel).await.unwrap();
    DagReader::new(node, dag.clone(), cancel)
        .read_to_end()
        .await
        .unwrap()
}
