//! Integration tests for resolving references across sessions

mod common;

use std::sync::Arc;
use std::time::Duration;

use ::common::cancel::CancellationToken;
use ::common::dag::{DagNode, DagReader};
use ::common::error::ErrorKind;
use ::common::path::{MemoryNameSystem, Path, ResolveError, Resolver};
use bytes::Bytes;

/// Store `index.html` under `site/` in the session's dag, return the root
async fn publish_site(dag: &::common::dag::DagService) -> (DagNode, DagNode) {
    let index = DagNode::leaf(b"<h1>weft</h1>".to_vec()).unwrap();
    let site = DagNode::new(Bytes::new(), vec![index.link("index.html")]).unwrap();
    let root = DagNode::new(Bytes::new(), vec![site.link("site")]).unwrap();
    for node in [&index, &site, &root] {
        dag.put(node).await.unwrap();
    }
    (root, index)
}

#[tokio::test]
async fn test_path_resolves_over_the_network() {
    let (mut generator, adder, catter) = common::setup_pair(Duration::ZERO, Duration::ZERO).await;
    let (root, index) = publish_site(&adder.dag()).await;
    let cancel = CancellationToken::new();

    let resolver = Resolver::offline(catter.dag());
    let path = format!("/ipfs/{}/site/index.html", root.cid());
    let node = resolver.resolve(&path, &cancel).await.unwrap();
    assert_eq!(node, index);

    let data = DagReader::new(node, catter.dag(), cancel)
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(data, b"<h1>weft</h1>");
    generator.close();
}

#[tokio::test]
async fn test_resolving_twice_gives_same_node() {
    let (mut generator, adder, catter) = common::setup_pair(Duration::ZERO, Duration::ZERO).await;
    let (root, _) = publish_site(&adder.dag()).await;
    let cancel = CancellationToken::new();

    let resolver = Resolver::offline(catter.dag());
    let path = format!("{}/site", root.cid());
    // a cid without the /ipfs/ namespace is a name root, and we're offline
    let err = resolver.resolve(&path, &cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Offline);

    let path = format!("/ipfs/{}/site", root.cid());
    let first = resolver.resolve(&path, &cancel).await.unwrap();
    let second = resolver.resolve(&path, &cancel).await.unwrap();
    assert_eq!(first, second);
    generator.close();
}

#[tokio::test]
async fn test_named_site() {
    let (mut generator, adder, catter) = common::setup_pair(Duration::ZERO, Duration::ZERO).await;
    let (root, index) = publish_site(&adder.dag()).await;
    let cancel = CancellationToken::new();

    let names = MemoryNameSystem::new();
    names.insert("weft.example", Path::from_cid(*root.cid()).join(&["site"]));
    let resolver = Resolver::new(catter.dag(), Arc::new(names.clone()));

    let node = resolver
        .resolve("/ipns/weft.example/index.html", &cancel)
        .await
        .unwrap();
    assert_eq!(node, index);

    names.remove("weft.example");
    let err = resolver
        .resolve("/ipns/weft.example/index.html", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NameNotFound(_)));
    generator.close();
}

#[tokio::test]
async fn test_malformed_references() {
    let (mut generator, _adder, catter) = common::setup_pair(Duration::ZERO, Duration::ZERO).await;
    let resolver = Resolver::offline(catter.dag());
    let cancel = CancellationToken::new();

    for input in ["", "   ", "bafy-not-really", "/ipfs/", "/ipfs/nope", "a//b"] {
        let err = resolver.resolve(input, &cancel).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference, "input {input:?}");
    }
    generator.close();
}
