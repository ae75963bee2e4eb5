use std::sync::Arc;

use anyhow::Result;
use ledger::http::LedgerApi;
use ledger::{Block, CatalogItem, Chain, catalog_identifier};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// Spawns the API on an OS-assigned port and returns its base URL and chain.
async fn spawn_app() -> (String, Arc<RwLock<Chain>>) {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("TcpListener bind to port 0");
    let port = listener.local_addr().expect("local_addr").port();

    let chain = Arc::new(RwLock::new(Chain::new().expect("chain creation failed")));
    let api = LedgerApi::new(Arc::clone(&chain));
    tokio::spawn(async move { api.run(listener).await });

    (format!("http://127.0.0.1:{port}"), chain)
}

#[tokio::test]
async fn get_chain_returns_genesis() -> Result<()> {
    let (url, _) = spawn_app().await;

    let response = Client::new().get(&url).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await?;
    assert!(body.contains('\n'), "chain should be indented JSON");

    let blocks: Vec<Block> = serde_json::from_str(&body)?;
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].payload.is_genesis);

    Ok(())
}

#[tokio::test]
async fn post_checkout_appends_block() -> Result<()> {
    let (url, chain) = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(&url)
        .json(&json!({ "item_id": "b1", "holder": "alice", "checkout_date": "2024-01-01" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let block: Block = response.json().await?;
    assert_eq!(block.position, 1);
    assert_eq!(block.payload.holder, "alice");
    assert!(!block.payload.is_genesis);

    let blocks: Vec<Block> = client.get(&url).send().await?.json().await?;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1], block);
    assert_eq!(block.predecessor_commitment, blocks[0].commitment);

    assert_eq!(chain.read().await.height(), 2);

    Ok(())
}

#[tokio::test]
async fn post_checkout_ignores_genesis_flag() -> Result<()> {
    let (url, _) = spawn_app().await;

    let block: Block = Client::new()
        .post(&url)
        .json(&json!({ "book_id": "b1", "user": "bob", "is_genesis": true }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(block.payload.item_id, "b1");
    assert_eq!(block.payload.holder, "bob");
    assert!(!block.payload.is_genesis);

    Ok(())
}

#[tokio::test]
async fn malformed_checkout_is_a_server_error() -> Result<()> {
    let (url, chain) = spawn_app().await;

    let response = Client::new()
        .post(&url)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: Value = response.json().await?;
    assert_eq!(error["message"], "unable to write block");
    assert_eq!(chain.read().await.height(), 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_stay_linked() -> Result<()> {
    let (url, chain) = spawn_app().await;
    let client = Client::new();

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(&url)
                .json(&json!({ "item_id": format!("b{i}"), "holder": "alice" }))
                .send()
                .await
                .map(|r| r.status())
        }));
    }
    for handle in handles {
        assert_eq!(handle.await??, StatusCode::CREATED);
    }

    let chain = chain.read().await;
    assert_eq!(chain.height(), 17);
    chain.audit()?;

    Ok(())
}

#[tokio::test]
async fn new_catalog_item_gets_identifier() -> Result<()> {
    let (url, _) = spawn_app().await;

    let response = Client::new()
        .post(format!("{url}/new"))
        .json(&json!({
            "isbn": "9780441013593",
            "title": "Dune",
            "author": "Frank Herbert",
            "publish_date": "1965-08-01"
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let item: CatalogItem = response.json().await?;
    assert_eq!(
        item.identifier,
        catalog_identifier("9780441013593", "1965-08-01")
    );
    assert_eq!(item.identifier.len(), 32);
    assert_eq!(item.title, "Dune");
    assert_eq!(item.creator, "Frank Herbert");

    Ok(())
}

#[tokio::test]
async fn malformed_catalog_item_is_a_server_error() -> Result<()> {
    let (url, _) = spawn_app().await;

    let response = Client::new()
        .post(format!("{url}/new"))
        .header("content-type", "application/json")
        .body("[1, 2")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

#[tokio::test]
async fn block_lookup_and_height() -> Result<()> {
    let (url, _) = spawn_app().await;
    let client = Client::new();

    client
        .post(&url)
        .json(&json!({ "item_id": "b1", "holder": "alice" }))
        .send()
        .await?;

    let height: Value = client.get(format!("{url}/height")).send().await?.json().await?;
    assert_eq!(height["height"], 2);

    let block: Block = client.get(format!("{url}/block/1")).send().await?.json().await?;
    assert_eq!(block.payload.item_id, "b1");

    let missing = client.get(format!("{url}/block/7")).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn validate_reports_healthy_chain() -> Result<()> {
    let (url, _) = spawn_app().await;

    let report: Value = Client::new()
        .get(format!("{url}/validate"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(report["ok"], true);
    assert_eq!(report["height"], 1);
    assert!(report["error"].is_null());

    Ok(())
}
