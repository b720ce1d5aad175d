use std::fs;

use placekit_http::{Params, PlaceKitClient, PlaceKitError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "PLACEKIT_API_KEY")]
    placekit_api_key: Option<String>,
}

fn load_live_api_key() -> Result<String, String> {
    if let Ok(api_key) = std::env::var("PLACEKIT_API_KEY") {
        if !api_key.trim().is_empty() {
            return Ok(api_key);
        }
    }

    let content = fs::read_to_string("secrets.json")
        .map_err(|_| "PLACEKIT_API_KEY env or secrets.json is required".to_owned())?;
    let parsed: SecretsFile = serde_json::from_str(&content)
        .map_err(|err| format!("secrets.json could not be parsed: {err}"))?;

    parsed
        .placekit_api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| "missing PLACEKIT_API_KEY in secrets.json".to_owned())
}

#[tokio::test]
async fn live_search_and_reverse() {
    let api_key = match load_live_api_key() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("skipping live test: credentials not found in env or secrets.json");
            return;
        }
    };

    let client = PlaceKitClient::builder(api_key)
        .without_locale()
        .params(Params::new().timeout(5_000).language("fr"))
        .build()
        .expect("client must build");

    let search = client
        .search("tour eiffel", Params::new().max_results(3))
        .await
        .expect("search must succeed");
    assert!(search.results.len() <= 3);

    let reverse = client
        .reverse(Params::new().coordinates("48.8584,2.2945"))
        .await
        .expect("reverse must succeed");
    assert!(reverse.results.len() <= 5);
}

#[tokio::test]
async fn live_invalid_key_is_client_error() {
    if load_live_api_key().is_err() {
        eprintln!("skipping live test: credentials not found in env or secrets.json");
        return;
    }

    let client = PlaceKitClient::builder("invalid-key")
        .without_locale()
        .params(Params::new().timeout(5_000))
        .build()
        .expect("client must build");

    let err = client
        .search("paris", ())
        .await
        .expect_err("invalid key must be rejected");
    match err {
        PlaceKitError::Client(api) => assert!((400..500).contains(&api.status)),
        other => panic!("expected client error, got {other:?}"),
    }
}
