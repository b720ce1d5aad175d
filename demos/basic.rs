use placekit_http::{Params, PlaceKitClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_key = std::env::var("PLACEKIT_API_KEY")?;

    let client = PlaceKitClient::builder(api_key)
        .params(Params::new().timeout(3_000).countries(["fr"]))
        .build()?;

    let result = client
        .search("42 avenue champs elysees", Params::new().max_results(3))
        .await?;

    for place in result.results {
        println!("{} — {} {}", place.name, place.city, place.coordinates);
    }

    let nearby = client
        .reverse(Params::new().coordinates("48.8584,2.2945"))
        .await?;
    println!("{} place(s) around the Eiffel Tower", nearby.results.len());

    Ok(())
}
