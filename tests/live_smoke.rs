use kleinanzeigen_api_client::rest::KleinanzeigenClient;
use kleinanzeigen_api_client::types::SearchParams;

fn live_tests_enabled() -> bool {
    std::env::var("KLEINANZEIGEN_LIVE_TESTS").ok().as_deref() == Some("1")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
#[ignore]
async fn live_search_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }
    init_tracing();

    let client = KleinanzeigenClient::from_env()?;
    let params = SearchParams::new().query("fahrrad").location("Berlin");
    let listings = client.search_listings(&params).await.into_result()?;
    assert!(listings.len() <= 10);
    for listing in &listings {
        assert!(listing.url.starts_with("https://www.kleinanzeigen.de/s-anzeige/"));
    }

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_locations_and_categories_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }
    init_tracing();

    let client = KleinanzeigenClient::from_env()?;
    let locations = client.search_locations("10115", Some(5)).await.into_result()?;
    assert!(locations.len() <= 5);

    let categories = client.get_categories().await.into_result()?;
    assert!(!categories.is_empty());

    Ok(())
}
