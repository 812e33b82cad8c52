use aikeys::auth::Auth;
use aikeys::provider::Provider;
use aikeys::service::{APIService, ProviderService, Verification};
use aikeys::store::Settings;

// These tests aren't particularly interesting and mostly serve to ensure
// that we can actually connect to Replicate. They need a real token in
// $REPLICATE_API_TOKEN, so they are skipped by default.

#[tokio::test]
#[ignore = "requires $REPLICATE_API_TOKEN"]
async fn it_verifies_a_replicate_token() {
    let auth = Auth::for_provider(Provider::Replicate, &Settings::default())
        .expect("Could not create auth. Is $REPLICATE_API_TOKEN set?");
    let service = ProviderService::new().expect("could not create service");
    let result = service
        .verify(Provider::Replicate, &auth)
        .await
        .expect("could not make Replicate API request");
    assert_eq!(result, Verification::Valid);
}

#[tokio::test]
#[ignore = "requires network access"]
async fn it_rejects_a_bogus_replicate_token() {
    let auth = Auth::new("r8_ThisIsNotARealToken");
    let service = ProviderService::new().expect("could not create service");
    let result = service
        .verify(Provider::Replicate, &auth)
        .await
        .expect("could not make Replicate API request");
    assert!(matches!(result, Verification::Invalid(_)));
}

#[tokio::test]
#[ignore = "requires $REPLICATE_API_TOKEN"]
async fn it_retrieves_the_account() {
    let auth = Auth::from_env("REPLICATE_API_TOKEN")
        .expect("Could not create auth. Is $REPLICATE_API_TOKEN set?");
    let service = ProviderService::new().expect("could not create service");
    let body = service
        .get("https://api.replicate.com/v1/account", &auth)
        .await
        .expect("could not make Replicate API request");
    assert_ne!(body, "");
}
