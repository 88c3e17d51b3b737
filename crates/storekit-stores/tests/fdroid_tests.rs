use storekit::{Locale, PackageId, Source, SourceError, StoreAdapter};
use storekit_stores::FDroidAdapter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> FDroidAdapter {
    FDroidAdapter::new(reqwest::Client::new()).with_base_url(server.uri())
}

#[tokio::test]
async fn fetch_maps_suggested_version() {
    let server = MockServer::start().await;
    let fixture = include_str!("fixtures/fdroid_package.json");

    Mock::given(method("GET"))
        .and(path("/api/v1/packages/org.fdroid.fdroid"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(fixture, "application/json"))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let info = adapter
        .fetch(&PackageId::new("org.fdroid.fdroid"), &Locale::default())
        .await
        .unwrap();

    assert_eq!(adapter.source(), Source::FDroid);
    assert_eq!(info.package_id, "org.fdroid.fdroid");
    assert_eq!(info.title, "org.fdroid.fdroid");
    assert_eq!(info.version, "1.19.0");
    assert_eq!(info.version_code, "1019050");
    assert_eq!(
        info.download_url,
        format!("{}/repo/org.fdroid.fdroid_1019050.apk", server.uri())
    );
}

#[tokio::test]
async fn fetch_returns_not_found_for_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/packages/com.missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = adapter_for(&server)
        .fetch(&PackageId::new("com.missing"), &Locale::default())
        .await;

    assert_eq!(
        result,
        Err(SourceError::NotFound {
            package_id: PackageId::new("com.missing"),
            status: 404,
        })
    );
}

#[tokio::test]
async fn fetch_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/packages/org.fdroid.fdroid"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let result = adapter_for(&server)
        .fetch(&PackageId::new("org.fdroid.fdroid"), &Locale::default())
        .await;

    assert!(matches!(result, Err(SourceError::Unavailable(_))));
}

#[tokio::test]
async fn unlisted_suggested_version_has_no_download_link() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/packages/a.b"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"packageName": "a.b", "suggestedVersionCode": 3, "packages": [{"versionName": "1", "versionCode": 1}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let result = adapter_for(&server)
        .fetch(&PackageId::new("a.b"), &Locale::default())
        .await;

    assert_eq!(
        result,
        Err(SourceError::MissingDownloadLink(PackageId::new("a.b")))
    );
}
