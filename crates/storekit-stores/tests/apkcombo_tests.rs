use storekit::{Locale, PackageId, SourceError, StoreAdapter};
use storekit_stores::ApkComboAdapter;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> ApkComboAdapter {
    ApkComboAdapter::new(reqwest::Client::new()).with_base_url(server.uri())
}

#[tokio::test]
async fn direct_links_are_used_without_posting() {
    let server = MockServer::start().await;
    let fixture = include_str!("fixtures/apkcombo_direct.html");

    Mock::given(method("GET"))
        .and(path("/app/com.waze/download/apk"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(fixture, "text/html"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let info = adapter_for(&server)
        .fetch(&PackageId::new("com.waze"), &Locale::default())
        .await
        .unwrap();

    assert_eq!(
        info.download_url,
        "https://download.apkcombo.com/com.waze/Waze_5.6.0.1.apk?exp=1"
    );
    assert_eq!(info.version, "Waze 5.6.0.1");
    assert_eq!(info.version_code, "1030572");
    assert_eq!(info.title, "Waze Navigation & Live Traffic");
}

#[tokio::test]
async fn loader_page_posts_to_dynamic_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/com.waze/download/apk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/apkcombo_loader.html"), "text/html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/waze-navigation/com.waze/a1b2c3/dl"))
        .and(body_string_contains("package_name=com.waze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/apkcombo_variants.html"), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let info = adapter_for(&server)
        .fetch(&PackageId::new("com.waze"), &Locale::default())
        .await
        .unwrap();

    assert_eq!(
        info.download_url,
        format!("{}/d/com.waze/Waze_5.7.0.apk", server.uri())
    );
    assert_eq!(info.version, "Waze 5.7.0");
    assert_eq!(info.version_code, "1030700");
}

#[tokio::test]
async fn failed_post_falls_back_to_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/com.waze/download/apk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/apkcombo_loader.html"), "text/html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/waze-navigation/com.waze/a1b2c3/dl"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let info = adapter_for(&server)
        .fetch(&PackageId::new("com.waze"), &Locale::default())
        .await
        .unwrap();

    assert!(info.download_url.is_empty());
    assert_eq!(info.title, "Waze Navigation & Live Traffic");
}

#[tokio::test]
async fn fetch_returns_not_found_for_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/com.missing/download/apk"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = adapter_for(&server)
        .fetch(&PackageId::new("com.missing"), &Locale::default())
        .await;

    assert!(matches!(result, Err(SourceError::NotFound { status: 404, .. })));
}
