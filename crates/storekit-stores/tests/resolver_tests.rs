use std::sync::Arc;

use storekit::{LinkResolver, PackageId, Source, SourcePriority, StoreAdapter};
use storekit_stores::{
    ApkComboAdapter, ApkPureAdapter, AptoideAdapter, FDroidAdapter, GooglePlayAdapter,
    HttpSizeProbe,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapters_for(server: &MockServer) -> Vec<Arc<dyn StoreAdapter>> {
    let client = reqwest::Client::new();
    let base = server.uri();
    let google_play: Arc<dyn StoreAdapter> =
        Arc::new(GooglePlayAdapter::new(client.clone()).with_base_url(&base));
    let aptoide: Arc<dyn StoreAdapter> =
        Arc::new(AptoideAdapter::new(client.clone()).with_base_url(&base));
    let fdroid: Arc<dyn StoreAdapter> =
        Arc::new(FDroidAdapter::new(client.clone()).with_base_url(&base));
    let apkpure: Arc<dyn StoreAdapter> = Arc::new(
        ApkPureAdapter::new(client.clone())
            .with_base_url(&base)
            .with_download_base_url(format!("{base}/xapk")),
    );
    let apkcombo: Arc<dyn StoreAdapter> =
        Arc::new(ApkComboAdapter::new(client).with_base_url(&base));

    vec![google_play, aptoide, fdroid, apkpure, apkcombo]
}

#[tokio::test]
async fn falls_back_to_fdroid_and_probes_its_link() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/packages/org.fdroid.fdroid"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/fdroid_package.json"),
            "application/json",
        ))
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/repo/org.fdroid.fdroid_1019050.apk"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
        .mount(&server)
        .await;

    let priority = SourcePriority::with_order(&[Source::ApkCombo, Source::FDroid]).unwrap();
    let resolver = LinkResolver::new(
        adapters_for(&server),
        priority,
        Arc::new(HttpSizeProbe::new(reqwest::Client::new())),
    );

    let link = resolver
        .resolve(&PackageId::new("org.fdroid.fdroid"))
        .await
        .unwrap();

    assert_eq!(link.source, Source::FDroid);
    assert_eq!(link.version, "1.19.0");
    assert_eq!(link.version_code, "1019050");
    assert_eq!(link.file_size, 2048);
    assert!(link.has_known_size());
    assert_eq!(
        link.download_url,
        format!("{}/repo/org.fdroid.fdroid_1019050.apk", server.uri())
    );
}

#[tokio::test]
async fn every_store_failing_yields_aggregate_message() {
    let server = MockServer::start().await;

    let resolver = LinkResolver::new(
        adapters_for(&server),
        SourcePriority::new(),
        Arc::new(HttpSizeProbe::new(reqwest::Client::new())),
    );

    let err = resolver
        .resolve(&PackageId::new("com.none"))
        .await
        .unwrap_err();

    assert_eq!(
        err.sources_tried(),
        vec![
            Source::ApkPure,
            Source::ApkCombo,
            Source::FDroid,
            Source::Aptoide,
            Source::GooglePlay,
        ]
    );

    let not_found = "package com.none does not exist or is not accessible (HTTP 404)";
    assert_eq!(
        err.to_string(),
        format!(
            "Failed to retrieve APK download link for package: com.none. \
             Tried the following sources: APKPURE, APKCOMBO, FDROID, APTOIDE, GOOGLE_PLAY. \
             Errors: APKPURE: {not_found}; APKCOMBO: {not_found}; FDROID: {not_found}; \
             APTOIDE: {not_found}; GOOGLE_PLAY: {not_found}"
        )
    );
}
