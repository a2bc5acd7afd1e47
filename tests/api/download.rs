use crate::helpers::{TestOptions, file_part, share_form, spawn_app, spawn_app_with};

#[tokio::test]
async fn download_without_a_file_parameter_returns_400() {
    let app = spawn_app().await;

    let response = app.get_download(None).await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "File not specified");
}

#[tokio::test]
async fn download_without_credentials_is_challenged() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/api/download", app.address))
        .query(&[("file", "story/1_tale.txt")])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(
        response.headers().get("WWW-Authenticate").unwrap(),
        r#"Basic realm="admin""#
    );
}

#[tokio::test]
async fn download_with_wrong_credentials_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/api/download", app.address))
        .query(&[("file", "story/1_tale.txt")])
        .basic_auth(&app.username, Some("wrong-password"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn download_returns_404_for_an_unknown_key() {
    let app = spawn_app().await;

    let response = app.get_download(Some("story/1_missing.txt")).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn download_returns_500_when_the_bucket_is_unbound() {
    let app = spawn_app_with(TestOptions {
        bind_bucket: false,
        ..TestOptions::default()
    })
    .await;

    let response = app.get_download(Some("story/1_tale.txt")).await;

    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn a_stored_file_round_trips_through_download() {
    let app = spawn_app().await;
    let form = share_form("Ursula", "ursula@domain.com", "story", "A story.").part(
        "file",
        file_part(b"once upon a time".to_vec(), "tale.txt", "text/plain"),
    );
    app.post_share(form).await;

    let keys = app.bucket.keys().await;
    assert_eq!(keys.len(), 1);
    let key = &keys[0];

    let response = app.get_download(Some(key)).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/plain"
    );
    let disposition = response
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("tale.txt"));

    assert_eq!(response.bytes().await.unwrap().as_ref(), b"once upon a time");
}
