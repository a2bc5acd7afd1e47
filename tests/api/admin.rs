use crate::helpers::{share_form, spawn_app};

#[tokio::test]
async fn admin_without_credentials_is_challenged() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/api/admin", app.address))
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
async fn admin_with_wrong_credentials_is_rejected_without_data() {
    let app = spawn_app().await;
    app.post_subscribe("email=ursula%40domain.com".into()).await;

    let response = app
        .api_client
        .get(format!("{}/api/admin", app.address))
        .basic_auth(&app.username, Some("wrong-password"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(
        !body.contains("ursula@domain.com"),
        "A rejected request must not leak stored data."
    );
}

#[tokio::test]
async fn the_dashboard_counts_stored_records() {
    let app = spawn_app().await;
    app.post_subscribe("email=ursula%40domain.com".into()).await;
    app.post_share(share_form("Ursula", "ursula@domain.com", "story", "A story."))
        .await;

    let response = app.get_admin(None).await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Email Subscribers"));
    assert!(body.contains("Submissions"));
    assert!(body.contains(r#"<div class="stat-number">1</div>"#));
}

#[tokio::test]
async fn the_emails_view_lists_subscribers() {
    let app = spawn_app().await;
    app.post_subscribe("email=ursula%40domain.com".into()).await;

    let response = app.get_admin(Some("emails")).await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("ursula@domain.com"));
    assert!(body.contains("Export as CSV"));
}

#[tokio::test]
async fn the_submissions_view_lists_submissions_with_their_file_link() {
    let app = spawn_app().await;
    let form = share_form("Ursula", "ursula@domain.com", "template", "My CV template.")
        .part(
            "file",
            crate::helpers::file_part(b"%PDF-1.4".to_vec(), "cv.pdf", "application/pdf"),
        );
    app.post_share(form).await;

    let response = app.get_admin(Some("submissions")).await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Ursula"));
    assert!(body.contains("My CV template."));
    assert!(
        body.contains("/api/download?file=template/"),
        "Stored files must be linked through the download route."
    );
}

#[tokio::test]
async fn an_unknown_view_renders_the_no_data_placeholder() {
    let app = spawn_app().await;

    let response = app.get_admin(Some("secrets")).await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("No data available"));
}
