use std::net::TcpListener;
use std::sync::Arc;

use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use wiremock::MockServer;

use community_api::{
    authentication::ExpectedCredentials,
    configuration::get_configuration,
    domain::SubscriberEmail,
    startup::{StoreHandles, run},
    storage::{InMemoryKeyValueStore, InMemoryObjectStore, KeyValueStore, ObjectStore},
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub subscribers: Arc<InMemoryKeyValueStore>,
    pub submissions: Arc<InMemoryKeyValueStore>,
    pub bucket: Arc<InMemoryObjectStore>,
    pub email_server: MockServer,
    pub api_client: reqwest::Client,
    pub username: String,
    pub password: String,
}

/// Knobs the individual tests turn: which namespaces are bound and how wide
/// the cooldown windows are.
pub struct TestOptions {
    pub bind_subscribers: bool,
    pub bind_submissions: bool,
    pub bind_bucket: bool,
    pub subscribe_cooldown_secs: u64,
    pub share_cooldown_secs: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            bind_subscribers: true,
            bind_submissions: true,
            bind_bucket: true,
            subscribe_cooldown_secs: 60,
            share_cooldown_secs: 300,
        }
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let mut config = get_configuration().expect("Failed to read configuration");
    config.email_client.base_url = email_server.uri();
    config.email_client.admin_email = Some("admin@example.com".into());
    config.intake.subscribe_cooldown_secs = options.subscribe_cooldown_secs;
    config.intake.share_cooldown_secs = options.share_cooldown_secs;

    let subscribers = Arc::new(InMemoryKeyValueStore::new());
    let submissions = Arc::new(InMemoryKeyValueStore::new());
    let bucket = Arc::new(InMemoryObjectStore::new());

    let stores = StoreHandles {
        subscribers: options
            .bind_subscribers
            .then(|| subscribers.clone() as Arc<dyn KeyValueStore>),
        submissions: options
            .bind_submissions
            .then(|| submissions.clone() as Arc<dyn KeyValueStore>),
        bucket: options.bind_bucket.then(|| bucket.clone() as Arc<dyn ObjectStore>),
    };

    let admin_email = config
        .email_client
        .admin_email
        .clone()
        .map(|raw| SubscriberEmail::parse(raw).expect("Invalid admin email in test config."));
    let credentials = ExpectedCredentials::new(&config.auth);
    let username = config.auth.username.clone();
    let password = config.auth.password.expose_secret().to_string();
    let public_base_url = config.storage.public_base_url.clone();
    let email_client = config.email_client.client();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port.");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{port}");

    let server = run(
        listener,
        stores,
        email_client,
        admin_email,
        address.clone(),
        credentials,
        config.intake,
        public_base_url,
    )
    .expect("Failed to build the server.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        subscribers,
        submissions,
        bucket,
        email_server,
        api_client: reqwest::Client::new(),
        username,
        password,
    }
}

impl TestApp {
    pub async fn post_subscribe(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/subscribe", self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_share(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/share", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_admin(&self, view: Option<&str>) -> reqwest::Response {
        let mut request = self
            .api_client
            .get(format!("{}/api/admin", self.address))
            .basic_auth(&self.username, Some(&self.password));
        if let Some(view) = view {
            request = request.query(&[("view", view)]);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get_download(&self, file: Option<&str>) -> reqwest::Response {
        let mut request = self
            .api_client
            .get(format!("{}/api/download", self.address))
            .basic_auth(&self.username, Some(&self.password));
        if let Some(file) = file {
            request = request.query(&[("file", file)]);
        }
        request.send().await.expect("Failed to execute request.")
    }
}

pub fn share_form(
    name: &str,
    email: &str,
    category: &str,
    description: &str,
) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .text("email", email.to_string())
        .text("type", category.to_string())
        .text("description", description.to_string())
}

pub fn file_part(bytes: Vec<u8>, filename: &str, content_type: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(content_type)
        .expect("Invalid content type in test fixture.")
}
