use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use crate::authentication::ExpectedCredentials;
use crate::configuration::{IntakeSettings, Settings, StorageSettings};
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::routes::{
    admin_panel, download_file, health_check, preflight, share, share_info, subscribe,
    subscribe_info,
};
use crate::storage::{InMemoryKeyValueStore, InMemoryObjectStore, KeyValueStore, ObjectStore};

pub struct Application {
    port: u16,
    server: Server,
}

pub struct ApplicationBaseURL(pub String);

/// Notification recipient; `None` disables the admin notification.
pub struct AdminEmail(pub Option<SubscriberEmail>);

/// Public base URL of the bucket; `None` routes files through download.
pub struct PublicFileBase(pub Option<String>);

/// Subscriber namespace: `email:*` records and subscribe markers.
pub struct SubscriberStore(pub Option<Arc<dyn KeyValueStore>>);

/// Submission namespace: `submission:*` records, share markers, day index.
pub struct SubmissionStore(pub Option<Arc<dyn KeyValueStore>>);

pub struct SubmissionBucket(pub Option<Arc<dyn ObjectStore>>);

/// The store bindings handed to `run`. On the hosting platform these come
/// from the environment; locally the in-memory implementations stand in.
#[derive(Default, Clone)]
pub struct StoreHandles {
    pub subscribers: Option<Arc<dyn KeyValueStore>>,
    pub submissions: Option<Arc<dyn KeyValueStore>>,
    pub bucket: Option<Arc<dyn ObjectStore>>,
}

impl StoreHandles {
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self {
            subscribers: settings
                .subscribers
                .then(|| Arc::new(InMemoryKeyValueStore::new()) as Arc<dyn KeyValueStore>),
            submissions: settings
                .submissions
                .then(|| Arc::new(InMemoryKeyValueStore::new()) as Arc<dyn KeyValueStore>),
            bucket: settings
                .bucket
                .then(|| Arc::new(InMemoryObjectStore::new()) as Arc<dyn ObjectStore>),
        }
    }
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let admin_email = match &config.email_client.admin_email {
            Some(raw) => Some(
                SubscriberEmail::parse(raw.clone())
                    .map_err(|err| anyhow::anyhow!("Invalid admin email address: {err}"))?,
            ),
            None => None,
        };
        let email_client = config.email_client.client();

        let stores = StoreHandles::from_settings(&config.storage);
        let credentials = ExpectedCredentials::new(&config.auth);

        let address = format!("{}:{}", config.app.host, config.app.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            stores,
            email_client,
            admin_email,
            config.app.base_url,
            credentials,
            config.intake,
            config.storage.public_base_url,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    listener: TcpListener,
    stores: StoreHandles,
    email_client: EmailClient,
    admin_email: Option<SubscriberEmail>,
    base_url: String,
    credentials: ExpectedCredentials,
    intake: IntakeSettings,
    public_file_base: Option<String>,
) -> Result<Server, anyhow::Error> {
    let subscriber_store = web::Data::new(SubscriberStore(stores.subscribers));
    let submission_store = web::Data::new(SubmissionStore(stores.submissions));
    let bucket = web::Data::new(SubmissionBucket(stores.bucket));
    let email_client = web::Data::new(email_client);
    let admin_email = web::Data::new(AdminEmail(admin_email));
    let base_url = web::Data::new(ApplicationBaseURL(base_url));
    let credentials = web::Data::new(credentials);
    let intake = web::Data::new(intake);
    let public_file_base = web::Data::new(PublicFileBase(public_file_base));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/subscribe", web::post().to(subscribe))
                    .route("/subscribe", web::get().to(subscribe_info))
                    .route("/subscribe", web::method(Method::OPTIONS).to(preflight))
                    .route("/share", web::post().to(share))
                    .route("/share", web::get().to(share_info))
                    .route("/share", web::method(Method::OPTIONS).to(preflight))
                    .route("/admin", web::get().to(admin_panel))
                    .route("/download", web::get().to(download_file)),
            )
            .app_data(subscriber_store.clone())
            .app_data(submission_store.clone())
            .app_data(bucket.clone())
            .app_data(email_client.clone())
            .app_data(admin_email.clone())
            .app_data(base_url.clone())
            .app_data(credentials.clone())
            .app_data(intake.clone())
            .app_data(public_file_base.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
