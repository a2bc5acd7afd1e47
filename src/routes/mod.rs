mod admin;
mod download;
mod health_check;
mod helpers;
mod share;
mod subscribe;

pub use admin::admin_panel;
pub use download::download_file;
pub use health_check::health_check;
pub use helpers::preflight;
pub use share::{share, share_info};
pub use subscribe::{subscribe, subscribe_info};
