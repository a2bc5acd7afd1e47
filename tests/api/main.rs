mod admin;
mod download;
mod health_check;
mod helpers;
