use std::{net, path::PathBuf, time};

use serde::Deserialize;

use crate::session;

#[derive(Deserialize)]
pub struct Config {
    pub db: Db,
    pub http: Http,
    pub session: Session,
    #[serde(default)]
    pub qr: Qr,
}

#[derive(Deserialize)]
pub struct Db {
    pub url: String,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Deserialize)]
pub struct Session {
    pub secret: String,

    /// Lifetime of both the signed token and the cookie carrying it.
    #[serde(default = "default_max_age", with = "humantime_serde")]
    pub max_age: time::Duration,

    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_max_age() -> time::Duration {
    session::DEFAULT_MAX_AGE
}

#[derive(Deserialize)]
pub struct Qr {
    pub dir: PathBuf,
}

impl Default for Qr {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/qr_codes"),
        }
    }
}
