//! QR images for ticket codes, stored as `qr_<code>.png`.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use derive_more::{Display, From};
use image::{ImageFormat, Luma};
use qrcode::{types::QrError, EcLevel, QrCode};
use tokio::{fs, io, task};

/// Where the HTTP server exposes the QR directory.
pub const URL_PREFIX: &str = "/qr_codes";

const MODULE_SIZE: u32 = 10;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("cannot encode QR code: {_0}")]
    Encode(QrError),

    #[display("cannot write PNG: {_0}")]
    Image(image::ImageError),

    #[display("cannot store QR image: {_0}")]
    Io(io::Error),

    #[display("QR rendering task failed: {_0}")]
    Task(task::JoinError),
}

impl std::error::Error for Error {}

pub fn render_png(data: &str) -> Result<Vec<u8>, Error> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(code: &str) -> String {
        format!("qr_{code}.png")
    }

    pub fn url_path(code: &str) -> String {
        format!("{URL_PREFIX}/{}", Self::file_name(code))
    }

    /// Renders and writes the image for `code`, returning its URL path.
    pub async fn save(&self, code: &str) -> Result<String, Error> {
        let data = code.to_owned();
        let png = task::spawn_blocking(move || render_png(&data)).await??;
        fs::write(self.dir.join(Self::file_name(code)), png).await?;
        Ok(Self::url_path(code))
    }

    pub async fn remove(&self, code: &str) {
        let path = self.dir.join(Self::file_name(code));
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove QR image");
        }
    }
}
