use crate::engine::{EngineError, EngineHandle};
use std::path::PathBuf;
use wardrobe_core::RecommendCriteria;
use wardrobe_store::{GarmentForm, StoreError};
use zbus::interface;

/// Well-known bus name and object path.
pub const BUS_NAME: &str = "org.freedesktop.Wardrobe1";
pub const OBJECT_PATH: &str = "/org/freedesktop/Wardrobe1";

/// D-Bus interface for the wardrobe daemon.
///
/// Structured results are returned as JSON strings. Unknown garment ids are
/// reported as `false`, never as errors.
pub struct WardrobeService {
    engine: EngineHandle,
}

impl WardrobeService {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

fn to_fdo(err: EngineError) -> zbus::fdo::Error {
    match err {
        EngineError::Store(StoreError::UnsupportedExtension(msg)) => {
            zbus::fdo::Error::InvalidArgs(format!("unsupported image type: {msg}"))
        }
        EngineError::Store(StoreError::MissingFileName(path)) => {
            zbus::fdo::Error::InvalidArgs(format!("image path has no file name: {path}"))
        }
        EngineError::Store(StoreError::DuplicateImage { existing }) => {
            zbus::fdo::Error::FileExists(format!("image already uploaded as {existing}"))
        }
        EngineError::Store(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            zbus::fdo::Error::FileNotFound(e.to_string())
        }
        other => zbus::fdo::Error::Failed(other.to_string()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> zbus::fdo::Result<String> {
    serde_json::to_string(value).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
}

#[interface(name = "org.freedesktop.Wardrobe1")]
impl WardrobeService {
    /// Add a garment from an image file readable by the daemon.
    async fn add_garment(
        &self,
        image_path: &str,
        garment_type: &str,
        undertone: &str,
        weather: &str,
        occasion: &str,
    ) -> zbus::fdo::Result<String> {
        tracing::info!(image_path, garment_type, "add_garment requested");
        let form = GarmentForm {
            garment_type: garment_type.to_string(),
            undertone: (!undertone.is_empty()).then(|| undertone.to_string()),
            weather: weather.to_string(),
            occasion: occasion.to_string(),
        };
        let garment = self
            .engine
            .add_garment(PathBuf::from(image_path), form)
            .await
            .map_err(to_fdo)?;
        to_json(&garment)
    }

    /// Store an image and report its detected color.
    async fn upload_and_detect(&self, image_path: &str) -> zbus::fdo::Result<String> {
        tracing::info!(image_path, "upload_and_detect requested");
        let image = self
            .engine
            .upload_and_detect(PathBuf::from(image_path))
            .await
            .map_err(to_fdo)?;
        to_json(&image)
    }

    async fn delete_garment(&self, id: i64) -> zbus::fdo::Result<bool> {
        tracing::info!(id, "delete_garment requested");
        let removed = self.engine.delete_garment(id).await.map_err(to_fdo)?;
        Ok(removed.is_some())
    }

    async fn record_wear(&self, id: i64) -> zbus::fdo::Result<bool> {
        tracing::info!(id, "record_wear requested");
        self.engine.record_wear(id).await.map_err(to_fdo)
    }

    async fn list_garments(&self) -> zbus::fdo::Result<String> {
        let garments = self.engine.list_garments().await.map_err(to_fdo)?;
        to_json(&garments)
    }

    /// Recommend an outfit. Returns a JSON array with at most one entry.
    async fn recommend(
        &self,
        occasion: &str,
        weather: &str,
        undertone: &str,
        use_weather: bool,
        use_undertone: bool,
    ) -> zbus::fdo::Result<String> {
        tracing::info!(occasion, weather, undertone, use_weather, use_undertone, "recommend requested");
        let criteria = RecommendCriteria {
            use_weather,
            use_undertone,
            ..RecommendCriteria::new(occasion, weather, undertone)
        };
        let outfits = self.engine.recommend(criteria).await.map_err(to_fdo)?;
        to_json(&outfits)
    }

    /// Count one quiz answer. Returns `false` for unrecognized answers.
    async fn record_undertone_answer(&self, answer: &str) -> zbus::fdo::Result<bool> {
        let signal = self
            .engine
            .record_answer(answer.to_string())
            .await
            .map_err(to_fdo)?;
        Ok(signal.is_some())
    }

    async fn final_undertone(&self) -> zbus::fdo::Result<String> {
        let undertone = self.engine.final_undertone().await.map_err(to_fdo)?;
        Ok(undertone.to_string())
    }

    async fn reset_quiz(&self) -> zbus::fdo::Result<()> {
        tracing::info!("reset_quiz requested");
        self.engine.reset_quiz().await.map_err(to_fdo)
    }

    /// Return daemon status information.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let status = self.engine.status().await.map_err(to_fdo)?;
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "garments": status.garments,
            "quiz": status.tally,
            "undertone": status.undertone,
        })
        .to_string())
    }
}
