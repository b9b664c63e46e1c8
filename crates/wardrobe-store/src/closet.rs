//! The closet: garment catalog, image uploads and the quiz session behind
//! a single API.

use crate::db::{GarmentStore, UploadedImage};
use crate::error::{Result, StoreError};
use crate::uploads::UploadDir;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wardrobe_core::classifier::{self, ColorLabel};
use wardrobe_core::tone;
use wardrobe_core::{
    scoring, Garment, NewGarment, Outfit, RecommendCriteria, ToneSignal, ToneTally, Undertone,
};

/// Caller-supplied metadata for a new garment. The color is detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentForm {
    #[serde(default)]
    pub garment_type: String,
    /// Defaults to `"Neutral"` when absent.
    #[serde(default)]
    pub undertone: Option<String>,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub occasion: String,
}

pub struct Closet {
    store: GarmentStore,
    uploads: UploadDir,
    tally: ToneTally,
}

impl Closet {
    /// Open the database and upload directory, resuming the persisted quiz tally.
    pub fn open(db_path: &Path, upload_dir: &Path) -> Result<Self> {
        let store = GarmentStore::open(db_path)?;
        let uploads = UploadDir::new(upload_dir)?;
        Self::with_parts(store, uploads)
    }

    pub fn with_parts(store: GarmentStore, uploads: UploadDir) -> Result<Self> {
        let tally = store.tone_counts()?;
        tracing::info!(cool = tally.cool, warm = tally.warm, "quiz tally loaded");
        Ok(Self {
            store,
            uploads,
            tally,
        })
    }

    pub fn store(&self) -> &GarmentStore {
        &self.store
    }

    pub fn uploads(&self) -> &UploadDir {
        &self.uploads
    }

    // --- Garments ---

    /// Copy the image into the upload directory, detect its color and
    /// record the garment.
    pub fn add_garment(&self, source: &Path, form: &GarmentForm) -> Result<Garment> {
        let image = self.uploads.read_source(source)?;
        if !image.has_allowed_extension() {
            return Err(StoreError::UnsupportedExtension(image.original_name));
        }
        let name = self.uploads.save(&image)?;
        let color = classifier::classify_path(&self.uploads.resolve(&name));

        let new = NewGarment {
            garment_type: form.garment_type.clone(),
            color: color.to_string(),
            undertone: form
                .undertone
                .clone()
                .unwrap_or_else(|| Undertone::Neutral.to_string()),
            weather: form.weather.clone(),
            occasion: form.occasion.clone(),
            image_path: name,
        };
        let id = self
            .store
            .insert_garment(&new)
            .inspect_err(|_| self.discard_upload(&new.image_path))?;
        tracing::info!(id, garment_type = %new.garment_type, %color, "garment added");

        self.store
            .get_garment(id)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Store an image for color detection only. The same bytes cannot be
    /// uploaded twice.
    pub fn upload_and_detect(&self, source: &Path) -> Result<UploadedImage> {
        let image = self.uploads.read_source(source)?;
        if let Some(existing) = self.store.find_image_by_hash(&image.hash)? {
            tracing::info!(hash = %image.hash, existing = %existing.file_path, "duplicate upload rejected");
            return Err(StoreError::DuplicateImage {
                existing: existing.file_path,
            });
        }
        let name = self.uploads.save(&image)?;
        let color = classifier::classify_path(&self.uploads.resolve(&name));
        let record = self
            .store
            .insert_image(&image.original_name, &image.hash, &name, color.as_str())
            .inspect_err(|_| self.discard_upload(&name))?;
        tracing::info!(id = record.id, %color, "image uploaded");
        Ok(record)
    }

    pub fn list_garments(&self) -> Result<Vec<Garment>> {
        self.store.list_garments()
    }

    pub fn get_garment(&self, id: i64) -> Result<Option<Garment>> {
        self.store.get_garment(id)
    }

    /// Delete a garment and its image file. `None` if the id is unknown.
    pub fn delete_garment(&mut self, id: i64) -> Result<Option<Garment>> {
        let Some(garment) = self.store.delete_garment(id)? else {
            tracing::debug!(id, "delete: garment not found");
            return Ok(None);
        };
        match self.uploads.remove(&garment.image_path) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(id, image = %garment.image_path, "garment image already missing")
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to remove garment image; row already deleted")
            }
        }
        tracing::info!(id, "garment deleted");
        Ok(Some(garment))
    }

    /// Record one wear. `false` if the id is unknown.
    pub fn record_wear(&self, id: i64) -> Result<bool> {
        let found = self.store.increment_wear_count(id)?;
        tracing::debug!(id, found, "wear recorded");
        Ok(found)
    }

    /// At most one outfit, drawn from every stored garment.
    pub fn recommend(&self, criteria: &RecommendCriteria) -> Result<Vec<Outfit>> {
        let garments = self.store.list_garments()?;
        let outfits = scoring::recommend(&garments, criteria);
        tracing::info!(
            occasion = %criteria.occasion,
            weather = %criteria.weather,
            undertone = %criteria.undertone,
            garments = garments.len(),
            matched = !outfits.is_empty(),
            "recommendation computed"
        );
        Ok(outfits)
    }

    /// Remove a just-saved image whose catalog row was never written.
    fn discard_upload(&self, name: &str) {
        if let Err(e) = self.uploads.remove(name) {
            tracing::warn!(image = name, error = %e, "failed to remove orphaned upload");
        }
    }

    pub fn classify_color(&self, path: &Path) -> ColorLabel {
        classifier::classify_path(path)
    }

    // --- Undertone quiz ---

    /// Count a quiz answer. Unrecognized answers are ignored and return `None`.
    pub fn record_undertone_answer(&mut self, answer: &str) -> Result<Option<ToneSignal>> {
        let Some(signal) = tone::classify_answer(answer) else {
            tracing::debug!(answer, "quiz answer not recognized");
            return Ok(None);
        };
        self.store.increment_tone(signal)?;
        self.tally.record(signal);
        tracing::debug!(answer, signal = signal.key(), "quiz answer recorded");
        Ok(Some(signal))
    }

    pub fn final_undertone(&self) -> Undertone {
        self.tally.finalize()
    }

    pub fn tally(&self) -> ToneTally {
        self.tally
    }

    /// Start a new quiz session.
    pub fn reset_quiz(&mut self) -> Result<()> {
        self.store.reset_tone()?;
        self.tally.reset();
        tracing::info!("quiz tally reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    struct Fixture {
        closet: Closet,
        dir: PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn fixture() -> Fixture {
        let dir = std::env::temp_dir().join(format!("wardrobe-closet-{}", uuid::Uuid::new_v4()));
        let uploads = UploadDir::new(dir.join("uploads")).unwrap();
        let closet = Closet::with_parts(GarmentStore::open_in_memory().unwrap(), uploads).unwrap();
        Fixture { closet, dir }
    }

    fn write_png(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(40, 40, Rgb(rgb)).save(&path).unwrap();
        path
    }

    fn form(kind: &str, occasion: &str, weather: &str) -> GarmentForm {
        GarmentForm {
            garment_type: kind.into(),
            undertone: None,
            weather: weather.into(),
            occasion: occasion.into(),
        }
    }

    #[test]
    fn test_add_garment_detects_color_and_defaults_undertone() {
        let f = fixture();
        let src = write_png(&f.dir, "kurta.png", [255, 0, 0]);

        let garment = f.closet.add_garment(&src, &form("Kurta", "Festive", "Monsoon")).unwrap();
        assert_eq!(garment.color, "red");
        assert_eq!(garment.undertone, "Neutral");
        assert_eq!(garment.wear_count, 0);
        assert!(f.closet.uploads().resolve(&garment.image_path).exists());
        assert_eq!(f.closet.list_garments().unwrap(), vec![garment]);
    }

    #[test]
    fn test_add_garment_rejects_disallowed_extension() {
        let f = fixture();
        let src = f.dir.join("notes.txt");
        std::fs::write(&src, b"hello").unwrap();

        let err = f.closet.add_garment(&src, &form("Kurta", "", "")).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedExtension(_)));
        assert!(f.closet.list_garments().unwrap().is_empty());
    }

    #[test]
    fn test_undecodable_garment_image_is_stored_as_unknown() {
        let f = fixture();
        let src = f.dir.join("broken.jpg");
        std::fs::write(&src, b"definitely not a jpeg").unwrap();

        let garment = f.closet.add_garment(&src, &form("Tshirt", "", "")).unwrap();
        assert_eq!(garment.color, "unknown");
    }

    #[test]
    fn test_delete_cascades_to_image_file() {
        let mut f = fixture();
        let src = write_png(&f.dir, "dress.png", [250, 250, 250]);
        let garment = f.closet.add_garment(&src, &form("Dress", "Party", "Summer")).unwrap();
        let stored = f.closet.uploads().resolve(&garment.image_path);
        assert!(stored.exists());

        let removed = f.closet.delete_garment(garment.id).unwrap().unwrap();
        assert_eq!(removed.id, garment.id);
        assert!(!stored.exists());
        assert!(f.closet.delete_garment(garment.id).unwrap().is_none());
    }

    #[test]
    fn test_record_wear_then_refetch() {
        let f = fixture();
        let src = write_png(&f.dir, "jeans.png", [60, 60, 255]);
        let garment = f.closet.add_garment(&src, &form("Jeans", "Casual", "Summer")).unwrap();

        assert!(f.closet.record_wear(garment.id).unwrap());
        let refetched = f.closet.get_garment(garment.id).unwrap().unwrap();
        assert_eq!(refetched.wear_count, garment.wear_count + 1);
        assert!(!f.closet.record_wear(9999).unwrap());
    }

    #[test]
    fn test_recommend_over_stored_garments() {
        let f = fixture();
        assert!(f
            .closet
            .recommend(&RecommendCriteria::new("Casual", "Summer", "Cool"))
            .unwrap()
            .is_empty());

        let top = write_png(&f.dir, "tee.png", [60, 60, 255]);
        let bottom = write_png(&f.dir, "jeans.png", [250, 250, 250]);
        f.closet.add_garment(&top, &form("Tshirt", "Casual", "Summer")).unwrap();
        f.closet.add_garment(&bottom, &form("Jeans", "Casual", "Summer")).unwrap();

        let outfits = f
            .closet
            .recommend(&RecommendCriteria::new("Casual", "Summer", "Cool"))
            .unwrap();
        assert_eq!(outfits.len(), 1);
        // Tshirt: 15 + 30 + 10 (blue, Cool) = 55; Jeans: 15 + 30 = 45.
        assert_eq!(outfits[0].top_type, "Tshirt");
        assert_eq!(outfits[0].score, 55);
        assert_eq!(outfits[0].match_percent, 100);
        assert_eq!(outfits[0].bottom_type.as_deref(), Some("Jeans"));
        assert_eq!(outfits[0].bottom_color.as_deref(), Some("white"));
    }

    #[test]
    fn test_upload_and_detect_rejects_duplicates() {
        let f = fixture();
        let src = write_png(&f.dir, "swatch.png", [255, 255, 0]);

        let first = f.closet.upload_and_detect(&src).unwrap();
        assert_eq!(first.detected_color, "yellow");
        assert_eq!(first.filename, "swatch.png");

        let err = f.closet.upload_and_detect(&src).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateImage { .. }));
    }

    fn reject_inserts_into(f: &Fixture, table: &str) {
        f.closet
            .store()
            .conn()
            .execute_batch(&format!(
                "CREATE TRIGGER reject_{table} BEFORE INSERT ON {table}
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;"
            ))
            .unwrap();
    }

    fn stored_files(f: &Fixture) -> usize {
        std::fs::read_dir(f.closet.uploads().root()).unwrap().count()
    }

    #[test]
    fn test_failed_garment_insert_leaves_no_upload() {
        let f = fixture();
        reject_inserts_into(&f, "garments");
        let src = write_png(&f.dir, "kurta.png", [255, 0, 0]);

        let err = f.closet.add_garment(&src, &form("Kurta", "Festive", "Monsoon")).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert_eq!(stored_files(&f), 0);
    }

    #[test]
    fn test_failed_image_insert_leaves_no_upload() {
        let f = fixture();
        reject_inserts_into(&f, "images");
        let src = write_png(&f.dir, "swatch.png", [255, 255, 0]);

        assert!(f.closet.upload_and_detect(&src).is_err());
        assert_eq!(stored_files(&f), 0);
    }

    #[test]
    fn test_quiz_session_persists_and_resets() {
        let mut f = fixture();
        assert_eq!(f.closet.record_undertone_answer("bluevein").unwrap(), Some(ToneSignal::Warm));
        assert_eq!(f.closet.record_undertone_answer("nonsense").unwrap(), None);
        assert_eq!(f.closet.final_undertone(), Undertone::Warm);
        assert_eq!(f.closet.store().tone_counts().unwrap(), ToneTally::new(0, 1));

        f.closet.record_undertone_answer("hazeleye").unwrap();
        assert_eq!(f.closet.final_undertone(), Undertone::Neutral);

        f.closet.reset_quiz().unwrap();
        assert_eq!(f.closet.tally(), ToneTally::default());
        assert_eq!(f.closet.store().tone_counts().unwrap(), ToneTally::default());
    }
}
