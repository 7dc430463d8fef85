//! Storage port: Trait for patient record persistence.
//!
//! This trait abstracts the storage backend (SQLite) from the application logic.

use serde::{Deserialize, Serialize};

use crate::domain::PatientRecord;

/// A persisted record with its storage identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPatient {
    pub id: i64,
    pub record: PatientRecord,
}

/// A page of records with pagination metadata.
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Records in this page
    pub items: Vec<StoredPatient>,
    /// Total count of all records
    pub total_count: usize,
    /// Current page (1-based)
    pub page: usize,
    /// Page size limit
    pub per_page: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl RecordPage {
    /// Create a new record page.
    #[must_use]
    pub fn new(items: Vec<StoredPatient>, total_count: usize, page: usize, per_page: usize) -> Self {
        let offset = page.saturating_sub(1) * per_page;
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            page,
            per_page,
            has_more,
        }
    }

    /// Get the next page number.
    #[must_use]
    pub fn next_page(&self) -> Option<usize> {
        self.has_more.then_some(self.page + 1)
    }

    /// Get the previous page number.
    #[must_use]
    pub fn prev_page(&self) -> Option<usize> {
        (self.page > 1).then(|| self.page - 1)
    }
}

/// Partial update of a stored record. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    pub age: Option<i64>,
    pub gender: Option<u8>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub ap_hi: Option<i32>,
    pub ap_lo: Option<i32>,
    pub cholesterol: Option<u8>,
    pub gluc: Option<u8>,
    pub smoke: Option<bool>,
    pub alco: Option<bool>,
    pub active: Option<bool>,
    pub cardio: Option<bool>,
}

impl PatientUpdate {
    /// Apply the set fields to `record`.
    pub fn apply_to(&self, record: &mut PatientRecord) {
        if let Some(v) = self.age {
            record.age = v;
        }
        if let Some(v) = self.gender {
            record.gender = v;
        }
        if let Some(v) = self.height {
            record.height = v;
        }
        if let Some(v) = self.weight {
            record.weight = v;
        }
        if let Some(v) = self.ap_hi {
            record.ap_hi = v;
        }
        if let Some(v) = self.ap_lo {
            record.ap_lo = v;
        }
        if let Some(v) = self.cholesterol {
            record.cholesterol = v;
        }
        if let Some(v) = self.gluc {
            record.gluc = v;
        }
        if let Some(v) = self.smoke {
            record.smoke = v;
        }
        if let Some(v) = self.alco {
            record.alco = v;
        }
        if let Some(v) = self.active {
            record.active = v;
        }
        if let Some(v) = self.cardio {
            record.cardio = v;
        }
    }
}

/// Trait for patient record storage.
pub trait PatientStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every stored record (the training set).
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn fetch_all_records(&self) -> Result<Vec<PatientRecord>, Self::Error>;

    /// Load one record.
    ///
    /// # Returns
    /// `None` if no record has this id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn fetch_record(&self, id: i64) -> Result<Option<PatientRecord>, Self::Error>;

    /// Insert a record and return its new id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn insert_record(&self, record: &PatientRecord) -> Result<i64, Self::Error>;

    /// Apply a partial update.
    ///
    /// # Returns
    /// The updated record, or `None` if no record has this id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn update_record(
        &self,
        id: i64,
        update: &PatientUpdate,
    ) -> Result<Option<PatientRecord>, Self::Error>;

    /// Load records with pagination.
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `per_page` - Maximum number of items to return
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_page(&self, page: usize, per_page: usize) -> Result<RecordPage, Self::Error>;

    /// Get the total count of records.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_records(&self) -> Result<usize, Self::Error>;
}
