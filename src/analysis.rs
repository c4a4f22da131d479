//! Crop analysis from image classifier output.
//!
//! The classifier itself runs elsewhere; what arrives here is its list of `(className,
//! probability)` predictions, best first. The first prediction that names something agricultural
//! is translated to Portuguese and paired with care recommendations. Analyses can be saved to the
//! `appAgro_analyses` slot on behalf of the current user.

use crate::session::CurrentUserProvider;
use crate::storage::{Storage, StorageError, ANALYSES};
use crate::utils::generate_id;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Agricultural terms a class name may contain and their Portuguese names. Translation applies them
/// in this order.
static TRANSLATIONS: [(&str, &str); 17] = [
    ("corn", "Milho"),
    ("maize", "Milho"),
    ("wheat", "Trigo"),
    ("rice", "Arroz"),
    ("soybean", "Soja"),
    ("coffee", "Café"),
    ("sugar cane", "Cana-de-açúcar"),
    ("cotton", "Algodão"),
    ("leaf", "Folha"),
    ("plant", "Planta"),
    ("soil", "Solo"),
    ("field", "Campo"),
    ("garden", "Jardim"),
    ("crop", "Cultura"),
    ("farm", "Fazenda"),
    ("grassland", "Pastagem"),
    ("agricultural", "Agrícola"),
];

static COMMON_RECOMMENDATIONS: [&str; 2] = [
    "Mantenha o monitoramento regular da umidade do solo.",
    "Verifique regularmente a presença de pragas e doenças.",
];

/// Crop-specific advice, matched against the lowercased class name. The first match wins.
static CROP_RECOMMENDATIONS: [(&[&str], [&str; 2]); 4] = [
    (
        &["corn", "maize"],
        [
            "Aplique fertilizante rico em nitrogênio para maximizar o desenvolvimento das espigas.",
            "Monitore a presença da lagarta-do-cartucho e aplique controle biológico se necessário.",
        ],
    ),
    (
        &["soybean", "soja"],
        [
            "Verifique a nodulação das raízes para garantir fixação adequada de nitrogênio.",
            "Monitore a ocorrência de ferrugem asiática, especialmente em períodos chuvosos.",
        ],
    ),
    (
        &["coffee", "café"],
        [
            "Mantenha o sombreamento adequado para as plantas jovens.",
            "Realize a poda de renovação após a colheita principal.",
        ],
    ),
    (
        &["rice", "arroz"],
        [
            "Monitore o nível de água na plantação para evitar estresse hídrico.",
            "Verifique a presença de brusone nas folhas e aplique fungicida preventivo.",
        ],
    ),
];

static GENERAL_RECOMMENDATIONS: [&str; 2] = [
    "Realize análises regulares do solo para garantir nutrientes adequados.",
    "Implemente rotação de culturas para reduzir pragas e doenças.",
];

/// One classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "className")]
    pub class_name: String,
    /// Between 0 and 1.
    pub probability: f64,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, probability: f64) -> Self {
        Self {
            class_name: class_name.into(),
            probability,
        }
    }

    /// True when the class name mentions one of the known agricultural terms.
    pub fn is_agricultural(&self) -> bool {
        let lower = self.class_name.to_lowercase();
        TRANSLATIONS.iter().any(|(term, _)| lower.contains(term))
    }
}

/// What an image was identified as, with advice for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub class_name: String,
    /// The class name with every known term translated.
    pub plant_type: String,
    pub probability: f64,
    /// `probability` as a rounded percentage.
    pub confidence_percent: u32,
    pub recommendations: Vec<String>,
}

/// Identifies the first agricultural prediction, or `None` if there is none.
pub fn identify(predictions: &[Prediction]) -> Option<Identification> {
    let main = predictions.iter().find(|p| p.is_agricultural())?;
    let percent = (main.probability * 100.0).round().clamp(0.0, 100.0) as u32;
    Some(Identification {
        class_name: main.class_name.clone(),
        plant_type: translate(&main.class_name),
        probability: main.probability,
        confidence_percent: percent,
        recommendations: recommendations(&main.class_name),
    })
}

/// Replaces every known term in `class_name`, ignoring case, with its Portuguese name.
pub fn translate(class_name: &str) -> String {
    TRANSLATIONS
        .iter()
        .fold(class_name.to_string(), |text, (term, name)| {
            replace_ignore_case(&text, term, name)
        })
}

/// Crop-specific recommendations followed by the ones that apply to every crop.
pub fn recommendations(class_name: &str) -> Vec<String> {
    let lower = class_name.to_lowercase();
    let specific = CROP_RECOMMENDATIONS
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| lower.contains(t)))
        .map(|(_, advice)| advice)
        .unwrap_or(&GENERAL_RECOMMENDATIONS);
    specific
        .iter()
        .chain(COMMON_RECOMMENDATIONS.iter())
        .map(|s| s.to_string())
        .collect()
}

/// `term` must be lowercase ASCII. ASCII lowercasing keeps byte offsets, so matches found in the
/// lowercased copy index the original.
fn replace_ignore_case(text: &str, term: &str, with: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in lower.match_indices(term) {
        out.push_str(&text[last..start]);
        out.push_str(with);
        last = start + term.len();
    }
    out.push_str(&text[last..]);
    out
}

/// A saved analysis, as stored in the analyses slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub date: String,
    pub plant_type: String,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    /// A reference to the analyzed image, if one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("the saved analyses are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Saves analyses for whoever is signed in.
pub struct AnalysisStore {
    storage: Box<dyn Storage>,
    users: Box<dyn CurrentUserProvider + Send + Sync>,
}

impl AnalysisStore {
    pub fn new(
        storage: impl Storage + 'static,
        users: impl CurrentUserProvider + Send + Sync + 'static,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            users: Box::new(users),
        }
    }

    /// Every saved analysis, oldest first.
    pub async fn saved(&self) -> Result<Vec<Analysis>, AnalysisError> {
        match self.storage.get(ANALYSES).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Appends `identification` to the saved analyses. Existing analyses that cannot be read are
    /// an error and are left untouched.
    pub async fn save(
        &self,
        identification: &Identification,
        image_data: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Analysis, AnalysisError> {
        let mut analyses = self.saved().await?;
        let analysis = Analysis {
            id: generate_id(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            plant_type: identification.plant_type.clone(),
            confidence: identification.probability,
            recommendations: identification.recommendations.clone(),
            image_data,
            user_id: self.users.current_user_id(),
        };
        analyses.push(analysis.clone());
        self.storage
            .set(ANALYSES, &serde_json::to_string(&analyses)?)
            .await?;
        debug!("Saved analysis {} of {}", analysis.id, analysis.plant_type);
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Guest, SignedIn};
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;

    #[test]
    fn test_identify_skips_non_agricultural() {
        let predictions = vec![
            Prediction::new("golden retriever", 0.61),
            Prediction::new("ear, corn", 0.287),
            Prediction::new("hay field", 0.05),
        ];
        let id = identify(&predictions).unwrap();
        assert_eq!(id.class_name, "ear, corn");
        assert_eq!(id.plant_type, "ear, Milho");
        assert_eq!(id.confidence_percent, 29);
        assert!(id.recommendations[0].contains("nitrogênio"));
    }

    #[test]
    fn test_identify_nothing_agricultural() {
        let predictions = vec![
            Prediction::new("golden retriever", 0.9),
            Prediction::new("tabby cat", 0.1),
        ];
        assert_eq!(identify(&predictions), None);
        assert_eq!(identify(&[]), None);
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate("Maize"), "Milho");
        assert_eq!(translate("sugar cane field"), "Cana-de-açúcar Campo");
        assert_eq!(translate("COFFEE plant"), "Café Planta");
        assert_eq!(translate("tractor"), "tractor");
    }

    #[test]
    fn test_recommendations() {
        let common = COMMON_RECOMMENDATIONS.map(String::from);

        let soy = recommendations("Soybean leaf");
        assert_eq!(soy.len(), 4);
        assert!(soy[0].contains("nodulação"));
        assert_eq!(soy[2..], common);

        assert!(recommendations("rice paddy")[0].contains("nível de água"));
        assert!(recommendations("coffee")[0].contains("sombreamento"));

        let general = recommendations("wheat field");
        assert_eq!(general[..2], GENERAL_RECOMMENDATIONS.map(String::from));
        assert_eq!(general[2..], common);
    }

    #[tokio::test]
    async fn test_save_appends_with_owner() {
        let storage = MemoryStorage::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let corn = identify(&[Prediction::new("corn", 0.8)]).unwrap();
        let rice = identify(&[Prediction::new("rice", 0.5)]).unwrap();

        AnalysisStore::new(storage.clone(), Guest)
            .save(&corn, None, now)
            .await
            .unwrap();
        let store = AnalysisStore::new(storage.clone(), SignedIn::new("42"));
        let saved = store
            .save(&rice, Some("photo.jpg".to_string()), now)
            .await
            .unwrap();
        assert_eq!(saved.user_id, "42");
        assert_eq!(saved.date, "2024-03-01T12:00:00.000Z");

        let all = store.saved().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].plant_type, "Milho");
        assert_eq!(all[0].user_id, "guest");
        assert_eq!(all[0].image_data, None);
        assert_eq!(all[1].plant_type, "Arroz");
        assert_eq!(all[1].confidence, 0.5);

        let raw = storage.get(ANALYSES).await.unwrap().unwrap();
        assert!(raw.contains("\"plantType\":\"Milho\""));
        assert!(raw.contains("\"userId\":\"42\""));
        assert!(raw.contains("\"imageData\":\"photo.jpg\""));
    }

    #[tokio::test]
    async fn test_save_keeps_malformed_slot() {
        let storage = MemoryStorage::new();
        storage.set(ANALYSES, "{oops").await.unwrap();
        let corn = identify(&[Prediction::new("corn", 0.8)]).unwrap();
        let err = AnalysisStore::new(storage.clone(), Guest)
            .save(&corn, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(_)));
        assert_eq!(storage.get(ANALYSES).await.unwrap().as_deref(), Some("{oops"));
    }
}
