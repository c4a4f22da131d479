use crate::analysis::{identify, AnalysisStore, Identification, Prediction};
use crate::args::AnalyzeArgs;
use crate::commands::Out;
use crate::session::SessionUser;
use crate::{Config, Result};
use anyhow::Context;
use chrono::Utc;
use std::fmt::Write;

/// Identifies the crop in classifier predictions and lists recommendations for it. With
/// `--save`, an identified crop is also saved for the signed-in user.
///
/// # Errors
/// - Returns an error if the predictions are not valid JSON or the analysis cannot be saved.
pub async fn analyze(config: Config, args: AnalyzeArgs) -> Result<Out<Option<Identification>>> {
    let predictions: Vec<Prediction> = serde_json::from_str(args.predictions())
        .context("Unable to read the predictions, expected [{\"className\", \"probability\"}]")?;
    let identification = match identify(&predictions) {
        Some(identification) => identification,
        None => {
            return Ok(Out::new(
                "No agricultural elements could be identified in this image. Try a clearer \
                photo of the crop.",
                None,
            ))
        }
    };

    let mut message = format!(
        "Identified {} with {}% confidence",
        identification.plant_type, identification.confidence_percent
    );
    for recommendation in &identification.recommendations {
        let _ = write!(message, "\n  - {recommendation}");
    }

    if args.save() {
        let storage = config.storage();
        let user = SessionUser::load(&storage).await;
        let image = args.image().map(|p| p.display().to_string());
        let saved = AnalysisStore::new(storage, user)
            .save(&identification, image, Utc::now())
            .await
            .context("Unable to save the analysis")?;
        let _ = write!(message, "\nAnalysis saved as {}", saved.id);
    }
    Ok(Out::new(message, Some(identification)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Guest;
    use crate::test::TestEnv;

    const PREDICTIONS: &str = r#"[
        {"className": "golden retriever", "probability": 0.7},
        {"className": "soybean", "probability": 0.2}
    ]"#;

    #[tokio::test]
    async fn test_analyze_without_saving() {
        let env = TestEnv::new().await;
        let out = analyze(env.config(), AnalyzeArgs::new(PREDICTIONS, false, None))
            .await
            .unwrap();
        let identification = out.structure().unwrap().as_ref().unwrap();
        assert_eq!(identification.plant_type, "Soja");
        assert!(out.message().starts_with("Identified Soja with 20% confidence"));
        let store = AnalysisStore::new(env.config().storage(), Guest);
        assert!(store.saved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_and_save() {
        let env = TestEnv::new().await;
        let out = analyze(
            env.config(),
            AnalyzeArgs::new(PREDICTIONS, true, Some("campo.jpg".into())),
        )
        .await
        .unwrap();
        assert!(out.message().contains("Analysis saved as"));
        let saved = AnalysisStore::new(env.config().storage(), Guest)
            .saved()
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].plant_type, "Soja");
        assert_eq!(saved[0].user_id, "guest");
        assert_eq!(saved[0].image_data.as_deref(), Some("campo.jpg"));
    }

    #[tokio::test]
    async fn test_analyze_nothing_found_or_bad_input() {
        let env = TestEnv::new().await;
        let out = analyze(
            env.config(),
            AnalyzeArgs::new(r#"[{"className": "tabby cat", "probability": 0.9}]"#, true, None),
        )
        .await
        .unwrap();
        assert!(out.structure().unwrap().is_none());
        assert!(out.message().starts_with("No agricultural elements"));

        assert!(analyze(env.config(), AnalyzeArgs::new("not json", false, None))
            .await
            .is_err());
    }
}
