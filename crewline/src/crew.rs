//! The built-in three-stage brand treatment crew.
//!
//! A fixed linear crew that turns a live read of audience friction into a
//! production-ready cinematic treatment: an anthropologist drafts the
//! brief, a visual director scripts the treatment, and a voice editor
//! polishes the final prose.

use crate::completion::CompletionClient;
use crate::errors::PipelineError;
use crate::lookup::InsightLookup;
use crate::persona::Persona;
use crate::pipeline::{PipelineBuilder, SequentialPipeline};
use crate::stage::StageSpec;
use std::sync::Arc;

/// Fixed filename for the exported treatment.
pub const EXPORT_FILENAME: &str = "brand_treatment.txt";

/// Fallback grounding used when live search is unavailable.
pub const LOOKUP_FALLBACK: &str =
    "Focusing on skin-first, climate-aware beauty logic for the modern buyer.";

/// The strategist persona that opens the pipeline.
#[must_use]
pub fn anthropologist() -> Persona {
    Persona::new(
        "Lead Brand Anthropologist",
        "Identify where beauty buyers feel overwhelmed by overconsumption and trend churn.",
        "You study the daily routines of working women in hot, humid cities to find \
         where makeup feels performative rather than useful. You distrust trend-chaos, \
         advocate calm confidence and enough-is-enough logic, and insist that products \
         suit real undertones and real climates.",
    )
}

/// The director persona that scripts the treatment.
#[must_use]
pub fn director() -> Persona {
    Persona::new(
        "Quiet Luxury Visual Architect",
        "Design technical visual treatments that feel like a reflective pause.",
        "Your visual language favors tactile surfaces (stone, skin, fabric) and soft \
         muted neutrals (dusty rose, stone grey). You work in close framing and \
         skin-like textures, and you choose sense over spectacle and intention over \
         urgency.",
    )
}

/// The editor persona that closes the pipeline.
#[must_use]
pub fn editor() -> Persona {
    Persona::new(
        "Senior Brand Voice Editor",
        "Craft grounded, assured prose that values clarity and trust over aggressive persuasion.",
        "You are the thinking buyer's guide. You never shout and never lean on fear of \
         missing out. Your register is calm, intelligent, and grounded; you explain why \
         a product exists and how it fits a real, busy life.",
    )
}

const BRIEF_INSTRUCTION: &str =
    "Analyze current beauty friction. Identify one area where loud, trend-driven \
     marketing is failing buyers. Propose a calmer alternative built on muted \
     neutrals (mauve, stone, rose) and skin-first practicality.";

const SCRIPT_INSTRUCTION: &str =
    "Draft a 15-second cinematic script that feels like a pause.\n\
     - [0-4s] THE OBSERVATION: a calm realization about daily life.\n\
     - [4-11s] THE TACTILE ACT: sensory, slow-motion application of product on real skin.\n\
     - [11-15s] THE CLARITY: an assured, grounded concluding thought.\n\
     Visuals: soft neutrals, natural light, stone and linen textures, close framing.";

const POLISH_INSTRUCTION: &str =
    "Refine the script. Remove any salesy or hype language (viral, must-have, \
     obsessed) and replace it with poetic, assured, intelligent prose. Format the \
     result as a professional Markdown director's treatment.";

/// Grounding queries the anthropologist runs before drafting the brief.
#[must_use]
pub fn grounding_queries() -> Vec<String> {
    vec![
        "everyday beauty friction makeup overwhelm".to_string(),
        "climate-aware makeup needs humid weather".to_string(),
    ]
}

/// Builds the fixed three-stage treatment pipeline, lookup wired to the
/// opening stage only.
#[must_use]
pub fn treatment_builder(lookup: Arc<dyn InsightLookup>) -> PipelineBuilder {
    PipelineBuilder::new("brand-treatment")
        .stage(
            StageSpec::new(
                anthropologist(),
                BRIEF_INSTRUCTION,
                "An intentional brand brief focusing on practicality and emotional ease.",
            )
            .with_lookup(lookup, grounding_queries()),
        )
        .stage(StageSpec::new(
            director(),
            SCRIPT_INSTRUCTION,
            "A three-table technical production guide: script, camera, and lighting.",
        ))
        .stage(StageSpec::new(
            editor(),
            POLISH_INSTRUCTION,
            "A production-ready aesthetic guide in Markdown.",
        ))
}

/// Assembles the built-in crew against a completion client.
pub fn treatment_crew(
    client: Arc<dyn CompletionClient>,
    lookup: Arc<dyn InsightLookup>,
) -> Result<SequentialPipeline, PipelineError> {
    treatment_builder(lookup).build(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingLookup, ScriptedCompletionClient};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_crew_has_three_stages_in_fixed_order() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let lookup = Arc::new(CountingLookup::new("snippet"));
        let pipeline = treatment_crew(client, lookup).unwrap();

        assert_eq!(pipeline.stage_count(), 3);
        assert_eq!(
            pipeline.roles(),
            vec![
                "Lead Brand Anthropologist",
                "Quiet Luxury Visual Architect",
                "Senior Brand Voice Editor",
            ]
        );
    }

    #[tokio::test]
    async fn test_only_opening_stage_uses_lookup() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .then_ok("brief")
                .then_ok("script")
                .then_ok("treatment"),
        );
        let lookup = Arc::new(CountingLookup::new("snippet"));
        let pipeline = treatment_crew(client.clone(), lookup.clone()).unwrap();

        pipeline.execute().await.unwrap();

        assert_eq!(lookup.call_count(), grounding_queries().len());
        let calls = client.calls();
        assert!(calls[0].instruction.contains("Field notes:"));
        assert!(!calls[1].instruction.contains("Field notes:"));
        assert!(!calls[2].instruction.contains("Field notes:"));
    }

    #[test]
    fn test_export_filename_is_fixed() {
        assert_eq!(EXPORT_FILENAME, "brand_treatment.txt");
    }
}
