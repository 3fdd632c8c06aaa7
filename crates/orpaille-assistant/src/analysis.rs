//! Image, rock, river, and geological analysis flows.
//!
//! Each flow formats a prompt, sends it to the remote model, and
//! post-processes the text or JSON that comes back. JSON-returning flows
//! are schema-validated before any field is trusted, the same untrusted
//! producer stance as the search validator.

use serde::{Deserialize, Serialize};
use tracing::warn;

use orpaille_core::traits::{
    GenerationBackend, ImageGenerationBackend, VisionBackend, VisionRequest,
};
use orpaille_core::models::{ChatRequest, PromptMessage};
use orpaille_core::{Error, Result};

use crate::image::ImageAttachment;

/// Generic checklist returned when the image analysis itself fails.
pub const IMAGE_ANALYSIS_FALLBACK: &str = "Pour analyser un site d'orpaillage, recherchez les indices suivants :

1. Géologie favorable :
   - Affleurements rocheux avec veines de quartz
   - Zones de contact entre différentes formations
   - Signes d'altération hydrothermale

2. Morphologie du cours d'eau :
   - Méandres prononcés où l'or s'accumule
   - Zones de ralentissement naturel
   - Points de confluence avec des affluents

3. Indices physiques :
   - Bancs de gravier et sable noir
   - Marmites de géant dans le lit rocheux
   - Dépôts alluviaux anciens

4. Conseils pratiques :
   - Privilégiez les zones en aval des anciennes mines
   - Examinez les berges intérieures des méandres
   - Recherchez les points bas naturels du lit

N'hésitez pas à partager une nouvelle photo pour une analyse plus précise.";

const IMAGE_ANALYSIS_SYSTEM: &str = "Expert en géologie et prospection aurifère, spécialisé dans l'analyse de sites d'orpaillage.

ANALYSER EN DÉTAIL :
1. Géologie et minéralogie (formations rocheuses, indices de minéralisation, zones d'altération)
2. Morphologie du cours d'eau (méandres, zones de ralentissement, confluences, barres rocheuses)
3. Indices favorables (dépôts alluviaux, bancs de gravier, marmites de géant, affleurements)
4. Zones prometteuses (points d'accumulation naturels, secteurs historiques, accès)";

/// Describe the geology and morphology visible on a prospecting photo.
///
/// Never fails: a degraded analysis collapses to the fixed generic
/// checklist instead of an error.
pub async fn analyze_image(vision: &dyn VisionBackend, image: &ImageAttachment) -> String {
    let request = VisionRequest {
        system: IMAGE_ANALYSIS_SYSTEM.to_string(),
        prompt: "Analysez cette image pour identifier les caractéristiques géologiques et \
                 géomorphologiques favorables à la présence d'or. Concentrez-vous sur les \
                 formations naturelles et les indices visibles."
            .to_string(),
        image_url: image.as_data_url().to_string(),
        temperature: Some(0.7),
        max_tokens: Some(4096),
        json_reply: false,
    };

    match vision.describe_image(request).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => IMAGE_ANALYSIS_FALLBACK.to_string(),
        Err(e) => {
            warn!(error = %e, "image analysis degraded to generic checklist");
            IMAGE_ANALYSIS_FALLBACK.to_string()
        }
    }
}

// =============================================================================
// ROCK ANALYSIS
// =============================================================================

/// One identified rock type and its gold potential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 0 to 1.
    #[serde(default)]
    pub gold_potential: f64,
    /// Relative position on the image, `[x, y]` in 0..1.
    #[serde(default)]
    pub location: [f64; 2],
}

/// Result of the rock-identification flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockAnalysis {
    #[serde(default)]
    pub rock_types: Vec<RockType>,
    /// 0 to 1.
    #[serde(default)]
    pub overall_potential: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

const ROCK_ANALYSIS_SYSTEM: &str = r#"Expert géologue spécialisé dans l'identification des roches favorables à l'or.

TYPES DE ROCHES À IDENTIFIER :
1. ROCHES PRIMAIRES : quartz (veines hydrothermales), schistes aurifères, granite altéré, roches métamorphiques, conglomérats
2. INDICATEURS DE POTENTIEL : altérations hydrothermales, minéralisations visibles, structures géologiques favorables

Retournez l'analyse au format JSON :
{
  "rockTypes": [{"name": "...", "description": "...", "goldPotential": 0.0-1.0, "location": [x, y]}],
  "overallPotential": 0.0-1.0,
  "recommendations": ["..."]
}"#;

/// Identify rock types on a photo and rate their gold potential.
pub async fn analyze_rocks(
    vision: &dyn VisionBackend,
    image: &ImageAttachment,
) -> Result<RockAnalysis> {
    let request = VisionRequest {
        system: ROCK_ANALYSIS_SYSTEM.to_string(),
        prompt: "Analysez les roches présentes sur cette image et évaluez leur potentiel \
                 aurifère."
            .to_string(),
        image_url: image.as_data_url().to_string(),
        temperature: None,
        max_tokens: Some(1500),
        json_reply: true,
    };

    let raw = vision.describe_image(request).await?;
    let mut analysis: RockAnalysis = serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidModelReply(format!("rock analysis: {}", e)))?;

    analysis.overall_potential = analysis.overall_potential.clamp(0.0, 1.0);
    for rock in &mut analysis.rock_types {
        rock.gold_potential = rock.gold_potential.clamp(0.0, 1.0);
    }
    Ok(analysis)
}

// =============================================================================
// RIVER ANALYSIS
// =============================================================================

/// Kinds of gold-favorable formations identified on a river image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverPointKind {
    Meander,
    Bedrock,
    Confluence,
    Slowdown,
    Fault,
    TransverseBar,
    Pothole,
    Erosion,
    Paleochannel,
    Fracture,
}

/// One formation spotted on the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverPoint {
    #[serde(rename = "type")]
    pub kind: RiverPointKind,
    /// Relative position on the image, `[x, y]` in 0..1.
    pub coordinates: [f64; 2],
    #[serde(default)]
    pub description: String,
}

/// Result of the river-section analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverAnalysis {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points: Vec<RiverPoint>,
}

const RIVER_ANALYSIS_SYSTEM: &str = r#"Expert en orpaillage et géomorphologie fluviale, spécialisé dans l'analyse d'images satellites pour la prospection aurifère.

FORMATIONS FAVORABLES À L'OR :
- Barres rocheuses transversales (type: transverse_bar) : zones de ralentissement et d'accumulation
- Marmites de géant (type: pothole) : dépressions circulaires dans le lit rocheux
- Zones d'érosion (type: erosion) : transitions entre roche dure et tendre
- Paléochenaux (type: paleochannel) : anciens lits de rivière
- Réseaux de fractures (type: fracture) : zones de faiblesse géologique
- Méandres prononcés (type: meander) : virages serrés avec bancs de sable
- Affleurements rocheux (type: bedrock) : roche mère visible dans le lit
- Confluences (type: confluence) : jonctions de cours d'eau
- Ralentissements (type: slowdown), failles (type: fault)

Retournez votre analyse au format JSON :
{
  "description": "Description détaillée de la section de rivière et son potentiel aurifère",
  "points": [
    {"type": "un des types listés", "coordinates": [x, y], "description": "Pourquoi cette formation est favorable"}
  ]
}"#;

/// Analyze one river section for gold-favorable formations.
pub async fn analyze_river(
    vision: &dyn VisionBackend,
    image: &ImageAttachment,
    river_name: &str,
) -> Result<RiverAnalysis> {
    let request = VisionRequest {
        system: RIVER_ANALYSIS_SYSTEM.to_string(),
        prompt: format!(
            "Analysez cette section de la rivière {} en détail pour identifier les \
             formations géologiques et caractéristiques fluviales favorables à \
             l'accumulation d'or.",
            river_name
        ),
        image_url: image.as_data_url().to_string(),
        temperature: None,
        max_tokens: Some(1500),
        json_reply: true,
    };

    let raw = vision.describe_image(request).await?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidModelReply(format!("river analysis: {}", e)))
}

// =============================================================================
// GEOLOGICAL CONTEXT
// =============================================================================

/// Text-only geological assessment of a location.
pub async fn analyze_geology(model: &dyn GenerationBackend, location: &str) -> Result<String> {
    let mut request = ChatRequest::new(vec![
        PromptMessage::system(
            "Vous êtes un expert en géologie spécialisé dans l'identification des \
             formations aurifères. Vous avez une connaissance approfondie des données \
             du BRGM et d'InfoTerre.",
        ),
        PromptMessage::user(format!(
            "Analysez le contexte géologique de {} pour évaluer le potentiel aurifère :\n\n\
             1. Formations géologiques principales\n\
             2. Histoire géologique et tectonique\n\
             3. Minéralisations connues\n\
             4. Indices de présence d'or\n\
             5. Recommandations pour la prospection\n\n\
             Basez votre analyse sur les données géologiques du BRGM et d'InfoTerre.",
            location
        )),
    ]);
    request.max_tokens = Some(1000);

    model.complete(request).await
}

/// Synthesize an image analysis and a geological analysis into one
/// assessment.
pub async fn combine_analysis(
    model: &dyn GenerationBackend,
    image_analysis: &str,
    geological_analysis: &str,
) -> Result<String> {
    let mut request = ChatRequest::new(vec![
        PromptMessage::system(
            "Vous êtes un expert en prospection aurifère capable de synthétiser des \
             informations complexes.",
        ),
        PromptMessage::user(format!(
            "Combinez et synthétisez ces deux analyses pour fournir une évaluation \
             complète du potentiel aurifère :\n\n\
             ANALYSE D'IMAGE SATELLITE :\n{}\n\n\
             ANALYSE GÉOLOGIQUE :\n{}\n\n\
             Fournissez :\n\
             1. Une synthèse globale\n\
             2. Les zones les plus prometteuses\n\
             3. Des recommandations pratiques pour la prospection\n\
             4. Une estimation du potentiel aurifère (faible/moyen/élevé)",
            image_analysis, geological_analysis
        )),
    ]);
    request.max_tokens = Some(1000);

    model.complete(request).await
}

// =============================================================================
// GOLD LINE
// =============================================================================

/// Result of the gold-line tracing flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldLineAnalysis {
    pub description: String,
    /// URL of the generated image carrying the traced line.
    pub modified_image: String,
    /// 0 to 1.
    pub confidence: f64,
}

/// Two-step flow: describe where the gold line runs, then generate a copy
/// of the photo with the line drawn on it.
pub async fn trace_gold_line(
    vision: &dyn VisionBackend,
    generator: &dyn ImageGenerationBackend,
    image: &ImageAttachment,
) -> Result<GoldLineAnalysis> {
    let request = VisionRequest {
        system: "Expert en prospection aurifère, spécialisé dans l'identification de la \
                 \"gold line\" dans les rivières. Décrivez UNIQUEMENT où tracer la ligne \
                 d'or, en une seule phrase concise."
            .to_string(),
        prompt: "Où devrait passer la gold line sur cette photo ? Donnez une description \
                 précise et concise du tracé."
            .to_string(),
        image_url: image.as_data_url().to_string(),
        temperature: None,
        max_tokens: Some(100),
        json_reply: false,
    };
    let trace_description = vision.describe_image(request).await?;

    let generation_prompt = format!(
        "Recréez cette photo de rivière exactement comme elle est, avec les mêmes roches, \
         la même eau, les mêmes arbres et le même angle. Ajoutez une ligne jaune (couleur \
         #FFD700) qui suit ce tracé : {}. La ligne doit avoir une épaisseur de 5 pixels et \
         une légère lueur. IMPORTANT : L'image doit être une copie EXACTE de l'originale, \
         seule la ligne jaune doit être ajoutée.",
        trace_description
    );
    let modified_image = generator.generate_image(&generation_prompt).await?;

    Ok(GoldLineAnalysis {
        description: "Ligne d'or tracée selon le flux naturel de la rivière".to_string(),
        modified_image,
        confidence: 0.9,
    })
}
