//! Prompt composition for the search pipelines.
//!
//! The remote model is steered with a directive system prompt embedding
//! the gathered waterway candidates, the static source narratives, strict
//! anti-fabrication rules, and the exact JSON shape expected back. The
//! JSON contract is soft (enforced only by wording), which is why every
//! reply still goes through the validator.

use orpaille_core::models::{CityLocation, WaterwayCandidate};

use crate::sources::SourceNarratives;

/// One line per candidate waterway: name, kind, representative coordinate.
pub fn waterway_listing(waterways: &[WaterwayCandidate]) -> String {
    waterways
        .iter()
        .map(|w| {
            format!(
                "- {} ({}): coordonnées [{}, {}]",
                w.name, w.kind, w.coordinates.lat, w.coordinates.lon
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt for the main search pipeline.
pub fn search_system_prompt(
    sources: &SourceNarratives,
    city: &CityLocation,
    radius_km: f64,
) -> String {
    format!(
        r#"Tu es un expert en prospection aurifère, spécialisé dans l'identification des rivières et cours d'eau aurifères en France. Tu DOIS TOUJOURS répondre au format JSON valide.

ATTENTION - RÈGLES STRICTES :
- NE PAS INVENTER de cours d'eau qui n'existent pas
- NE PAS INVENTER de données historiques ou géologiques
- Si aucun cours d'eau aurifère n'est documenté dans la zone, retourner des listes vides
- TOUJOURS vérifier que les informations proviennent de sources fiables (GuppyOr, BRGM, FFOR)
- Les coordonnées DOIVENT être EXACTEMENT sur le lit du cours d'eau

SOURCES DE DONNÉES OFFICIELLES :

1. InfoTerre (BRGM) - https://infoterre.brgm.fr/
   Données actuelles : {brgm}

2. MineralInfo - https://www.mineralinfo.fr/
   Données actuelles : {mineral_info}

3. GuppyOr - http://pujol.chez-alice.fr/guppyor/
   Données actuelles : {guppy_or}

4. Géoforum - https://www.geoforum.fr/forum/39-orpaillage/
   Données actuelles : {geoforum}

5. Detecteurs.fr - https://www.detecteurs.fr/page/cours-eau-aurifere.html
   Données actuelles : {detecteurs}

IMPORTANT: Fournir UNIQUEMENT les cours d'eau VÉRIFIÉS ET DOCUMENTÉS dans un rayon de {radius_km}km autour de [{lat}, {lon}].
INCLURE les petits ruisseaux et torrents de montagne s'ils sont mentionnés sur GuppyOr.

Format requis:
{{
  "mainSpots": [{{
    "coordinates": [lat, lng],
    "description": "Description détaillée avec références GuppyOr et BRGM",
    "river": "Nom exact du cours d'eau",
    "type": "rivière/ruisseau/torrent",
    "distance": "Distance en km depuis la ville",
    "geology": "Description géologique détaillée (BRGM/InfoTerre)",
    "rating": 1-5,
    "ratingDetails": {{
      "forumMentions": ["URLs ou références GuppyOr/FFOR"],
      "historicalData": "Données historiques vérifiables",
      "geologicalScore": 1-5,
      "accessibility": 1-5
    }},
    "hotspots": [{{"name": "...", "coordinates": [lat, lng], "rationale": "...", "source": "..."}}],
    "prospectionSpots": [{{"name": "...", "coordinates": [lat, lng], "priority": 1, "geologicalFeatures": ["..."]}}]
  }}],
  "secondarySpots": [ même format ],
  "hasMoreResults": true/false
}}"#,
        brgm = sources.brgm,
        mineral_info = sources.mineral_info,
        guppy_or = sources.guppy_or,
        geoforum = sources.geoforum,
        detecteurs = sources.detecteurs,
        radius_km = radius_km,
        lat = city.lat,
        lon = city.lon,
    )
}

/// User prompt for the main search pipeline.
pub fn search_user_prompt(
    location: &str,
    city: &CityLocation,
    radius_km: f64,
    waterways: &[WaterwayCandidate],
    include_main: bool,
    include_secondary: bool,
) -> String {
    let tiers = match (include_main, include_secondary) {
        (true, false) => "UNIQUEMENT les spots principaux (mainSpots)",
        (false, true) => "UNIQUEMENT les spots secondaires (secondarySpots)",
        _ => "les spots principaux (mainSpots) et les spots secondaires (secondarySpots)",
    };

    format!(
        r#"Recherchez les cours d'eau aurifères autour de {location} [{lat}, {lon}] dans un rayon de {radius_km}km.

RIVIÈRES IDENTIFIÉES DANS LA ZONE :
{river_info}

INSTRUCTIONS SPÉCIFIQUES :
1. Utilisez UNIQUEMENT les rivières listées ci-dessus
2. Retournez {tiers}
3. Pour chaque rivière potentiellement aurifère :
   - Vérifiez les données BRGM/InfoTerre pour la géologie
   - Recherchez les mentions sur GuppyOr et FFOR
   - Concentrez-vous sur les zones de confluence et méandres
4. Placez les points EXACTEMENT sur les rivières mentionnées
5. Fournissez des références précises aux sources"#,
        location = location,
        lat = city.lat,
        lon = city.lon,
        radius_km = radius_km,
        river_info = waterway_listing(waterways),
        tiers = tiers,
    )
}

/// System prompt for the unexplored-spots pipeline: undocumented but
/// geologically plausible waterways, returned as a bare JSON array.
pub fn unexplored_system_prompt(city: &CityLocation, radius_km: f64) -> String {
    format!(
        r#"Tu es un expert en prospection aurifère et en géologie. Tu DOIS TOUJOURS répondre au format JSON valide.

Identifie des cours d'eau PEU DOCUMENTÉS mais géologiquement prometteurs dans un rayon de {radius_km}km autour de [{lat}, {lon}].

RÈGLES STRICTES :
- NE PAS INVENTER de cours d'eau qui n'existent pas
- Baser chaque proposition sur le contexte géologique (BRGM/InfoTerre)
- Si rien de plausible n'existe, retourner un tableau vide []

Format requis:
[{{
  "coordinates": [lat, lng],
  "description": "Pourquoi ce cours d'eau est prometteur malgré l'absence de documentation",
  "river": "Nom exact du cours d'eau",
  "type": "rivière/ruisseau/torrent",
  "distance": "Distance en km depuis la ville",
  "geology": "Contexte géologique (BRGM/InfoTerre)",
  "rating": 1-5,
  "ratingDetails": {{
    "forumMentions": [],
    "historicalData": "Aucune donnée historique",
    "geologicalScore": 1-5,
    "accessibility": 1-5
  }}
}}]"#,
        radius_km = radius_km,
        lat = city.lat,
        lon = city.lon,
    )
}

/// User prompt for the unexplored-spots pipeline.
pub fn unexplored_user_prompt(
    location: &str,
    radius_km: f64,
    waterways: &[WaterwayCandidate],
) -> String {
    format!(
        r#"Recherchez des cours d'eau aurifères encore non documentés autour de {location} dans un rayon de {radius_km}km.

RIVIÈRES IDENTIFIÉES DANS LA ZONE :
{river_info}

Utilisez UNIQUEMENT les rivières listées ci-dessus et concentrez-vous sur celles qu'aucune source connue ne mentionne."#,
        location = location,
        radius_km = radius_km,
        river_info = waterway_listing(waterways),
    )
}
