//! Static narratives standing in for the named third-party data sources.
//!
//! The original product never scraped these services; it fed the model a
//! fixed per-river summary line for each source and let the prompt do the
//! rest. The narratives are kept as data so the prompt builder can embed
//! them per candidate waterway.

use orpaille_core::models::WaterwayCandidate;

/// Per-source narrative text embedded into the search prompt.
#[derive(Debug, Clone, Default)]
pub struct SourceNarratives {
    pub brgm: String,
    pub mineral_info: String,
    pub guppy_or: String,
    pub geoforum: String,
    pub detecteurs: String,
}

/// Build the narrative block for one river.
pub fn gold_sources_for(river_name: &str) -> SourceNarratives {
    SourceNarratives {
        brgm: format!("Données géologiques de {} depuis InfoTerre (BRGM)", river_name),
        mineral_info: format!(
            "Données des gisements proches de {} depuis MineralInfo",
            river_name
        ),
        guppy_or: format!(
            "Témoignages et spots d'orpaillage sur {} depuis GuppyOr",
            river_name
        ),
        geoforum: format!(
            "Discussions sur l'orpaillage dans {} depuis Géoforum",
            river_name
        ),
        detecteurs: format!(
            "Informations sur {} depuis la carte des rivières aurifères",
            river_name
        ),
    }
}

/// Concatenate the narratives of every candidate waterway, one line per
/// river and source.
pub fn combined_sources(waterways: &[WaterwayCandidate]) -> SourceNarratives {
    let mut combined = SourceNarratives::default();
    for waterway in waterways {
        let sources = gold_sources_for(&waterway.name);
        push_line(&mut combined.brgm, &sources.brgm);
        push_line(&mut combined.mineral_info, &sources.mineral_info);
        push_line(&mut combined.guppy_or, &sources.guppy_or);
        push_line(&mut combined.geoforum, &sources.geoforum);
        push_line(&mut combined.detecteurs, &sources.detecteurs);
    }
    combined
}

fn push_line(acc: &mut String, line: &str) {
    if !acc.is_empty() {
        acc.push('\n');
    }
    acc.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use orpaille_core::models::Coordinates;

    fn candidate(name: &str) -> WaterwayCandidate {
        WaterwayCandidate {
            name: name.to_string(),
            kind: "river".to_string(),
            coordinates: Coordinates::new(42.0, 2.0),
        }
    }

    #[test]
    fn test_sources_mention_the_river() {
        let sources = gold_sources_for("Caudies");
        assert!(sources.brgm.contains("Caudies"));
        assert!(sources.guppy_or.contains("GuppyOr"));
    }

    #[test]
    fn test_combined_sources_joins_per_river_lines() {
        let combined = combined_sources(&[candidate("Caudies"), candidate("Verdouble")]);
        let lines: Vec<&str> = combined.brgm.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Caudies"));
        assert!(lines[1].contains("Verdouble"));
    }

    #[test]
    fn test_combined_sources_empty_for_no_waterways() {
        let combined = combined_sources(&[]);
        assert!(combined.brgm.is_empty());
        assert!(combined.detecteurs.is_empty());
    }
}
