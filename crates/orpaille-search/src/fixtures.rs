//! Pre-seeded gold locations for known cities.
//!
//! A search whose normalized location matches this table returns the
//! entries verbatim, bypassing geocoding, the remote model, and the
//! cache. This is the deterministic demo/testing path.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use orpaille_core::models::{Coordinates, GoldLocation, RatingDetails};

/// Known-river table keyed by lowercased city name.
static KNOWN_RIVERS: Lazy<HashMap<&'static str, Vec<GoldLocation>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("carcassonne", carcassonne_rivers());
    table
});

/// Look up the fixture entries for a normalized city name.
pub fn known_rivers_for(city: &str) -> Option<Vec<GoldLocation>> {
    KNOWN_RIVERS.get(city.to_lowercase().as_str()).cloned()
}

fn carcassonne_rivers() -> Vec<GoldLocation> {
    vec![
        GoldLocation {
            river: "L'Aude".to_string(),
            kind: "rivière".to_string(),
            coordinates: Coordinates::new(43.2130, 2.3491),
            description: "L'Aude est la rivière principale traversant Carcassonne. Elle prend \
                          sa source dans les Pyrénées et a une histoire d'orpaillage."
                .to_string(),
            geology: "Alluvions quaternaires, zones de dépôts favorables à l'accumulation d'or"
                .to_string(),
            distance: "0 km".to_string(),
            rating: 4,
            rating_details: RatingDetails {
                forum_mentions: vec!["GuppyOr - Orpaillage dans l'Aude".to_string()],
                historical_data: "Activité historique d'orpaillage documentée".to_string(),
                geological_score: 4,
                accessibility: 5,
            },
            hotspots: vec![],
            prospection_spots: vec![],
            is_main_spot: true,
        },
        GoldLocation {
            river: "L'Orbiel".to_string(),
            kind: "rivière".to_string(),
            coordinates: Coordinates::new(43.3119, 2.2275),
            description: "L'Orbiel est un affluent de l'Aude connu pour ses anciennes mines \
                          d'or, notamment dans le secteur de Salsigne."
                .to_string(),
            geology: "Zone minéralisée, présence historique de mines d'or".to_string(),
            distance: "15 km".to_string(),
            rating: 5,
            rating_details: RatingDetails {
                forum_mentions: vec![
                    "GuppyOr - Mines de Salsigne".to_string(),
                    "FFOR - L'Orbiel".to_string(),
                ],
                historical_data: "Anciennes mines d'or de Salsigne".to_string(),
                geological_score: 5,
                accessibility: 4,
            },
            hotspots: vec![],
            prospection_spots: vec![],
            is_main_spot: true,
        },
        GoldLocation {
            river: "Le Fresquel".to_string(),
            kind: "rivière".to_string(),
            coordinates: Coordinates::new(43.2275, 2.2647),
            description: "Le Fresquel est un affluent de l'Aude qui traverse une zone \
                          géologique intéressante."
                .to_string(),
            geology: "Alluvions quaternaires, zones de confluence favorables".to_string(),
            distance: "8 km".to_string(),
            rating: 3,
            rating_details: RatingDetails {
                forum_mentions: vec!["GuppyOr - Affluents de l'Aude".to_string()],
                historical_data: "Quelques mentions historiques d'orpaillage".to_string(),
                geological_score: 3,
                accessibility: 4,
            },
            hotspots: vec![],
            prospection_spots: vec![],
            is_main_spot: true,
        },
    ]
}
