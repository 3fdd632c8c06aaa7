//! Integration tests for the chat and analysis flows with the mock
//! backend.

use std::sync::Arc;

use orpaille_assistant::{
    analyze_geology, analyze_image, analyze_river, analyze_rocks, combine_analysis,
    trace_gold_line, Assistant, Conversation, ImageAttachment, RiverPointKind, APOLOGY,
    IMAGE_ANALYSIS_FALLBACK,
};
use orpaille_core::models::{MessageRole, Sender};
use orpaille_core::Error;
use orpaille_inference::MockBackend;

fn assistant(model: &MockBackend, vision: &MockBackend) -> Assistant {
    Assistant::new(Arc::new(model.clone()), Arc::new(vision.clone()))
}

fn jpeg() -> ImageAttachment {
    ImageAttachment::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
}

#[tokio::test]
async fn test_turn_appends_user_and_assistant_messages() {
    let model = MockBackend::new().with_fixed_response("Salut poto ! 🪙");
    let vision = MockBackend::new();
    let assistant = assistant(&model, &vision);

    let mut conversation = Conversation::new();
    let reply = assistant
        .take_turn(&mut conversation, "Comment régler mon sluice ?", None)
        .await;

    assert_eq!(reply, "Salut poto ! 🪙");
    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.messages()[0].sender, Sender::User);
    assert_eq!(conversation.messages()[1].sender, Sender::Assistant);
    assert_eq!(conversation.messages()[1].content, "Salut poto ! 🪙");
}

#[tokio::test]
async fn test_persona_prefixes_the_transcript() {
    let model = MockBackend::new();
    let vision = MockBackend::new();
    let assistant = assistant(&model, &vision);

    let mut conversation = Conversation::new();
    assistant.take_turn(&mut conversation, "hello", None).await;

    let requests = model.chat_requests();
    assert_eq!(requests.len(), 1);
    let first = &requests[0].messages[0];
    assert_eq!(first.role, MessageRole::System);
    assert!(first.content.contains("Goldman IA"));
    assert!(first.content.contains("NE JAMAIS parler de réglementation"));
}

#[tokio::test]
async fn test_chat_sampling_parameters() {
    let model = MockBackend::new();
    let vision = MockBackend::new();
    let assistant = assistant(&model, &vision);

    let mut conversation = Conversation::new();
    assistant.take_turn(&mut conversation, "hello", None).await;

    let request = &model.chat_requests()[0];
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.max_tokens, Some(1000));
    assert_eq!(request.presence_penalty, Some(0.6));
    assert_eq!(request.frequency_penalty, Some(0.3));
}

#[tokio::test]
async fn test_failed_turn_appends_apology_and_keeps_growing() {
    let model = MockBackend::new().with_failure();
    let vision = MockBackend::new();
    let assistant = assistant(&model, &vision);

    let mut conversation = Conversation::new();
    let reply = assistant.take_turn(&mut conversation, "hello", None).await;

    assert_eq!(reply, APOLOGY);
    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.messages()[1].content, APOLOGY);

    // The conversation is not poisoned: the next turn still works
    let model_ok = MockBackend::new().with_fixed_response("ça roule");
    let assistant_ok = Assistant::new(Arc::new(model_ok), Arc::new(vision.clone()));
    let reply = assistant_ok.take_turn(&mut conversation, "encore là ?", None).await;
    assert_eq!(reply, "ça roule");
    assert_eq!(conversation.messages().len(), 4);
}

#[tokio::test]
async fn test_image_turn_adds_analysis_note_before_the_chat_call() {
    let model = MockBackend::new().with_fixed_response("Beau spot !");
    let vision = MockBackend::new().with_fixed_response("Méandre avec banc de gravier");
    let assistant = assistant(&model, &vision);

    let mut conversation = Conversation::new();
    assistant
        .take_turn(&mut conversation, "Tu vois quoi ?", Some(jpeg()))
        .await;

    assert_eq!(vision.vision_call_count(), 1);

    let request = &model.chat_requests()[0];
    let note = request
        .messages
        .iter()
        .find(|m| m.content.starts_with("Analyse de l'image fournie"))
        .expect("analysis note missing");
    assert_eq!(note.role, MessageRole::Assistant);
    assert!(note.content.contains("Méandre avec banc de gravier"));

    // The user message keeps a reference to the attached image
    assert!(conversation.messages()[0].image_url.is_some());
}

#[tokio::test]
async fn test_vision_failure_degrades_to_generic_checklist() {
    let vision = MockBackend::new().with_failure();
    let analysis = analyze_image(&vision, &jpeg()).await;
    assert_eq!(analysis, IMAGE_ANALYSIS_FALLBACK);
    // The failed call still happened
    assert_eq!(vision.vision_call_count(), 1);
}

#[tokio::test]
async fn test_analyze_rocks_parses_and_clamps() {
    let vision = MockBackend::new().with_fixed_response(
        r#"{
            "rockTypes": [
                {"name": "Quartz", "description": "veine", "goldPotential": 1.7, "location": [0.2, 0.3]}
            ],
            "overallPotential": 0.6,
            "recommendations": ["Prospecter en aval"]
        }"#,
    );

    let analysis = analyze_rocks(&vision, &jpeg()).await.unwrap();
    assert_eq!(analysis.rock_types[0].name, "Quartz");
    // Out-of-range potential clamped into 0..1
    assert_eq!(analysis.rock_types[0].gold_potential, 1.0);
    assert_eq!(analysis.recommendations.len(), 1);
}

#[tokio::test]
async fn test_analyze_rocks_rejects_malformed_reply() {
    let vision = MockBackend::new().with_fixed_response("not json");
    let err = analyze_rocks(&vision, &jpeg()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidModelReply(_)));
}

#[tokio::test]
async fn test_analyze_geology_is_plain_text() {
    let model = MockBackend::new().with_fixed_response("Schistes et gneiss du Massif Central");
    let text = analyze_geology(&model, "Tuchan").await.unwrap();
    assert!(text.contains("Schistes"));
    assert!(model.calls()[0].input.contains("Tuchan"));
}

#[tokio::test]
async fn test_trace_gold_line_runs_both_steps() {
    let vision = MockBackend::new().with_fixed_response("le long de la berge intérieure");
    let generator = MockBackend::new();

    let result = trace_gold_line(&vision, &generator, &jpeg()).await.unwrap();
    assert_eq!(result.modified_image, "https://mock.example/generated.png");
    assert!((result.confidence - 0.9).abs() < 1e-9);
    assert_eq!(vision.vision_call_count(), 1);
    assert_eq!(generator.image_call_count(), 1);
    // The generation prompt embeds the traced description
    assert!(generator.calls()[0].input.contains("berge intérieure"));
}

#[tokio::test]
async fn test_analyze_river_returns_typed_points() {
    let vision = MockBackend::new().with_fixed_response(
        r#"{
            "description": "Section à fort potentiel",
            "points": [{"type": "meander", "coordinates": [0.4, 0.6],
                        "description": "virage serré avec banc de sable"}]
        }"#,
    );

    let analysis = analyze_river(&vision, &jpeg(), "Caudies").await.unwrap();
    assert_eq!(analysis.points.len(), 1);
    assert_eq!(analysis.points[0].kind, RiverPointKind::Meander);
    // The prompt names the river under analysis
    assert!(vision.calls()[0].input.contains("Caudies"));
}

#[tokio::test]
async fn test_combine_analysis_embeds_both_inputs() {
    let model = MockBackend::new().with_fixed_response("Potentiel élevé");
    let synthesis = combine_analysis(&model, "méandres visibles", "schistes aurifères")
        .await
        .unwrap();

    assert_eq!(synthesis, "Potentiel élevé");
    let input = &model.calls()[0].input;
    assert!(input.contains("méandres visibles"));
    assert!(input.contains("schistes aurifères"));
}

#[tokio::test]
async fn test_river_point_kind_covers_the_closed_set() {
    for (name, kind) in [
        ("meander", RiverPointKind::Meander),
        ("transverse_bar", RiverPointKind::TransverseBar),
        ("pothole", RiverPointKind::Pothole),
    ] {
        let parsed: RiverPointKind =
            serde_json::from_str(&format!("\"{}\"", name)).unwrap();
        assert_eq!(parsed, kind);
    }
}
