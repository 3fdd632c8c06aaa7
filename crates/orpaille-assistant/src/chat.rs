//! Conversational assistant flow.
//!
//! Each turn appends the user's message to the transcript, optionally
//! runs the attached image through the analysis flow, forwards the whole
//! transcript behind the fixed persona prompt, and appends the model's
//! reply. A failed turn appends the fixed apology instead; nothing is
//! ever retried and the transcript only grows.

use std::sync::Arc;

use tracing::warn;

use orpaille_core::defaults::{
    CHAT_FREQUENCY_PENALTY, CHAT_MAX_TOKENS, CHAT_PRESENCE_PENALTY, CHAT_TEMPERATURE,
};
use orpaille_core::models::{ChatMessage, ChatRequest, PromptMessage, Sender};
use orpaille_core::traits::{GenerationBackend, VisionBackend};
use orpaille_core::Result;

use crate::analysis::analyze_image;
use crate::image::ImageAttachment;

/// Fixed persona instruction prefixed to every chat request.
pub const PERSONA_PROMPT: &str = "Tu es Goldman IA, le poto expert en orpaillage et prospection aurifère, toujours là pour filer un coup de main aux chercheurs d'or en France ! 😎✨

Quand tu réponds, adopte un ton super amical, détendu, spontané, avec des expressions familières, des emojis, des petites blagues et des anecdotes. Utilise des phrases courtes et naturelles, comme entre potes. Ajoute des \"franchement\", \"t'inquiète\", \"c'est du lourd\", \"allez, go !\".

SOURCES DE DONNÉES :
- GuppyOr (http://pujol.chez-alice.fr/guppyor/)
- BRGM (http://infoterre.brgm.fr)
- Forum FFOR

DOMAINES D'EXPERTISE :
1. Techniques d'orpaillage : batée, sluice, détection, prospection
2. Géologie aurifère : formations favorables, pièges naturels à pépites, indices de minéralisation, lecture de cartes géologiques

RÉPONSES :
- Toujours précises, mais jamais barbantes
- Adaptées au niveau du pote en face
- Pleines de conseils pratiques et d'astuces de terrain

IMPORTANT : NE JAMAIS parler de réglementation, d'autorisations, de mairie ou de paperasse. On reste sur la technique et la géologie, point barre !

Si une image est partagée, repère les spots prometteurs, les indices qui font tilt, et recommande les techniques adaptées. Balance toujours ta réponse avec le smile et un max de bonne vibe ! 🚀";

/// Fixed apology appended when a turn fails.
pub const APOLOGY: &str =
    "Désolé, je n'ai pas pu générer une réponse. Réessaie dans un instant ! 🙏";

/// Append-only conversation transcript.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

/// The conversational assistant.
pub struct Assistant {
    model: Arc<dyn GenerationBackend>,
    vision: Arc<dyn VisionBackend>,
}

impl Assistant {
    pub fn new(model: Arc<dyn GenerationBackend>, vision: Arc<dyn VisionBackend>) -> Self {
        Self { model, vision }
    }

    /// Run one turn. Never fails: a failed model call appends the fixed
    /// apology. The attachment is consumed by the turn, so its payload is
    /// released whether the turn succeeds or not.
    pub async fn take_turn(
        &self,
        conversation: &mut Conversation,
        user_text: impl Into<String>,
        image: Option<ImageAttachment>,
    ) -> String {
        let mut message = ChatMessage::user(user_text);
        if let Some(ref attachment) = image {
            message.image_url = Some(attachment.as_data_url().to_string());
        }
        conversation.push(message);

        let reply = match self.respond(conversation.messages(), image).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "chat turn failed, appending apology");
                APOLOGY.to_string()
            }
        };

        conversation.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    async fn respond(
        &self,
        transcript: &[ChatMessage],
        image: Option<ImageAttachment>,
    ) -> Result<String> {
        let mut messages = vec![PromptMessage::system(PERSONA_PROMPT)];
        messages.extend(transcript.iter().map(|m| match m.sender {
            Sender::User => PromptMessage::user(m.content.clone()),
            Sender::Assistant => PromptMessage::assistant(m.content.clone()),
        }));

        if let Some(attachment) = image {
            // The analysis itself degrades internally; its summary rides
            // along as a synthetic assistant note.
            let analysis = analyze_image(self.vision.as_ref(), &attachment).await;
            messages.push(PromptMessage::assistant(format!(
                "Analyse de l'image fournie :\n{}",
                analysis
            )));
        }

        let mut request = ChatRequest::new(messages);
        request.temperature = Some(CHAT_TEMPERATURE);
        request.max_tokens = Some(CHAT_MAX_TOKENS);
        request.presence_penalty = Some(CHAT_PRESENCE_PENALTY);
        request.frequency_penalty = Some(CHAT_FREQUENCY_PENALTY);

        let reply = self.model.complete(request).await?;
        if reply.trim().is_empty() {
            return Ok(APOLOGY.to_string());
        }
        Ok(reply)
    }
}
