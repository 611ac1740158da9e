//! System prompt and history assembly for the dialogue

use retiro_contacts::Contact;
use retiro_conversations::{ConversationContext, Message, MessageDirection};
use retiro_llm::ChatMessage;

/// Static domain knowledge and conversation script for the sales agent
const BUSINESS_SCRIPT: &str = "\
Eres Alma, la asesora virtual de Casa Retiro, un centro de retiros y eventos \
espirituales. Atiendes por WhatsApp en español, con calidez y mensajes breves.

Servicios que ofrecemos:
- Boda espiritual (ceremonia al atardecer, hasta 40 invitados)
- Retiro de yoga (fin de semana, incluye hospedaje y alimentos)
- Temazcal (ceremonia grupal, sábados)
- Cena ceremonial (luna llena, cupo limitado)

Reglas:
1. Usa analyzeCustomerIntent cuando el mensaje revele interés, datos del \
cliente o necesidad de un asesor humano.
2. Cuando el cliente pida reservar y dé servicio y fecha, usa createBooking. \
Si falta la fecha o el servicio, pídelos antes de reservar.
3. Para cambios o cancelaciones usa getContactBookings y updateBookingStatus.
4. Nunca inventes precios ni fechas disponibles; ofrece que un asesor confirme \
los detalles.
5. Responde siempre con un solo mensaje corto, sin listas largas.";

/// Build the system instruction for one pipeline run, embedding the
/// contact's current CRM state and the conversation context.
pub fn build_system_prompt(contact: &Contact, context: &ConversationContext) -> String {
    let mut prompt = String::from(BUSINESS_SCRIPT);

    prompt.push_str("\n\nCliente actual:\n");
    prompt.push_str(&format!("- contactId: {}\n", contact.id));
    prompt.push_str(&format!("- nombre: {}\n", contact.name));
    prompt.push_str(&format!("- etapa: {}\n", contact.status));
    prompt.push_str(&format!("- puntaje: {}\n", contact.lead_score));
    if !contact.interested_in.is_empty() {
        prompt.push_str(&format!(
            "- intereses: {}\n",
            contact.interested_in.join(", ")
        ));
    }
    if let Some(intent) = context.last_intent {
        prompt.push_str(&format!("- última intención: {}\n", intent));
    }
    if context.needs_human_agent {
        prompt.push_str("- el cliente pidió hablar con una persona; discúlpate y confirma que un asesor le escribirá\n");
    }

    prompt
}

/// Map the persisted dialogue history to role-tagged model messages.
///
/// Inbound messages speak as the user, outbound as the assistant. The new
/// inbound message is already persisted, so it arrives as the last entry.
pub fn history_messages(history: &[Message]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|m| match m.direction {
            MessageDirection::Inbound => ChatMessage::user(m.content.clone()),
            MessageDirection::Outbound => ChatMessage::assistant(m.content.clone()),
        })
        .collect()
}
