//! The action registry: the fixed catalog of operations the model may invoke
//!
//! Each action is a typed variant with a serde argument struct; dispatch is a
//! static tagged union, so adding an action without a handler fails to
//! compile. `parse` validates model-supplied JSON against the declared
//! schemas before anything executes; a mismatch is an `InvalidArgument` the
//! follow-up pass can narrate, never a crash.

use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use retiro_bookings::BookingStatus;
use retiro_common::{Error, Result};
use retiro_contacts::ContactStatus;
use retiro_conversations::CustomerIntent;
use retiro_llm::ToolDefinition;

/// Contact details the model extracted from dialogue
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInfo {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Arguments for `analyzeCustomerIntent`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCustomerIntentArgs {
    pub contact_id: Uuid,
    pub intent: CustomerIntent,
    pub suggested_status: Option<ContactStatus>,
    pub lead_score: Option<i32>,
    #[serde(default)]
    pub interested_in: Vec<String>,
    #[serde(default)]
    pub needs_human_agent: bool,
    pub extracted_info: Option<ExtractedInfo>,
}

/// Arguments for `createBooking`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingArgs {
    pub contact_id: Uuid,
    pub service_name: String,
    pub date_time: String,
    pub notes: Option<String>,
}

/// Arguments for `updateBookingStatus`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusArgs {
    pub contact_id: Uuid,
    pub booking_id: Uuid,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

/// Arguments for `updateContactInfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactInfoArgs {
    pub contact_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub interested_in: Vec<String>,
    pub opted_in: Option<bool>,
}

/// Arguments for `getContactBookings`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetContactBookingsArgs {
    pub contact_id: Uuid,
    pub status: Option<BookingStatus>,
}

/// Arguments for `addContactNotes`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContactNotesArgs {
    pub contact_id: Uuid,
    pub notes: String,
}

/// A validated, typed action invocation
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    AnalyzeCustomerIntent(AnalyzeCustomerIntentArgs),
    CreateBooking(CreateBookingArgs),
    UpdateBookingStatus(UpdateBookingStatusArgs),
    UpdateContactInfo(UpdateContactInfoArgs),
    GetContactBookings(GetContactBookingsArgs),
    AddContactNotes(AddContactNotesArgs),
}

impl AgentAction {
    /// Parse a model-supplied tool invocation into a typed action.
    ///
    /// Unknown names and schema mismatches are `InvalidArgument`.
    pub fn parse(name: &str, arguments: &Value) -> Result<Self> {
        let action = match name {
            "analyzeCustomerIntent" => {
                let args: AnalyzeCustomerIntentArgs = from_value(name, arguments)?;
                if let Some(score) = args.lead_score {
                    if !(0..=100).contains(&score) {
                        return Err(Error::InvalidArgument(format!(
                            "leadScore must be in [0, 100], got {}",
                            score
                        )));
                    }
                }
                Self::AnalyzeCustomerIntent(args)
            }
            "createBooking" => Self::CreateBooking(from_value(name, arguments)?),
            "updateBookingStatus" => Self::UpdateBookingStatus(from_value(name, arguments)?),
            "updateContactInfo" => Self::UpdateContactInfo(from_value(name, arguments)?),
            "getContactBookings" => Self::GetContactBookings(from_value(name, arguments)?),
            "addContactNotes" => {
                let args: AddContactNotesArgs = from_value(name, arguments)?;
                if args.notes.trim().is_empty() {
                    return Err(Error::InvalidArgument(
                        "notes cannot be empty".to_string(),
                    ));
                }
                Self::AddContactNotes(args)
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "Unknown action: {}",
                    other
                )));
            }
        };

        Ok(action)
    }

    /// The wire name published to the model
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnalyzeCustomerIntent(_) => "analyzeCustomerIntent",
            Self::CreateBooking(_) => "createBooking",
            Self::UpdateBookingStatus(_) => "updateBookingStatus",
            Self::UpdateContactInfo(_) => "updateContactInfo",
            Self::GetContactBookings(_) => "getContactBookings",
            Self::AddContactNotes(_) => "addContactNotes",
        }
    }

    /// The full tool catalog sent with every first-pass model request
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "analyzeCustomerIntent".to_string(),
                description: "Registra la intención detectada del cliente y actualiza su \
                              calificación comercial. Úsala en cada mensaje que revele interés, \
                              datos personales o necesidad de atención humana."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "intent": {
                            "type": "string",
                            "enum": ["greeting", "inquiry", "booking_request", "booking_change",
                                     "pricing", "complaint", "farewell", "other"]
                        },
                        "suggestedStatus": {
                            "type": "string",
                            "enum": ["prospect", "lead", "opportunity", "customer",
                                     "inactive", "disqualified"]
                        },
                        "leadScore": {"type": "integer", "minimum": 0, "maximum": 100},
                        "interestedIn": {"type": "array", "items": {"type": "string"}},
                        "needsHumanAgent": {"type": "boolean"},
                        "extractedInfo": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "email": {"type": "string"}
                            }
                        }
                    },
                    "required": ["contactId", "intent"]
                }),
            },
            ToolDefinition {
                name: "createBooking".to_string(),
                description: "Crea una reserva pendiente para un servicio en una fecha. \
                              dateTime acepta fecha con hora (RFC 3339) o solo fecha \
                              (YYYY-MM-DD)."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "serviceName": {"type": "string"},
                        "dateTime": {"type": "string"},
                        "notes": {"type": "string"}
                    },
                    "required": ["contactId", "serviceName", "dateTime"]
                }),
            },
            ToolDefinition {
                name: "updateBookingStatus".to_string(),
                description: "Cambia el estado de una reserva existente del cliente."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "bookingId": {"type": "string", "format": "uuid"},
                        "status": {
                            "type": "string",
                            "enum": ["confirmed", "cancelled", "completed", "no_show"]
                        },
                        "notes": {"type": "string"}
                    },
                    "required": ["contactId", "bookingId", "status"]
                }),
            },
            ToolDefinition {
                name: "updateContactInfo".to_string(),
                description: "Actualiza datos del contacto (nombre, correo, intereses). \
                              Solo los campos enviados se modifican."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "name": {"type": "string"},
                        "email": {"type": "string"},
                        "interestedIn": {"type": "array", "items": {"type": "string"}},
                        "optedIn": {"type": "boolean"}
                    },
                    "required": ["contactId"]
                }),
            },
            ToolDefinition {
                name: "getContactBookings".to_string(),
                description: "Lista las reservas del cliente, ordenadas por fecha."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "status": {
                            "type": "string",
                            "enum": ["pending", "confirmed", "cancelled", "completed", "no_show"]
                        }
                    },
                    "required": ["contactId"]
                }),
            },
            ToolDefinition {
                name: "addContactNotes".to_string(),
                description: "Agrega una nota con fecha al historial del contacto."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "contactId": {"type": "string", "format": "uuid"},
                        "notes": {"type": "string"}
                    },
                    "required": ["contactId", "notes"]
                }),
            },
        ]
    }
}

fn from_value<T: serde::de::DeserializeOwned>(name: &str, arguments: &Value) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|e| {
        Error::InvalidArgument(format!("Invalid arguments for {}: {}", name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_customer_intent() {
        let contact_id = Uuid::new_v4();
        let args = json!({
            "contactId": contact_id,
            "intent": "booking_request",
            "suggestedStatus": "lead",
            "leadScore": 70,
            "interestedIn": ["boda espiritual"],
            "needsHumanAgent": false,
            "extractedInfo": {"name": "María"}
        });

        let action = AgentAction::parse("analyzeCustomerIntent", &args).unwrap();
        match action {
            AgentAction::AnalyzeCustomerIntent(args) => {
                assert_eq!(args.contact_id, contact_id);
                assert_eq!(args.intent, CustomerIntent::BookingRequest);
                assert_eq!(args.suggested_status, Some(ContactStatus::Lead));
                assert_eq!(args.lead_score, Some(70));
                assert_eq!(
                    args.extracted_info.unwrap().name.as_deref(),
                    Some("María")
                );
            }
            other => panic!("wrong action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_minimal_arguments() {
        let args = json!({
            "contactId": Uuid::new_v4(),
            "intent": "greeting"
        });
        let action = AgentAction::parse("analyzeCustomerIntent", &args).unwrap();
        match action {
            AgentAction::AnalyzeCustomerIntent(args) => {
                assert!(args.suggested_status.is_none());
                assert!(args.interested_in.is_empty());
                assert!(!args.needs_human_agent);
            }
            other => panic!("wrong action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_lead_score() {
        let args = json!({
            "contactId": Uuid::new_v4(),
            "intent": "inquiry",
            "leadScore": 150
        });
        let result = AgentAction::parse("analyzeCustomerIntent", &args);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_create_booking() {
        let contact_id = Uuid::new_v4();
        let args = json!({
            "contactId": contact_id,
            "serviceName": "Boda espiritual",
            "dateTime": "2025-07-26"
        });

        let action = AgentAction::parse("createBooking", &args).unwrap();
        assert_eq!(action.name(), "createBooking");
        match action {
            AgentAction::CreateBooking(args) => {
                assert_eq!(args.service_name, "Boda espiritual");
                assert_eq!(args.date_time, "2025-07-26");
                assert!(args.notes.is_none());
            }
            other => panic!("wrong action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_action_rejected() {
        let result = AgentAction::parse("deleteAllContacts", &json!({}));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_missing_required_field_rejected() {
        // createBooking without dateTime
        let args = json!({
            "contactId": Uuid::new_v4(),
            "serviceName": "Temazcal"
        });
        let result = AgentAction::parse("createBooking", &args);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_malformed_uuid_rejected() {
        let args = json!({
            "contactId": "not-a-uuid",
            "intent": "greeting"
        });
        let result = AgentAction::parse("analyzeCustomerIntent", &args);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_unknown_enum_value_rejected() {
        let args = json!({
            "contactId": Uuid::new_v4(),
            "bookingId": Uuid::new_v4(),
            "status": "rescheduled"
        });
        let result = AgentAction::parse("updateBookingStatus", &args);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_blank_notes_rejected() {
        let args = json!({
            "contactId": Uuid::new_v4(),
            "notes": "   "
        });
        let result = AgentAction::parse("addContactNotes", &args);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_definitions_cover_every_action() {
        let definitions = AgentAction::definitions();
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "analyzeCustomerIntent",
                "createBooking",
                "updateBookingStatus",
                "updateContactInfo",
                "getContactBookings",
                "addContactNotes"
            ]
        );
    }

    #[test]
    fn test_definitions_declare_object_schemas_with_required_contact_id() {
        for definition in AgentAction::definitions() {
            assert_eq!(definition.input_schema["type"], "object", "{}", definition.name);
            assert!(
                !definition.description.is_empty(),
                "{} needs a description",
                definition.name
            );
            let required = definition.input_schema["required"]
                .as_array()
                .unwrap_or_else(|| panic!("{} missing required list", definition.name));
            assert!(
                required.iter().any(|v| v == "contactId"),
                "{} must require contactId",
                definition.name
            );
        }
    }

    #[test]
    fn test_schema_enums_match_domain_serialization() {
        // The schema strings must deserialize into the domain enums
        let definitions = AgentAction::definitions();
        let analyze = &definitions[0];
        for value in analyze.input_schema["properties"]["intent"]["enum"]
            .as_array()
            .unwrap()
        {
            let parsed: std::result::Result<CustomerIntent, _> =
                serde_json::from_value(value.clone());
            assert!(parsed.is_ok(), "intent {} does not deserialize", value);
        }
        for value in analyze.input_schema["properties"]["suggestedStatus"]["enum"]
            .as_array()
            .unwrap()
        {
            let parsed: std::result::Result<ContactStatus, _> =
                serde_json::from_value(value.clone());
            assert!(parsed.is_ok(), "status {} does not deserialize", value);
        }
        let update = &definitions[2];
        for value in update.input_schema["properties"]["status"]["enum"]
            .as_array()
            .unwrap()
        {
            let parsed: std::result::Result<BookingStatus, _> =
                serde_json::from_value(value.clone());
            assert!(parsed.is_ok(), "booking status {} does not deserialize", value);
        }
    }
}
