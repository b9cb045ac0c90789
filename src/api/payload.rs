//! Chatbot message payload stored as template content.
//!
//! Mirrors the WhatsApp-style outbound message object: a `type` discriminator
//! plus one populated sub-object (text, media, interactive, template, ...).
//! Unknown keys are dropped when a payload is accepted, so the stored JSON
//! always has this shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NameObject {
    pub formatted_name: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub suffix: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressObject {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailObject {
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrgObject {
    pub title: Option<String>,
    pub department: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhoneObject {
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UrlObject {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactObject {
    #[validate]
    pub addresses: Option<AddressObject>,
    pub birthday: Option<NaiveDate>,
    #[validate]
    pub emails: Option<Vec<EmailObject>>,
    #[validate]
    pub name: Option<NameObject>,
    #[validate]
    pub phones: Option<Vec<PhoneObject>>,
    #[validate]
    pub org: Option<OrgObject>,
    #[validate]
    pub urls: Option<Vec<UrlObject>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediaObject {
    pub id: String,
    pub link: Option<String>,
    pub caption: Option<String>,
    pub filename: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContextObject {
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplyObject {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ButtonObject {
    pub text: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[validate]
    pub reply: Option<ReplyObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductObject {
    pub product_retailer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RowObject {
    #[validate(length(max = 128, message = "at most 128 characters"))]
    pub id: String,
    #[validate(length(max = 256, message = "at most 256 characters"))]
    pub title: String,
    #[validate(length(max = 256, message = "at most 256 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SectionObject {
    #[validate]
    pub product_items: Option<Vec<ProductObject>>,
    #[validate]
    pub rows: Option<Vec<RowObject>>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActionObject {
    pub button: Option<String>,
    #[validate]
    pub buttons: Option<Vec<ButtonObject>>,
    pub catalog_id: Option<String>,
    pub product_retailer_id: Option<String>,
    #[validate]
    pub sections: Option<Vec<SectionObject>>,
}

/// `type` is one of text, video, image, document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeaderObject {
    #[validate]
    pub document: Option<MediaObject>,
    #[validate]
    pub image: Option<MediaObject>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[validate]
    pub video: Option<MediaObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BodyObject {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FooterObject {
    pub text: String,
}

/// `type` is one of button, list, product, product_list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InteractiveObject {
    #[validate]
    pub action: ActionObject,
    #[validate]
    pub body: Option<BodyObject>,
    #[validate]
    pub footer: Option<FooterObject>,
    #[validate]
    pub header: Option<HeaderObject>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationObject {
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TextObject {
    pub body: String,
    pub preview_url: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LanguageObject {
    pub policy: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ButtonParameterObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComponentsObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_type: Option<String>,
    #[validate]
    pub parameters: Option<Vec<ButtonParameterObject>>,
    pub index: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TemplateObject {
    pub name: String,
    #[validate]
    pub language: LanguageObject,
    #[validate]
    pub components: Option<Vec<ComponentsObject>>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReactionObject {
    pub message_id: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessagePayload {
    #[validate]
    pub audio: Option<MediaObject>,
    #[validate]
    pub contacts: Option<Vec<ContactObject>>,
    #[validate]
    pub context: Option<ContextObject>,
    #[validate]
    pub document: Option<MediaObject>,
    pub hsm: Option<String>,
    #[validate]
    pub image: Option<MediaObject>,
    #[validate]
    pub interactive: Option<InteractiveObject>,
    #[validate]
    pub location: Option<LocationObject>,
    pub messaging_product: Option<String>,
    pub preview_url: Option<bool>,
    pub recipient_type: Option<String>,
    pub status: Option<String>,
    #[validate]
    pub sticker: Option<MediaObject>,
    #[validate]
    pub template: Option<TemplateObject>,
    #[validate]
    pub text: Option<TextObject>,
    pub to: Option<String>,
    /// text, image, document, video, audio, location, contact, sticker,
    /// interactive or reaction
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[validate]
    pub video: Option<MediaObject>,
    #[validate]
    pub reaction: Option<ReactionObject>,
}

impl MessagePayload {
    /// Normalized JSON for the `content` column.
    pub fn to_value(&self) -> serde_json::Value {
        // Every field is a plain string/bool/date/struct, so this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
