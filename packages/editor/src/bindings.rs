//! # Field Bindings
//!
//! Page-level store of template field values keyed by element id (eid).
//! Templates read through the getters, falling back to their baked-in
//! defaults for fields nobody has customized yet. Edits are reported through
//! [`FieldBindings::on_content_change`], which updates the snapshot and then
//! forwards to the outer [`ContentSink`].

use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Stored value of one field. Which members are set depends on the field's
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonValue {
    pub text: String,
    pub url: String,
}

/// Outbound value for one edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text {
        text: String,
    },
    Image {
        image: String,
        #[serde(rename = "linkUrl", default, skip_serializing_if = "Option::is_none")]
        link_url: Option<String>,
    },
    Button {
        button: ButtonValue,
    },
}

impl FieldValue {
    pub fn shape(&self) -> &'static str {
        match self {
            FieldValue::Text { .. } => "text",
            FieldValue::Image { .. } => "image",
            FieldValue::Button { .. } => "button",
        }
    }
}

impl FieldData {
    /// Shape of the stored value, `None` when nothing is stored yet
    pub fn shape(&self) -> Option<&'static str> {
        if self.text.is_some() {
            Some("text")
        } else if self.image.is_some() {
            Some("image")
        } else if self.button.is_some() {
            Some("button")
        } else {
            None
        }
    }

    fn apply(&mut self, value: FieldValue) {
        match value {
            FieldValue::Text { text } => self.text = Some(text),
            FieldValue::Image { image, link_url } => {
                self.image = Some(image);
                self.link_url = link_url;
            }
            FieldValue::Button { button } => {
                self.button = Some(ButtonData {
                    text: Some(button.text),
                    url: Some(button.url),
                })
            }
        }
    }
}

/// Receiver of content changes, outside the editor
pub trait ContentSink {
    fn content_changed(&mut self, eid: &str, value: &FieldValue);
}

impl<F> ContentSink for F
where
    F: FnMut(&str, &FieldValue),
{
    fn content_changed(&mut self, eid: &str, value: &FieldValue) {
        self(eid, value)
    }
}

pub struct FieldBindings {
    data: BTreeMap<String, FieldData>,
    editable: bool,
    sink: Option<Box<dyn ContentSink>>,
}

impl FieldBindings {
    pub fn new(data: BTreeMap<String, FieldData>, editable: bool) -> Self {
        Self {
            data,
            editable,
            sink: None,
        }
    }

    /// Parse a `{ eid: FieldData }` JSON object
    pub fn from_json(json: &str, editable: bool) -> Result<Self, EditorError> {
        Ok(Self::new(serde_json::from_str(json)?, editable))
    }

    pub fn with_sink(mut self, sink: impl ContentSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn data(&self) -> &BTreeMap<String, FieldData> {
        &self.data
    }

    /// Stored value of a field that must exist
    pub fn field(&self, eid: &str) -> Result<&FieldData, EditorError> {
        self.data
            .get(eid)
            .ok_or_else(|| EditorError::UnknownField(eid.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    /// Stored text, or `fallback` when the field is missing or was cleared
    pub fn get_text(&self, eid: &str, fallback: &str) -> String {
        self.data
            .get(eid)
            .and_then(|field| field.text.clone())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn get_image(&self, eid: &str, fallback: &str) -> String {
        self.data
            .get(eid)
            .and_then(|field| field.image.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn get_image_link(&self, eid: &str) -> Option<String> {
        self.data.get(eid).and_then(|field| field.link_url.clone())
    }

    /// Button text and url, each falling back independently
    pub fn get_button(&self, eid: &str, fallback_text: &str, fallback_url: &str) -> ButtonValue {
        let button = self.data.get(eid).and_then(|field| field.button.as_ref());
        ButtonValue {
            text: button
                .and_then(|b| b.text.clone())
                .unwrap_or_else(|| fallback_text.to_string()),
            url: button
                .and_then(|b| b.url.clone())
                .unwrap_or_else(|| fallback_url.to_string()),
        }
    }

    /// Record an edit and forward it to the sink.
    ///
    /// Fails on a read-only page, or when the value's shape disagrees with
    /// what the field already stores.
    pub fn on_content_change(&mut self, eid: &str, value: FieldValue) -> Result<(), EditorError> {
        if !self.editable {
            return Err(EditorError::ReadOnly);
        }

        let field = self.data.entry(eid.to_string()).or_default();
        if let Some(expected) = field.shape() {
            if expected != value.shape() {
                return Err(EditorError::FieldShape {
                    eid: eid.to_string(),
                    expected,
                    found: value.shape(),
                });
            }
        }

        debug!(eid, shape = value.shape(), "field content changed");
        field.apply(value.clone());
        if let Some(sink) = &mut self.sink {
            sink.content_changed(eid, &value);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FieldBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBindings")
            .field("data", &self.data)
            .field("editable", &self.editable)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bindings() -> FieldBindings {
        FieldBindings::from_json(
            r#"{
                "hero.title": { "text": "Welcome" },
                "hero.image": { "image": "/a.png", "linkUrl": "/about" },
                "hero.cta": { "button": { "text": "Buy" } }
            }"#,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_getters_fall_back_to_defaults() {
        let b = bindings();
        assert_eq!(b.get_text("hero.title", "Default"), "Welcome");
        assert_eq!(b.get_text("footer.note", "Default"), "Default");
        assert_eq!(b.get_image("hero.image", "/x.png"), "/a.png");
        assert_eq!(b.get_image_link("hero.image").as_deref(), Some("/about"));

        let button = b.get_button("hero.cta", "Go", "/start");
        assert_eq!(button.text, "Buy");
        assert_eq!(button.url, "/start");
    }

    #[test]
    fn test_cleared_text_falls_back_to_default() {
        let b = FieldBindings::from_json(r#"{ "hero.title": { "text": "" } }"#, true).unwrap();
        assert_eq!(b.get_text("hero.title", "Welcome"), "Welcome");
    }

    #[test]
    fn test_change_updates_snapshot_then_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut b = bindings().with_sink(move |eid: &str, value: &FieldValue| {
            log.borrow_mut().push((eid.to_string(), value.clone()));
        });

        let value = FieldValue::Text {
            text: "Hi".into(),
        };
        b.on_content_change("hero.title", value.clone()).unwrap();

        assert_eq!(b.get_text("hero.title", ""), "Hi");
        assert_eq!(seen.borrow().as_slice(), &[("hero.title".to_string(), value)]);
    }

    #[test]
    fn test_read_only_rejects_changes() {
        let mut b = FieldBindings::new(BTreeMap::new(), false);
        let err = b
            .on_content_change("x", FieldValue::Text { text: "y".into() })
            .unwrap_err();
        assert!(matches!(err, EditorError::ReadOnly));
        assert!(b.data().is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut b = bindings();
        let err = b
            .on_content_change("hero.image", FieldValue::Text { text: "oops".into() })
            .unwrap_err();
        assert!(matches!(err, EditorError::FieldShape { expected: "image", .. }));
    }

    #[test]
    fn test_field_value_wire_shapes() {
        let image = FieldValue::Image {
            image: "/b.png".into(),
            link_url: None,
        };
        assert_eq!(serde_json::to_string(&image).unwrap(), r#"{"image":"/b.png"}"#);

        let button: FieldValue =
            serde_json::from_str(r#"{"button":{"text":"Go","url":"/go"}}"#).unwrap();
        assert_eq!(button.shape(), "button");
    }
}
