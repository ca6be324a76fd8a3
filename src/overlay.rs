use crate::constants::{EYE_READOUT_ID, HINT_ID, STATUS_ID};
use crate::dom;
use glam::Vec3;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_ID) {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
pub fn is_hidden(document: &web::Document) -> bool {
    if let Some(el) = document.get_element_by_id(HINT_ID) {
        if el.class_list().contains("hidden") {
            return true;
        }
        return el
            .get_attribute("style")
            .map(|s| s.contains("display:none"))
            .unwrap_or(false);
    }
    false
}

#[inline]
pub fn toggle(document: &web::Document) {
    if is_hidden(document) {
        show(document);
    } else {
        hide(document);
    }
}

/// Tracks what is on screen so the DOM is only touched on change.
#[derive(Default)]
pub struct StatusLine {
    last_status: String,
    last_eye: String,
}

impl StatusLine {
    pub fn update(&mut self, document: &web::Document, status: &str, eye: Vec3) {
        if status != self.last_status {
            dom::set_text(document, STATUS_ID, status);
            self.last_status = status.to_string();
        }
        let eye_text = format!("eye ({:+.2}, {:+.2}, {:.2})", eye.x, eye.y, eye.z);
        if eye_text != self.last_eye {
            dom::set_text(document, EYE_READOUT_ID, &eye_text);
            self.last_eye = eye_text;
        }
    }
}
