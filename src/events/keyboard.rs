use crate::core::{key_action_for, KeyAction, Viewer};
use crate::overlay;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(
    ev: &web::KeyboardEvent,
    viewer: &Rc<RefCell<Viewer>>,
    canvas: &web::HtmlCanvasElement,
) {
    let key = ev.key();
    if viewer.borrow_mut().input_mut().key_down(&key) {
        if let Some(KeyAction::Move(_)) = key_action_for(&key) {
            // keep arrow keys from scrolling the page
            ev.prevent_default();
        }
        if key == "Escape" {
            if let Some(doc) = web::window().and_then(|w| w.document()) {
                _ = doc.exit_fullscreen();
            }
        }
        return;
    }
    match key.as_str() {
        "h" | "H" => {
            if let Some(doc) = web::window().and_then(|w| w.document()) {
                overlay::toggle(&doc);
            }
            ev.prevent_default();
        }
        "Enter" => {
            if let Some(doc) = web::window().and_then(|w| w.document()) {
                if doc.fullscreen_element().is_some() {
                    _ = doc.exit_fullscreen();
                } else {
                    _ = canvas.request_fullscreen();
                }
            }
            ev.prevent_default();
        }
        _ => {}
    }
}

pub fn wire_global_keys(viewer: Rc<RefCell<Viewer>>, canvas: web::HtmlCanvasElement) {
    let Some(window) = web::window() else {
        return;
    };

    let viewer_down = viewer.clone();
    let keydown = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &viewer_down, &canvas);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());
    keydown.forget();

    let viewer_up = viewer.clone();
    let keyup = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        viewer_up.borrow_mut().input_mut().key_up(&ev.key());
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref());
    keyup.forget();

    // A key released while the tab is unfocused never reports keyup.
    let blur = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
        viewer.borrow_mut().input_mut().release_all();
    }) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref());
    blur.forget();
}
