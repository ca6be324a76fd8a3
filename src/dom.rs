use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Listen for `change`/`input` on a form control and hand its element to `handler`.
pub fn add_input_listener(
    document: &web::Document,
    element_id: &str,
    event: &str,
    mut handler: impl FnMut(&web::HtmlInputElement) + 'static,
) {
    let Some(el) = document.get_element_by_id(element_id) else {
        return;
    };
    let Ok(input) = el.dyn_into::<web::HtmlInputElement>() else {
        log::warn!("[dom] #{} is not an input element", element_id);
        return;
    };
    let target = input.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || handler(&target))
        as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn set_checked(document: &web::Document, element_id: &str, checked: bool) {
    if let Some(input) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        input.set_checked(checked);
    }
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

/// Resize the canvas backing store to CSS size × devicePixelRatio. Returns
/// the CSS size, which is what pointer deltas are measured in.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
    (rect.width() as f32, rect.height() as f32)
}

/// `key=value` pairs from the page's query string.
pub fn query_pairs() -> Vec<(String, String)> {
    let Some(search) = web::window().and_then(|w| w.location().search().ok()) else {
        return Vec::new();
    };
    let Ok(params) = web::UrlSearchParams::new_with_str(&search) else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    let iter = js_sys::try_iter(&params).ok().flatten();
    if let Some(iter) = iter {
        for entry in iter.flatten() {
            let entry: js_sys::Array = entry.unchecked_into();
            if let (Some(k), Some(v)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
                pairs.push((k, v));
            }
        }
    }
    pairs
}

pub fn set_value(document: &web::Document, element_id: &str, value: &str) {
    if let Some(input) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        input.set_value(value);
    }
}
