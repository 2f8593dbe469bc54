//! Browser wiring: hover and scroll listeners that feed the stage.
//!
//! Callbacks only flip shared cells; the stage polls them once per frame
//! so all state changes happen on the frame path.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use super::hover::Subscription;
use crate::timeline::ScrollBinding;

fn window() -> Option<Window> {
    web_sys::window()
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// Attach a `mouseenter` listener to the element matched by `selector`.
///
/// A missing element is an expected page state (the markup may not host
/// the hover target), so it is skipped with a debug log rather than
/// reported as an error.
pub fn attach_hover(selector: &str, entered: Rc<Cell<bool>>) -> Option<Subscription> {
    let document = document()?;
    let element = match document.query_selector(selector) {
        Ok(Some(element)) => element,
        Ok(None) => {
            log::debug!("hover target '{}' not present, listener skipped", selector);
            return None;
        }
        Err(_) => {
            log::debug!("hover selector '{}' is not valid, listener skipped", selector);
            return None;
        }
    };

    let closure = Closure::<dyn FnMut()>::new(move || entered.set(true));
    if element
        .add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref())
        .is_err()
    {
        return None;
    }

    Some(Subscription::new(move || {
        let _ = element
            .remove_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref());
    }))
}

/// Attach a window `scroll` listener that mirrors the vertical offset
/// into `offset`.
pub fn attach_scroll(offset: Rc<Cell<f64>>) -> Option<Subscription> {
    let window = window()?;

    let reader = window.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Ok(y) = reader.scroll_y() {
            offset.set(y);
        }
    });
    if window
        .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
        .is_err()
    {
        return None;
    }

    Some(Subscription::new(move || {
        let _ = window
            .remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
    }))
}

/// Re-measure the scroll span whenever the window resizes, since both
/// trigger offsets and the viewport height move under a relayout.
pub fn attach_resize(
    trigger_id: &str,
    end_id: &str,
    binding: Rc<Cell<Option<ScrollBinding>>>,
) -> Option<Subscription> {
    let window = window()?;

    let trigger_id = trigger_id.to_string();
    let end_id = end_id.to_string();
    let closure = Closure::<dyn FnMut()>::new(move || {
        binding.set(binding_from_elements(&trigger_id, &end_id));
    });
    if window
        .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        .is_err()
    {
        return None;
    }

    Some(Subscription::new(move || {
        let _ = window
            .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }))
}

/// Measure the scroll span between two elements: the range starts when
/// `trigger_id` reaches the top of the viewport and ends when the bottom
/// of `end_id` scrolls past the bottom edge.
pub fn binding_from_elements(trigger_id: &str, end_id: &str) -> Option<ScrollBinding> {
    let window = window()?;
    let document = document()?;

    let trigger = document.get_element_by_id(trigger_id)?;
    let end = document.get_element_by_id(end_id)?;

    let scroll_y = window.scroll_y().ok()?;
    let viewport_height = window.inner_height().ok()?.as_f64()?;

    let trigger_top = trigger.get_bounding_client_rect().top() + scroll_y;
    let end_bottom = end.get_bounding_client_rect().bottom() + scroll_y;

    Some(ScrollBinding::from_layout(
        trigger_top,
        end_bottom,
        viewport_height,
    ))
}
