//! Attaches the widget to the host calendar page.
//!
//! The button is rendered into a host element inserted right before the
//! toolbar anchor. The popup and the mask live in their own hosts appended to
//! `body`, rendered through portals. All three hosts are looked up by id
//! before being created, so attaching twice never duplicates them.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit};

use crate::components::widget::{ExchangeWidget, WidgetProps};
use crate::config::{AttachMode, WidgetConfig};
use crate::error::WidgetError;

pub const BUTTON_HOST_ID: &str = "exchange-widget-button-host";
pub const POPUP_HOST_ID: &str = "exchange-widget-popup-host";
pub const MASK_HOST_ID: &str = "exchange-widget-mask-host";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    AlreadyMounted,
    /// The calendar portlet is not on this page (yet)
    AnchorMissing,
}

/// Attaches right away when the toolbar is already on the page. Otherwise
/// retries once on window load, or on every DOM mutation in observe mode.
pub fn start(config: Rc<WidgetConfig>) {
    match try_mount(&config) {
        Ok(MountOutcome::AnchorMissing) => match config.attach {
            AttachMode::Load => {
                EventListener::once(&gloo::utils::window(), "load", move |_| {
                    report(try_mount(&config));
                })
                .forget();
            }
            AttachMode::Observe => {
                tracing::debug!("Calendar toolbar not found, waiting for it");
                if let Err(e) = observe_until_mounted(config) {
                    tracing::error!("Failed to watch for the calendar toolbar: {}", e);
                }
            }
        },
        result => {
            report(result);
        }
    }
}

/// Logs the attach result; `true` once there is nothing left to retry.
fn report(result: Result<MountOutcome, WidgetError>) -> bool {
    match result {
        Ok(MountOutcome::AnchorMissing) => {
            tracing::debug!("Calendar toolbar not found, Exchange widget not attached");
            false
        }
        Ok(outcome) => {
            tracing::info!("Exchange widget attach: {:?}", outcome);
            true
        }
        Err(e) => {
            tracing::error!("Failed to mount Exchange widget: {}", e);
            true
        }
    }
}

/// Mounts the widget unless it is already on the page or the anchor is absent.
pub fn try_mount(config: &Rc<WidgetConfig>) -> Result<MountOutcome, WidgetError> {
    let document = gloo::utils::document();
    if document.get_element_by_id(BUTTON_HOST_ID).is_some() {
        return Ok(MountOutcome::AlreadyMounted);
    }

    let anchor = match document
        .query_selector(&config.anchor_selector)
        .map_err(|e| WidgetError::dom("invalid anchor selector", e))?
    {
        Some(anchor) => anchor,
        None => return Ok(MountOutcome::AnchorMissing),
    };

    let button_host = document
        .create_element("span")
        .map_err(|e| WidgetError::dom("failed to create button host", e))?;
    button_host.set_id(BUTTON_HOST_ID);
    anchor
        .before_with_node_1(&button_host)
        .map_err(|e| WidgetError::dom("failed to insert button host", e))?;

    let popup_host = ensure_body_host(&document, POPUP_HOST_ID)?;
    let mask_host = ensure_body_host(&document, MASK_HOST_ID)?;

    let props = WidgetProps {
        config: config.clone(),
        anchor,
        popup_host,
        mask_host,
    };
    yew::Renderer::<ExchangeWidget>::with_root_and_props(button_host, props).render();

    tracing::info!("Exchange widget mounted");
    Ok(MountOutcome::Mounted)
}

fn ensure_body_host(document: &Document, id: &str) -> Result<Element, WidgetError> {
    if let Some(existing) = document.get_element_by_id(id) {
        return Ok(existing);
    }

    let body = document
        .body()
        .ok_or_else(|| WidgetError::Dom("document has no body".to_string()))?;
    let host = document
        .create_element("div")
        .map_err(|e| WidgetError::dom("failed to create host", e))?;
    host.set_id(id);
    body.append_child(&host)
        .map_err(|e| WidgetError::dom("failed to append host", e))?;

    Ok(host)
}

/// Retries mounting on every DOM mutation until it succeeds, then disconnects.
fn observe_until_mounted(config: Rc<WidgetConfig>) -> Result<(), WidgetError> {
    let body = gloo::utils::document()
        .body()
        .ok_or_else(|| WidgetError::Dom("document has no body".to_string()))?;

    let observer_slot: Rc<RefCell<Option<MutationObserver>>> = Rc::default();

    let on_mutation = {
        let observer_slot = observer_slot.clone();
        Closure::<dyn FnMut()>::new(move || {
            let done = report(try_mount(&config));
            if done {
                if let Some(observer) = observer_slot.borrow_mut().take() {
                    observer.disconnect();
                }
            }
        })
    };

    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())
        .map_err(|e| WidgetError::dom("failed to create mutation observer", e))?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer
        .observe_with_options(&body, &options)
        .map_err(|e| WidgetError::dom("failed to observe body", e))?;

    *observer_slot.borrow_mut() = Some(observer);
    // Lives as long as the page; the observer is disconnected once mounted.
    on_mutation.forget();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;
    use web_sys::HtmlElement;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn count(document: &Document, id: &str) -> u32 {
        document
            .query_selector_all(&format!("#{}", id))
            .expect("valid selector")
            .length()
    }

    fn body_element(document: &Document, tag: &str) -> Element {
        let element = document.create_element(tag).expect("create element");
        document
            .body()
            .expect("body")
            .append_child(&element)
            .expect("append element");
        element
    }

    fn remove_hosts(document: &Document) {
        for id in [BUTTON_HOST_ID, POPUP_HOST_ID, MASK_HOST_ID] {
            if let Some(host) = document.get_element_by_id(id) {
                host.remove();
            }
        }
    }

    fn click(root: &Element, selector: &str) {
        root.query_selector(selector)
            .expect("valid selector")
            .expect("element rendered")
            .dyn_into::<HtmlElement>()
            .expect("html element")
            .click();
    }

    fn is_shown(host: &Element) -> bool {
        host.first_element_child()
            .and_then(|child| child.get_attribute("style"))
            .map_or(false, |style| style.starts_with("display: block;"))
    }

    #[wasm_bindgen_test]
    async fn test_observe_mode_mounts_when_anchor_appears() {
        let document = gloo::utils::document();
        let config = Rc::new(WidgetConfig {
            anchor_selector: ".exchange-late-anchor".to_string(),
            api_base: "/exchange-test".to_string(),
            attach: AttachMode::Observe,
            ..WidgetConfig::default()
        });

        remove_hosts(&document);
        start(config);
        assert_eq!(count(&document, BUTTON_HOST_ID), 0);

        body_element(&document, "div").set_class_name("exchange-late-anchor");
        TimeoutFuture::new(0).await;

        for id in [BUTTON_HOST_ID, POPUP_HOST_ID, MASK_HOST_ID] {
            assert_eq!(count(&document, id), 1, "host {}", id);
        }
    }

    #[wasm_bindgen_test]
    async fn test_mask_click_hides_popup_but_popup_click_does_not() {
        let document = gloo::utils::document();
        let anchor = body_element(&document, "div");
        let button_host = body_element(&document, "span");
        let popup_host = body_element(&document, "div");
        let mask_host = body_element(&document, "div");

        let props = WidgetProps {
            config: Rc::new(WidgetConfig {
                api_base: "/exchange-test".to_string(),
                ..WidgetConfig::default()
            }),
            anchor,
            popup_host: popup_host.clone(),
            mask_host: mask_host.clone(),
        };
        yew::Renderer::<ExchangeWidget>::with_root_and_props(button_host.clone(), props).render();
        TimeoutFuture::new(0).await;
        assert!(!is_shown(&popup_host));

        click(&button_host, ".ExchangeSettingsButton");
        TimeoutFuture::new(0).await;
        assert!(is_shown(&popup_host));
        assert!(is_shown(&mask_host));

        click(&popup_host, ".ExchangeSettingsTitle h6");
        TimeoutFuture::new(0).await;
        assert!(is_shown(&popup_host));
        assert!(is_shown(&mask_host));

        click(&mask_host, ".ExchangeSettingsMask");
        TimeoutFuture::new(0).await;
        assert!(!is_shown(&popup_host));
        assert!(!is_shown(&mask_host));
    }

    #[wasm_bindgen_test]
    fn test_mounting_twice_creates_one_of_each() {
        let document = gloo::utils::document();
        let anchor = document.create_element("div").expect("create anchor");
        anchor.set_class_name("exchange-test-anchor");
        document
            .body()
            .expect("body")
            .append_child(&anchor)
            .expect("append anchor");

        let config = Rc::new(WidgetConfig {
            anchor_selector: ".exchange-test-anchor".to_string(),
            api_base: "/exchange-test".to_string(),
            ..WidgetConfig::default()
        });

        remove_hosts(&document);
        assert_eq!(try_mount(&config).expect("first mount"), MountOutcome::Mounted);
        assert_eq!(
            try_mount(&config).expect("second mount"),
            MountOutcome::AlreadyMounted
        );

        for id in [BUTTON_HOST_ID, POPUP_HOST_ID, MASK_HOST_ID] {
            assert_eq!(count(&document, id), 1, "host {}", id);
        }
    }

    #[wasm_bindgen_test]
    fn test_body_host_is_reused() {
        let document = gloo::utils::document();
        let first = ensure_body_host(&document, "exchange-test-host").expect("create host");
        let second = ensure_body_host(&document, "exchange-test-host").expect("reuse host");

        assert_eq!(first, second);
        assert_eq!(count(&document, "exchange-test-host"), 1);
    }
}
