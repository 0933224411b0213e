//! Browser binding for the activation gate.
//!
//! The page's glue script loads the external module itself and hands its
//! initialization function to [`install_activation_gate`]:
//!
//! ```text
//! import initGate, { installActivationGate } from "./pkg/meshwave.js";
//! import initMeshwave, * as meshwave from "./meshwave/meshwave.js";
//!
//! await Promise.all([initGate(), initMeshwave()]);
//! installActivationGate("enable-meshwave", meshwave.greet);
//! ```

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::gate::{ActivationGate, ActivationTarget, ExternalModule, TriggerSource};
use crate::install::{InstallError, InstallOutcome, InstallRegistry, PageDocument};

/// Inline style written to the element once the gate opens.
pub const ACTIVATED_STYLE: &str = "color: #ccc !important;";

thread_local! {
    static REGISTRY: InstallRegistry = InstallRegistry::default();
}

impl PageDocument for web_sys::Document {
    type Element = web_sys::Element;

    fn element_by_id(&self, id: &str) -> Option<web_sys::Element> {
        self.get_element_by_id(id)
    }

    fn is_loading(&self) -> bool {
        self.ready_state() == "loading"
    }
}

/// The activation control, restyled when the gate opens.
pub struct StyledElement(web_sys::Element);

impl ActivationTarget for StyledElement {
    fn mark_activated(&self) {
        if let Err(e) = self.0.set_attribute("style", ACTIVATED_STYLE) {
            web_sys::console::warn_2(&"failed to restyle activation element:".into(), &e);
        }
    }
}

/// Zero-argument entry point exported by the external module.
pub struct EntryPoint(js_sys::Function);

impl ExternalModule for EntryPoint {
    fn init(&self) {
        // Rethrown so the browser reports it like any other uncaught error.
        if let Err(e) = self.0.call0(&JsValue::NULL) {
            wasm_bindgen::throw_val(e);
        }
    }
}

/// Persistent `click` listener on an element.
pub struct ClickSource(web_sys::Element);

impl TriggerSource for ClickSource {
    type Error = JsValue;

    fn subscribe<H>(&self, handler: H) -> Result<(), JsValue>
    where
        H: Fn() + 'static,
    {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            handler();
        }) as Box<dyn FnMut(_)>);
        self.0
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        // The listener lives as long as the page.
        closure.forget();
        Ok(())
    }
}

/// Wires the gate to the element with id `element_id`.
///
/// Calling this again for the same id is a no-op. When the element is not in
/// the document yet and parsing is still in progress, binding waits for
/// `DOMContentLoaded`.
#[wasm_bindgen(js_name = installActivationGate)]
pub fn install_activation_gate(element_id: &str, init: js_sys::Function) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let deferred_init = init.clone();
    let outcome = REGISTRY.with(|registry| {
        registry.install(
            &document,
            element_id,
            |element| {
                let gate = Rc::new(ActivationGate::new(
                    StyledElement(element.clone()),
                    EntryPoint(init),
                ));
                ActivationGate::bind(&gate, &ClickSource(element)).map(|_| ())
            },
            || defer_until_loaded(&document, element_id.to_owned(), deferred_init),
        )
    });

    match outcome {
        Ok(InstallOutcome::AlreadyInstalled) => {
            web_sys::console::log_1(
                &format!("activation gate for #{element_id} already installed").into(),
            );
            Ok(())
        }
        Ok(InstallOutcome::Installed | InstallOutcome::Deferred) => Ok(()),
        Err(InstallError::Host(e)) => Err(e),
        Err(e) => Err(JsValue::from_str(&e.to_string())),
    }
}

fn defer_until_loaded(
    document: &web_sys::Document,
    element_id: String,
    init: js_sys::Function,
) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(move || {
        if let Err(e) = install_activation_gate(&element_id, init) {
            web_sys::console::error_1(&e);
        }
    });

    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        callback.unchecked_ref(),
        &options,
    )
}
