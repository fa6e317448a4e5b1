//! WASM bindings for the Quill template engine.
//!
//! Exposes `render()`, `assemble()` and `check()` to JavaScript via
//! wasm-bindgen. Contexts are plain JS objects, converted with
//! serde-wasm-bindgen.

use std::collections::HashMap;

use quill_collector::{Collector, MemoryLoader};
use quill_parser::{Compiler, Value};
use wasm_bindgen::prelude::*;

/// Render template source against a JS object context.
///
/// Throws a JS error on syntax or render errors.
#[wasm_bindgen]
pub fn render(source: &str, context: JsValue) -> Result<String, JsError> {
    let context = context_value(context)?;
    quill_render::render(source, &context).map_err(|e| JsError::new(&e.to_string()))
}

/// Resolve inheritance and includes for `page` over an in-memory site
/// (`{ "path": "source", ... }`), then render it.
#[wasm_bindgen]
pub fn assemble(files: JsValue, page: &str, context: JsValue) -> Result<String, JsError> {
    let files: HashMap<String, String> =
        serde_wasm_bindgen::from_value(files).map_err(|e| JsError::new(&e.to_string()))?;
    let context = context_value(context)?;
    assemble_files(files, page, &context).map_err(|e| JsError::new(&e))
}

/// Check template source without rendering.
///
/// Returns `{ ok: true }` or `{ ok: false, message, line, column }`.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<JsValue, JsError> {
    let report = check_source(source);

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"ok".into(), &report.is_none().into())
        .map_err(|_| JsError::new("Failed to set ok property"))?;
    if let Some(err) = report {
        js_sys::Reflect::set(&js_obj, &"message".into(), &err.message.into())
            .map_err(|_| JsError::new("Failed to set message property"))?;
        js_sys::Reflect::set(&js_obj, &"line".into(), &(err.line as u32).into())
            .map_err(|_| JsError::new("Failed to set line property"))?;
        js_sys::Reflect::set(&js_obj, &"column".into(), &(err.column as u32).into())
            .map_err(|_| JsError::new("Failed to set column property"))?;
    }

    Ok(js_obj.into())
}

/// Get the engine version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `undefined` and `null` render as an empty context.
fn context_value(context: JsValue) -> Result<Value, JsError> {
    if context.is_undefined() || context.is_null() {
        return Ok(Value::empty_map());
    }
    serde_wasm_bindgen::from_value(context).map_err(|e| JsError::new(&e.to_string()))
}

fn check_source(source: &str) -> Option<quill_parser::SyntaxError> {
    Compiler::compile(source).err()
}

fn assemble_files(
    files: HashMap<String, String>,
    page: &str,
    context: &Value,
) -> Result<String, String> {
    let mut loader = MemoryLoader::new();
    for (path, source) in files {
        loader.insert(&path, source);
    }
    Collector::new(loader, page)
        .assemble_page(context)
        .map_err(|e| e.to_string())
}
