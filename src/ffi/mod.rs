//! JNI entry points.
//!
//! Symbol names follow the JNI convention `Java_<package>_<Class>_<method>`
//! and must stay in sync with the `native` declarations on the Java side:
//!
//! ```java
//! package com.instantdatearena;
//!
//! public class LlamaModule {
//!     static { System.loadLibrary("llama_module"); }
//!     public native String generate(String prompt);
//!     public native boolean initialize(String modelPath);
//!     public native String generateWithLimit(String prompt, int maxTokens);
//!     public native String getModelStatus();
//!     public native void cleanup();
//! }
//!
//! public class CompatibilityModule {
//!     public static native double predictCompatibility(String featuresJson);
//! }
//! ```
//!
//! No Rust panic may unwind into the JVM, so every entry point runs its body
//! under `catch_unwind`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use jni::objects::JString;
use jni::JNIEnv;
use tracing::{error, warn};

use crate::bridge::Operation;
use crate::error::Result;

mod compatibility;
mod llama_module;

pub use compatibility::*;
pub use llama_module::*;

/// Copies a Java string into Rust. The borrowed UTF chars are released when
/// the `JavaStr` guard drops, before this function returns.
fn read_string(env: &mut JNIEnv, value: &JString) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let borrowed = env.get_string(value)?;
    Ok(Some(String::from(borrowed)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs `body`, converting an error into a Java exception and a panic into
/// `java.lang.RuntimeException`. Returns `fallback` in both cases.
fn guarded<'local, T>(
    env: &mut JNIEnv<'local>,
    operation: Operation,
    fallback: T,
    body: impl FnOnce(&mut JNIEnv<'local>) -> Result<T>,
) -> T {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *env)));
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            warn!(?operation, error = %err, "Native call failed");
            // A failed JNI call may already have left an exception pending.
            if !env.exception_check().unwrap_or(false) {
                let message = operation.failure_message(&err);
                if let Err(e) = env.throw_new(err.java_exception_class(), message) {
                    error!(error = %e, "Failed to raise Java exception");
                }
            }
            fallback
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(?operation, panic = %message, "Native call panicked");
            if !env.exception_check().unwrap_or(false) {
                let _ = env.throw_new("java/lang/RuntimeException", format!("native panic: {}", message));
            }
            fallback
        }
    }
}
