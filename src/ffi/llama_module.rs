use std::panic::{self, AssertUnwindSafe};

use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jint, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use tracing::{error, warn};

use super::{guarded, panic_message, read_string};
use crate::bridge::{self, Operation};
use crate::llm::PLACEHOLDER_RESPONSE;

/// `String LlamaModule.generate(String prompt)`
///
/// Never throws: a null prompt, a failed string conversion, a generation
/// error or a panic all produce the placeholder response.
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_LlamaModule_generate<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    prompt: JString<'local>,
) -> jstring {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let prompt = match read_string(&mut env, &prompt) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Could not read prompt");
                let _ = env.exception_clear();
                None
            }
        };
        bridge::generate(bridge::engine(), prompt.as_deref())
    }));

    let response = outcome.unwrap_or_else(|payload| {
        error!(panic = %panic_message(payload.as_ref()), "generate panicked");
        PLACEHOLDER_RESPONSE.to_string()
    });

    match env.new_string(response) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            // Only allocation failure gets here; the VM has an OutOfMemoryError pending.
            error!(error = %e, "Could not allocate response string");
            JObject::null().into_raw()
        }
    }
}

/// `boolean LlamaModule.initialize(String modelPath)`
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_LlamaModule_initialize<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    model_path: JString<'local>,
) -> jboolean {
    guarded(&mut env, Operation::Initialize, JNI_FALSE, |env| {
        let model_path = read_string(env, &model_path)?;
        let loaded = bridge::initialize(bridge::engine(), model_path.as_deref())?;
        Ok(if loaded { JNI_TRUE } else { JNI_FALSE })
    })
}

/// `String LlamaModule.generateWithLimit(String prompt, int maxTokens)`
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_LlamaModule_generateWithLimit<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    prompt: JString<'local>,
    max_tokens: jint,
) -> jstring {
    guarded(&mut env, Operation::Generate, JObject::null().into_raw(), |env| {
        let prompt = read_string(env, &prompt)?;
        let response = bridge::generate_with_limit(bridge::engine(), prompt.as_deref(), max_tokens)?;
        Ok(env.new_string(response)?.into_raw())
    })
}

/// `String LlamaModule.getModelStatus()`, a JSON object
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_LlamaModule_getModelStatus<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    guarded(&mut env, Operation::Status, JObject::null().into_raw(), |env| {
        let status = bridge::model_status_json(bridge::engine())?;
        Ok(env.new_string(status)?.into_raw())
    })
}

/// `void LlamaModule.cleanup()`
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_LlamaModule_cleanup<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    guarded(&mut env, Operation::Cleanup, (), |_env| bridge::cleanup(bridge::engine()))
}
