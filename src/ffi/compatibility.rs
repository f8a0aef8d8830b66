use std::ffi::c_void;
use std::panic::catch_unwind;

use jni::objects::{JClass, JString};
use jni::sys::{jdouble, jint, JNI_VERSION_1_6};
use jni::JNIEnv;

use super::{guarded, read_string};
use crate::bridge::{self, Operation};
use crate::logging;

/// `static double CompatibilityModule.predictCompatibility(String featuresJson)`
///
/// Throws `IllegalArgumentException("Bad features")` and returns 0.0 when the
/// argument is null or not a JSON object of numbers.
#[no_mangle]
pub extern "system" fn Java_com_instantdatearena_CompatibilityModule_predictCompatibility<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    features_json: JString<'local>,
) -> jdouble {
    guarded(&mut env, Operation::PredictCompatibility, 0.0, |env| {
        let features_json = read_string(env, &features_json)?;
        bridge::predict_compatibility(features_json.as_deref())
    })
}

/// Called by the VM when the library is loaded. Installs logging from the
/// environment-level settings; per-model settings are read on `initialize`.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    // The VM only needs the version back; a panic here must not unwind into it.
    let _ = catch_unwind(logging::init_from_env);
    JNI_VERSION_1_6
}
