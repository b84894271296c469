use std::os::raw::c_void;

pub(crate) type MecabHandle = *mut c_void;
pub(crate) type CabochaHandle = *mut c_void;
pub(crate) type CabochaTreeHandle = *mut c_void;
