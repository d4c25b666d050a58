// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types the operator reads and writes.

pub mod imagestream;
pub mod samples;
pub mod template;

pub use imagestream::{ImageStream, ImageStreamSpec, ObjectReference, TagReference};
pub use samples::{
    ConditionStatus, ConditionType, SamplesResource, SamplesResourceCondition, SamplesResourceSpec,
    SamplesResourceStatus,
};
pub use template::Template;
