//! Typed access to config values.
//!
//! Floats are written with Rust's shortest round-trip formatting, which never
//! depends on the host locale, so every value written here parses back to the
//! same bits.

use std::num::ParseFloatError;

use cgmath::Vector3;
use thiserror::Error;

use super::node::ConfigNode;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("missing value `{field}`")]
    Missing { field: String },
    #[error("`{field}` = `{value}` is not a number")]
    Float {
        field: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("`{field}` = `{value}` is not finite")]
    NonFinite { field: String, value: String },
    #[error("`{field}` = `{value}` is not a three component vector")]
    Vector { field: String, value: String },
}

pub fn format_float(value: f32) -> String {
    value.to_string()
}

/// Formats a vector as `x,y,z`
pub fn format_vector(v: Vector3<f32>) -> String {
    format!("{},{},{}", v.x, v.y, v.z)
}

/// Parses a finite float; `NaN`, infinities and out of range literals are rejected
pub fn parse_float(field: &str, text: &str) -> Result<f32, ValueError> {
    let value = text.trim().parse::<f32>().map_err(|source| ValueError::Float {
        field: field.to_string(),
        value: text.to_string(),
        source,
    })?;
    if !value.is_finite() {
        return Err(ValueError::NonFinite {
            field: field.to_string(),
            value: text.to_string(),
        });
    }
    Ok(value)
}

/// Parses `x,y,z`, allowing whitespace around each component
pub fn parse_vector3(field: &str, text: &str) -> Result<Vector3<f32>, ValueError> {
    let mut out = [0.0f32; 3];
    let mut n_comp = 0;
    for comp in text.split(',') {
        if n_comp >= 3 {
            return Err(vector_error(field, text));
        }
        out[n_comp] = comp
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| vector_error(field, text))?;
        n_comp += 1;
    }
    if n_comp != 3 {
        return Err(vector_error(field, text));
    }
    Ok(Vector3::new(out[0], out[1], out[2]))
}

fn vector_error(field: &str, text: &str) -> ValueError {
    ValueError::Vector {
        field: field.to_string(),
        value: text.to_string(),
    }
}

fn required<'a>(node: &'a ConfigNode, key: &str) -> Result<&'a str, ValueError> {
    node.get_value(key).ok_or_else(|| ValueError::Missing {
        field: key.to_string(),
    })
}

pub fn required_float(node: &ConfigNode, key: &str) -> Result<f32, ValueError> {
    parse_float(key, required(node, key)?)
}

pub fn required_vector3(node: &ConfigNode, key: &str) -> Result<Vector3<f32>, ValueError> {
    parse_vector3(key, required(node, key)?)
}
