//! Named material uniforms handed to the rendering backend.
//!
//! Frame records from the engines expose their shader-facing values as a
//! [`UniformSet`]: an ordered list of named values. Order is the declaration
//! order of the matching WGSL struct, and [`UniformSet::to_bytes`] lays the
//! values out with WGSL uniform-buffer alignment so a backend can upload the
//! bytes as they are.
//!
//! # Example
//!
//! ```ignore
//! let mut u = UniformSet::new();
//! u.set("time", 1.25f32);
//! u.set("opacity", 0.4f32);
//! u.set("color", Vec3::new(0.78, 0.71, 1.0));
//! queue.write_buffer(&buffer, 0, &u.to_bytes());
//! ```

use glam::{Vec3, Vec4};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    U32(u32),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl UniformValue {
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            UniformValue::F32(_) => "f32",
            UniformValue::U32(_) => "u32",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
        }
    }

    /// Alignment in a WGSL uniform buffer.
    pub fn align(&self) -> usize {
        match self {
            UniformValue::F32(_) | UniformValue::U32(_) => 4,
            UniformValue::Vec3(_) | UniformValue::Vec4(_) => 16,
        }
    }

    /// Byte size without trailing padding.
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::F32(_) | UniformValue::U32(_) => 4,
            UniformValue::Vec3(_) => 12,
            UniformValue::Vec4(_) => 16,
        }
    }

    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            UniformValue::F32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::U32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            // A scalar may sit in a vec3's trailing 4 bytes.
            UniformValue::Vec3(v) => buf.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => buf.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            UniformValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformSet {
    /// Ordered (name, value) pairs; order is the WGSL struct layout.
    values: Vec<(String, UniformValue)>,
    indices: HashMap<String, usize>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a uniform, or replace the value of an existing one in place.
    pub fn set<V: Into<UniformValue>>(&mut self, name: &str, value: V) {
        let value = value.into();
        if let Some(&idx) = self.indices.get(name) {
            self.values[idx].1 = value;
        } else {
            let idx = self.values.len();
            self.values.push((name.to_string(), value));
            self.indices.insert(name.to_string(), idx);
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with<V: Into<UniformValue>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.indices.get(name).map(|&idx| &self.values[idx].1)
    }

    pub fn f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(UniformValue::as_f32)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// WGSL struct declaration matching [`to_bytes`](Self::to_bytes).
    pub fn to_wgsl_struct(&self, name: &str) -> String {
        let fields = self
            .values
            .iter()
            .map(|(field, value)| format!("    {}: {},", field, value.wgsl_type()))
            .collect::<Vec<_>>()
            .join("\n");
        format!("struct {} {{\n{}\n}};", name, fields)
    }

    /// Uniform-buffer bytes, padded to a multiple of 16.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (_, value) in &self.values {
            while buf.len() % value.align() != 0 {
                buf.push(0);
            }
            value.write_bytes(&mut buf);
        }
        while buf.len() % 16 != 0 {
            buf.push(0);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut u = UniformSet::new();
        u.set("time", 1.0f32);
        u.set("opacity", 0.5f32);
        u.set("time", 2.0f32);
        assert_eq!(u.len(), 2);
        assert_eq!(u.f32("time"), Some(2.0));
        let names: Vec<_> = u.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["time", "opacity"]);
        assert!(u.get("missing").is_none());
    }

    #[test]
    fn test_layout_pads_vec3() {
        let u = UniformSet::new()
            .with("time", 1.0f32)
            .with("opacity", 0.5f32)
            .with("color", Vec3::new(1.0, 2.0, 3.0));
        let bytes = u.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[4..8], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[8..16], &[0u8; 8]);
        assert_eq!(&bytes[16..20], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &3.0f32.to_le_bytes());
    }

    #[test]
    fn test_wgsl_struct() {
        let u = UniformSet::new().with("time", 0.0f32).with("color", Vec3::ZERO);
        assert_eq!(
            u.to_wgsl_struct("Material"),
            "struct Material {\n    time: f32,\n    color: vec3<f32>,\n};"
        );
    }
}
