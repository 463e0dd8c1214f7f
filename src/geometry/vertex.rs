use bytemuck::{Pod, Zeroable};

/// Flat-shaded vertex handed to whichever renderer draws the scene.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn as_floats(vertices: &[Vertex]) -> &[f32] {
        bytemuck::cast_slice(vertices)
    }
}
