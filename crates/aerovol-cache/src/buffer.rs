//! The geometry produced by a shape generator: one vertex buffer shared by
//! one or more indexed element streams. Buffers are immutable once cached;
//! regeneration replaces the whole entry.

/// Primitive topology of an element stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    TriangleStrip,
    Lines,
}

/// What an element stream draws. Fill and outline streams index into the
/// same vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamRole {
    Fill,
    Outline,
    CenterLine,
}

/// One indexed draw within a [`GeometryBuffer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ElementStream {
    pub topology: Topology,
    pub role: StreamRole,
    pub indices: Vec<u32>,
}

/// Vertex positions and normals plus the element streams drawn from them.
/// Positions are xyz-interleaved f32, relative to a reference center chosen
/// by the generator to keep f32 precision near the shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    streams: Vec<ElementStream>,
}

impl GeometryBuffer {
    #[must_use]
    pub fn new(positions: Vec<f32>, normals: Vec<f32>) -> Self {
        Self {
            positions,
            normals,
            streams: Vec::new(),
        }
    }

    pub fn push_stream(&mut self, topology: Topology, role: StreamRole, indices: Vec<u32>) {
        self.streams.push(ElementStream {
            topology,
            role,
            indices,
        });
    }

    #[must_use]
    pub fn streams(&self) -> &[ElementStream] {
        &self.streams
    }

    /// First stream with the given role.
    #[must_use]
    pub fn stream(&self, role: StreamRole) -> Option<&ElementStream> {
        self.streams.iter().find(|s| s.role == role)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Total heap footprint of the buffer data, used for cache accounting.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        let mut bytes = self.positions.len() * size_of::<f32>();
        bytes += self.normals.len() * size_of::<f32>();
        for stream in &self.streams {
            bytes += stream.indices.len() * size_of::<u32>();
        }
        bytes
    }

    /// Position data as raw bytes, for upload to a vertex buffer.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal data as raw bytes.
    #[must_use]
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }
}
