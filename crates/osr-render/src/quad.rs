//! Textured Quad Pipeline
//!
//! Draws layer textures as screen-aligned quads with premultiplied
//! source-over blending. One quad per layer, base first.

use bytemuck::{Pod, Zeroable};
use osr_bridge::{Rect, ViewRect};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler, TextureFormat,
    TextureView,
};

/// A vertex with texture coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Corners of `rect` in clip space for a view of the given size:
/// top-left, top-right, bottom-right, bottom-left
pub fn quad_vertices(rect: Rect, view: ViewRect) -> [TexturedVertex; 4] {
    let (vw, vh) = (view.width.max(1) as f32, view.height.max(1) as f32);
    let x1 = (rect.x as f32 / vw) * 2.0 - 1.0;
    let y1 = 1.0 - (rect.y as f32 / vh) * 2.0;
    let x2 = ((rect.x as f32 + rect.width as f32) / vw) * 2.0 - 1.0;
    let y2 = 1.0 - ((rect.y as f32 + rect.height as f32) / vh) * 2.0;

    [
        TexturedVertex { position: [x1, y1], uv: [0.0, 0.0] },
        TexturedVertex { position: [x2, y1], uv: [1.0, 0.0] },
        TexturedVertex { position: [x2, y2], uv: [1.0, 1.0] },
        TexturedVertex { position: [x1, y2], uv: [0.0, 1.0] },
    ]
}

/// Pipeline state shared by all layers
pub struct QuadPipeline {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    vertices: Vec<TexturedVertex>,
}

impl QuadPipeline {
    /// Base and popup
    pub const MAX_QUADS: usize = 2;
    const VERTICES_PER_QUAD: usize = 4;
    const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

    pub fn new(device: &Device, queue: &Queue, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Composite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[TexturedVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Layers map 1:1 onto surface pixels
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Vertex Buffer"),
            size: (Self::MAX_QUADS * Self::VERTICES_PER_QUAD * std::mem::size_of::<TexturedVertex>())
                as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Index data is padded to the 4-byte copy alignment
        let mut indices = Self::INDICES.to_vec();
        indices.resize(8, 0);
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Index Buffer"),
            size: (indices.len() * std::mem::size_of::<u16>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&index_buffer, 0, bytemuck::cast_slice(&indices));

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            vertices: Vec::with_capacity(Self::MAX_QUADS * Self::VERTICES_PER_QUAD),
        }
    }

    /// Bind group sampling `view` with this pipeline's sampler
    pub fn bind_group(&self, device: &Device, view: &TextureView) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Layer Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Draw `quads` in order, each as its texture placed at its rect
    pub fn render(
        &mut self,
        queue: &Queue,
        render_pass: &mut wgpu::RenderPass<'_>,
        view: ViewRect,
        quads: &[(&BindGroup, Rect)],
    ) {
        let quads = &quads[..quads.len().min(Self::MAX_QUADS)];
        if quads.is_empty() {
            return;
        }

        self.vertices.clear();
        for (_, rect) in quads {
            self.vertices.extend_from_slice(&quad_vertices(*rect, view));
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        for (i, (bind_group, _)) in quads.iter().enumerate() {
            render_pass.set_bind_group(0, *bind_group, &[]);
            let base_vertex = (i * Self::VERTICES_PER_QUAD) as i32;
            render_pass.draw_indexed(0..Self::INDICES.len() as u32, base_vertex, 0..1);
        }
    }
}
