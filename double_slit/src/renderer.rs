//! GPU drawing for the interactive window
//!
//! The density field is drawn as one instanced quad per (strided) grid cell
//! and the detector profile as a line list, both in world coordinates so the
//! camera can frame the physical extent directly.

use common::{Camera2D, CameraUniform, GraphicsContext};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::field::DensityField;
use crate::render::Colormap;

/// Instance data for one heatmap cell
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    pub position: [f32; 3],
    pub half_size: [f32; 2],
    pub color: [f32; 4],
}

impl CellInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        2 => Float32x3,  // position
        3 => Float32x2,  // half size
        4 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Unit quad corner
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Line vertex for profiles, frames and slit markers
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub type Segment = (Vec3, Vec3, [f32; 4]);

pub struct FieldRenderer {
    cell_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    cell_buffer: wgpu::Buffer,
    max_cells: usize,

    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    max_lines: usize,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent::OVER,
    }
}

impl FieldRenderer {
    pub fn new(ctx: &GraphicsContext, max_cells: usize, max_lines: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Field Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/field.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let cell_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_cell",
                buffers: &[QuadVertex::layout(), CellInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_color",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_line",
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_color",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let cell_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Instance Buffer"),
            size: (std::mem::size_of::<CellInstance>() * max_cells) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Buffer"),
            size: (std::mem::size_of::<LineVertex>() * max_lines * 2) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            cell_pipeline,
            quad_buffer,
            cell_buffer,
            max_cells,
            line_pipeline,
            line_buffer,
            max_lines,
            camera_buffer,
            camera_bind_group,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload cells; returns how many will be drawn
    pub fn update_cells(&self, queue: &wgpu::Queue, cells: &[CellInstance]) -> u32 {
        if cells.len() > self.max_cells {
            log::warn!("{} cells exceed the buffer of {}, dropping the rest", cells.len(), self.max_cells);
        }
        let data = &cells[..cells.len().min(self.max_cells)];
        queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(data));
        data.len() as u32
    }

    /// Upload segments; returns how many will be drawn
    pub fn update_lines(&self, queue: &wgpu::Queue, lines: &[Segment]) -> u32 {
        if lines.len() > self.max_lines {
            log::warn!("{} segments exceed the buffer of {}, dropping the rest", lines.len(), self.max_lines);
        }
        let vertices: Vec<LineVertex> = lines
            .iter()
            .take(self.max_lines)
            .flat_map(|(v1, v2, color)| {
                [
                    LineVertex {
                        position: [v1.x, v1.y, v1.z],
                        color: *color,
                    },
                    LineVertex {
                        position: [v2.x, v2.y, v2.z],
                        color: *color,
                    },
                ]
            })
            .collect();

        queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&vertices));
        (vertices.len() / 2) as u32
    }

    /// Cells then lines in one pass, clearing to the background first
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_cells: u32,
        num_lines: u32,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Field Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.08,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if num_cells > 0 {
            render_pass.set_pipeline(&self.cell_pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.cell_buffer.slice(..));
            render_pass.draw(0..6, 0..num_cells);
        }

        if num_lines > 0 {
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
            render_pass.draw(0..(num_lines * 2), 0..1);
        }
    }
}

/// Smallest sampling stride whose strided grid fits in `max_cells`
pub fn cell_stride(nx: usize, ny: usize, max_cells: usize) -> usize {
    let max_cells = max_cells.max(1);
    let count = |s: usize| nx.div_ceil(s) * ny.div_ceil(s);
    let mut stride = ((nx * ny) as f64 / max_cells as f64).sqrt().ceil().max(1.0) as usize;
    while stride > 1 && count(stride - 1) <= max_cells {
        stride -= 1;
    }
    while count(stride) > max_cells {
        stride += 1;
    }
    stride
}

/// Heatmap cells covering the field's extent, sampling every `stride`-th point
pub fn field_to_cells(field: &DensityField, clim: f64, colormap: Colormap, stride: usize) -> Vec<CellInstance> {
    let stride = stride.max(1);
    let grid = field.grid();
    let (x_min, x_max, y_min, y_max) = grid.extent();
    let (ny, nx) = field.shape();

    let cols: Vec<usize> = (0..nx).step_by(stride).collect();
    let rows: Vec<usize> = (0..ny).step_by(stride).collect();
    let half_w = ((x_max - x_min) / cols.len() as f64 / 2.0) as f32;
    let half_h = ((y_max - y_min) / rows.len() as f64 / 2.0) as f32;
    let scale = if clim > 0.0 { 1.0 / clim } else { 0.0 };

    let mut cells = Vec::with_capacity(cols.len() * rows.len());
    for &row in &rows {
        let y = grid.ys()[row] as f32;
        for &col in &cols {
            let x = grid.xs()[col] as f32;
            let v = field.get(row, col).unwrap_or(0.0);
            let rgb = colormap.map(v * scale).0;
            cells.push(CellInstance {
                position: [x, y, 0.0],
                half_size: [half_w, half_h],
                color: [
                    rgb[0] as f32 / 255.0,
                    rgb[1] as f32 / 255.0,
                    rgb[2] as f32 / 255.0,
                    1.0,
                ],
            });
        }
    }
    cells
}

/// Profile polyline over `xs`, scaled so `max_value` reaches `base + height`
pub fn profile_to_segments(
    xs: &[f64],
    profile: &[f64],
    base: f32,
    height: f32,
    max_value: f64,
    color: [f32; 4],
) -> Vec<Segment> {
    let scale = if max_value > 0.0 { height as f64 / max_value } else { 0.0 };
    let point = |i: usize| {
        let v = (profile[i] * scale).clamp(0.0, height as f64) as f32;
        Vec3::new(xs[i] as f32, base + v, 0.0)
    };
    let n = xs.len().min(profile.len());
    (1..n).map(|i| (point(i - 1), point(i), color)).collect()
}

/// Axis-aligned rectangle outline
pub fn frame_segments(min: (f32, f32), max: (f32, f32), color: [f32; 4]) -> Vec<Segment> {
    let a = Vec3::new(min.0, min.1, 0.0);
    let b = Vec3::new(max.0, min.1, 0.0);
    let c = Vec3::new(max.0, max.1, 0.0);
    let d = Vec3::new(min.0, max.1, 0.0);
    vec![(a, b, color), (b, c, color), (c, d, color), (d, a, color)]
}

/// Small cross at each emitter position
pub fn marker_segments(points: &[(f64, f64)], size: f32, color: [f32; 4]) -> Vec<Segment> {
    points
        .iter()
        .flat_map(|&(x, y)| {
            let (x, y) = (x as f32, y as f32);
            [
                (Vec3::new(x - size, y, 0.0), Vec3::new(x + size, y, 0.0), color),
                (Vec3::new(x, y - size, 0.0), Vec3::new(x, y + size, 0.0), color),
            ]
        })
        .collect()
}
