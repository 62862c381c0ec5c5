//! wgpu backend for [`GraphicsApi`].
//!
//! Immediate-mode calls map onto wgpu as follows:
//! - buffers and textures live in id-keyed tables
//! - vertex layouts are kept as descriptions and baked into pipelines
//! - every `draw` records its own render pass into the current frame target
//!   with `LoadOp::Load` and submits it, so buffer writes issued between two
//!   draws are ordered correctly on the queue
//!
//! Pipelines are cached per (program, topology, layout).

use std::cell::RefCell;
use std::collections::HashMap;

use super::api::{
    AttribFormat, BufferKind, BufferUsage, DrawCall, GraphicsApi, Program, ResourceId, TEXTURE_UNITS, Topology,
    VertexLayoutDesc,
};
use super::shaders::{SAMPLER_BINDING, ShaderRegistry};

type PipelineKey = (Program, Topology, ResourceId);

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
    /// CPU copy of the contents, `padded_size` long. Short or unaligned writes
    /// are widened from it so neighbouring bytes survive.
    shadow: Vec<u8>,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct State {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    target: Option<wgpu::TextureView>,

    shaders: ShaderRegistry,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    fallback: GpuTexture,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    buffers: HashMap<ResourceId, GpuBuffer>,
    layouts: HashMap<ResourceId, VertexLayoutDesc>,
    textures: HashMap<ResourceId, GpuTexture>,
    units: [ResourceId; TEXTURE_UNITS as usize],
    next_id: ResourceId,
}

/// Graphics backend drawing through wgpu into the frame target set by the runtime.
pub struct WgpuApi {
    state: RefCell<State>,
}

fn padded_size(size: u64) -> u64 {
    size.max(wgpu::COPY_BUFFER_ALIGNMENT).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

/// Copies `bytes` into `shadow` at `offset` and returns the enclosing
/// `COPY_BUFFER_ALIGNMENT`-aligned range to upload, or `None` if the write
/// does not fit. `shadow.len()` must be a multiple of the alignment.
fn aligned_write<'a>(shadow: &'a mut [u8], offset: u64, bytes: &[u8]) -> Option<(u64, &'a [u8])> {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    let end = offset.checked_add(bytes.len() as u64)?;
    if end > shadow.len() as u64 {
        return None;
    }
    shadow[offset as usize..end as usize].copy_from_slice(bytes);

    let start = offset - offset % align;
    let end = end.next_multiple_of(align).min(shadow.len() as u64);
    Some((start, &shadow[start as usize..end as usize]))
}

fn vertex_format(format: AttribFormat) -> wgpu::VertexFormat {
    match format {
        AttribFormat::Float32 => wgpu::VertexFormat::Float32,
        AttribFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttribFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        AttribFormat::Uint32 => wgpu::VertexFormat::Uint32,
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
    }
}

fn create_rgba_texture(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, rgba: &[u8]) -> GpuTexture {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("rasterkit texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_rgba(queue, &texture, width, height, rgba);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view, width, height }
}

fn write_rgba(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, rgba: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
}

impl WgpuApi {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..TEXTURE_UNITS)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rasterkit texture units bgl"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rasterkit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("rasterkit nearest sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let fallback = create_rgba_texture(device, queue, 1, 1, &[255; 4]);

        Self {
            state: RefCell::new(State {
                device: device.clone(),
                queue: queue.clone(),
                format,
                target: None,
                shaders: ShaderRegistry::new(device),
                bind_group_layout,
                pipeline_layout,
                sampler,
                fallback,
                pipelines: HashMap::new(),
                buffers: HashMap::new(),
                layouts: HashMap::new(),
                textures: HashMap::new(),
                units: [0; TEXTURE_UNITS as usize],
                next_id: 0,
            }),
        }
    }

    /// Points subsequent draws at `view`. `None` drops draws until a new target is set.
    pub fn set_target(&self, view: Option<wgpu::TextureView>) {
        self.state.borrow_mut().target = view;
    }
}

impl State {
    fn alloc_id(&mut self) -> ResourceId {
        self.next_id += 1;
        self.next_id
    }

    fn new_buffer(&self, kind: BufferKind, size: u64) -> wgpu::Buffer {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(match kind {
                BufferKind::Vertex => "rasterkit vbo",
                BufferKind::Index => "rasterkit ibo",
            }),
            size: padded_size(size),
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) -> bool {
        if self.pipelines.contains_key(&key) {
            return true;
        }
        let (program, topology, layout_id) = key;
        let Some(desc) = self.layouts.get(&layout_id) else {
            log::error!("WgpuApi: draw with unknown vertex layout {layout_id}");
            return false;
        };
        let Some(module) = self.shaders.module(program) else {
            log::error!("WgpuApi: no shader module for {program:?}");
            return false;
        };

        let attributes: Vec<wgpu::VertexAttribute> = desc
            .attribs
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: vertex_format(a.format),
                offset: a.offset as u64,
                shader_location: a.location,
            })
            .collect();

        let strip_index_format = match topology {
            Topology::TriangleStrip => Some(wgpu::IndexFormat::Uint16),
            Topology::Triangles | Topology::Lines => None,
        };

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("rasterkit pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: desc.stride as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(topology),
                strip_index_format,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("WgpuApi: built pipeline {program:?}/{topology:?} for layout {layout_id}");
        self.pipelines.insert(key, pipeline);
        true
    }

    fn bind_group(&self) -> wgpu::BindGroup {
        let mut entries: Vec<wgpu::BindGroupEntry<'_>> = self
            .units
            .iter()
            .zip(0u32..)
            .map(|(id, binding)| {
                let view = self.textures.get(id).map_or(&self.fallback.view, |t| &t.view);
                wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::TextureView(view),
                }
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rasterkit texture units"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

impl GraphicsApi for WgpuApi {
    fn create_buffer(&self, kind: BufferKind, _usage: BufferUsage, size: u64) -> ResourceId {
        let mut state = self.state.borrow_mut();
        let buffer = state.new_buffer(kind, size);
        let id = state.alloc_id();
        let shadow = vec![0; padded_size(size) as usize];
        state.buffers.insert(id, GpuBuffer { buffer, kind, shadow });
        id
    }

    fn reallocate_buffer(&self, id: ResourceId, size: u64) {
        let mut state = self.state.borrow_mut();
        let Some(kind) = state.buffers.get(&id).map(|b| b.kind) else {
            log::error!("WgpuApi: reallocate of unknown buffer {id}");
            return;
        };
        let buffer = state.new_buffer(kind, size);
        let shadow = vec![0; padded_size(size) as usize];
        state.buffers.insert(id, GpuBuffer { buffer, kind, shadow });
    }

    fn write_buffer(&self, id: ResourceId, offset: u64, bytes: &[u8]) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(buf) = state.buffers.get_mut(&id) else {
            log::error!("WgpuApi: write to unknown buffer {id}");
            return;
        };
        if bytes.is_empty() {
            return;
        }
        match aligned_write(&mut buf.shadow, offset, bytes) {
            Some((start, data)) => state.queue.write_buffer(&buf.buffer, start, data),
            None => log::error!("WgpuApi: write of {} bytes at {offset} overflows buffer {id}", bytes.len()),
        }
    }

    fn clear_buffer(&self, id: ResourceId) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(buf) = state.buffers.get_mut(&id) else {
            log::error!("WgpuApi: clear of unknown buffer {id}");
            return;
        };
        buf.shadow.fill(0);
        state.queue.write_buffer(&buf.buffer, 0, &buf.shadow);
    }

    fn release_buffer(&self, id: ResourceId) {
        if self.state.borrow_mut().buffers.remove(&id).is_none() {
            log::error!("WgpuApi: release of unknown buffer {id}");
        }
    }

    fn create_vertex_layout(&self, desc: &VertexLayoutDesc) -> ResourceId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.layouts.insert(id, desc.clone());
        id
    }

    fn release_vertex_layout(&self, id: ResourceId) {
        let mut state = self.state.borrow_mut();
        if state.layouts.remove(&id).is_none() {
            log::error!("WgpuApi: release of unknown vertex layout {id}");
            return;
        }
        state.pipelines.retain(|(_, _, layout), _| *layout != id);
    }

    fn create_texture(&self, width: u32, height: u32, rgba: &[u8]) -> ResourceId {
        let mut state = self.state.borrow_mut();
        let texture = create_rgba_texture(&state.device, &state.queue, width, height, rgba);
        let id = state.alloc_id();
        state.textures.insert(id, texture);
        id
    }

    fn update_texture(&self, id: ResourceId, width: u32, height: u32, rgba: &[u8]) {
        let state = self.state.borrow();
        let Some(tex) = state.textures.get(&id) else {
            log::error!("WgpuApi: update of unknown texture {id}");
            return;
        };
        if (tex.width, tex.height) != (width, height) {
            log::error!(
                "WgpuApi: update of texture {id} with {width}x{height}, created as {}x{}",
                tex.width,
                tex.height
            );
            return;
        }
        write_rgba(&state.queue, &tex.texture, width, height, rgba);
    }

    fn release_texture(&self, id: ResourceId) {
        let mut state = self.state.borrow_mut();
        if state.textures.remove(&id).is_none() {
            log::error!("WgpuApi: release of unknown texture {id}");
            return;
        }
        for unit in state.units.iter_mut().filter(|u| **u == id) {
            *unit = 0;
        }
    }

    fn bind_texture(&self, unit: u32, id: ResourceId) {
        let mut state = self.state.borrow_mut();
        match state.units.get_mut(unit as usize) {
            Some(slot) => *slot = id,
            None => log::error!("WgpuApi: texture unit {unit} out of range"),
        }
    }

    fn use_program(&self, program: Program) {
        if self.state.borrow_mut().shaders.activate(program) {
            log::trace!("WgpuApi: program {program:?}");
        }
    }

    fn draw(&self, call: &DrawCall) {
        if call.count == 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        let Some(target) = state.target.clone() else {
            log::debug!("WgpuApi: draw without a frame target, skipped");
            return;
        };
        if state.shaders.active() != Some(call.program) {
            log::warn!("WgpuApi: draw with {:?} while {:?} is active", call.program, state.shaders.active());
        }
        let key = (call.program, call.topology, call.layout);
        if !state.ensure_pipeline(key) {
            return;
        }

        let state = &*state;
        let Some(pipeline) = state.pipelines.get(&key) else { return };
        let Some(vbo) = state.buffers.get(&call.vertices) else {
            log::error!("WgpuApi: draw with unknown vertex buffer {}", call.vertices);
            return;
        };
        let ibo = match call.indices {
            Some(id) => match state.buffers.get(&id) {
                Some(b) => Some(b),
                None => {
                    log::error!("WgpuApi: draw with unknown index buffer {id}");
                    return;
                }
            },
            None => None,
        };
        let bind_group = state.bind_group();

        let mut encoder = state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rasterkit draw encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rasterkit draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_vertex_buffer(0, vbo.buffer.slice(..));
            match ibo {
                Some(ibo) => {
                    rpass.set_index_buffer(ibo.buffer.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..call.count, 0, 0..1);
                }
                None => rpass.draw(0..call.count, 0..1),
            }
        }
        state.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_size_rounds_up_to_alignment() {
        assert_eq!(padded_size(0), 4);
        assert_eq!(padded_size(6), 8);
        assert_eq!(padded_size(16), 16);
    }

    #[test]
    fn short_write_keeps_neighbouring_bytes() {
        let mut shadow = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let (start, data) = aligned_write(&mut shadow, 2, &[9, 9]).unwrap();
        assert_eq!(start, 0);
        assert_eq!(data, &[1, 2, 9, 9]);
        assert_eq!(shadow, [1, 2, 9, 9, 5, 6, 7, 8]);
    }

    #[test]
    fn single_u16_at_odd_index_uploads_its_word() {
        let mut shadow: Vec<u8> = [1u16, 2, 3, 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let (start, data) = aligned_write(&mut shadow, 2, &9u16.to_ne_bytes()).unwrap();
        assert_eq!(start, 0);
        let expected: Vec<u8> = [1u16, 9].iter().flat_map(|v| v.to_ne_bytes()).collect();
        assert_eq!(data, expected.as_slice());
    }

    #[test]
    fn straddling_write_widens_both_ends() {
        let mut shadow = vec![0; 12];
        let (start, data) = aligned_write(&mut shadow, 3, &[7, 7]).unwrap();
        assert_eq!(start, 0);
        assert_eq!(data, &[0, 0, 0, 7, 7, 0, 0, 0]);
    }

    #[test]
    fn write_at_tail_stays_inside_shadow() {
        let mut shadow = vec![0; 8];
        let (start, data) = aligned_write(&mut shadow, 6, &[5, 5]).unwrap();
        assert_eq!(start, 4);
        assert_eq!(data, &[0, 0, 5, 5]);
    }

    #[test]
    fn overflowing_write_is_rejected_untouched() {
        let mut shadow = vec![0; 8];
        assert!(aligned_write(&mut shadow, 6, &[1, 2, 3]).is_none());
        assert!(aligned_write(&mut shadow, u64::MAX, &[1]).is_none());
        assert_eq!(shadow, [0; 8]);
    }
}
