use bytemuck::{Pod, Zeroable};
use realm_common::{MeshData, TextureImage};
use realm_render::{
    BoundTexture, Material, MaterialId, MeshId, NodeId, RenderError, SceneBackend, SceneGraph,
    TextureSettings, TextureSlot, validate_mesh, validate_texture,
};
use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;
use crate::shaders;
use crate::textures::{self, GpuTexture};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct MaterialUniforms {
    base_color: [f32; 4],
    params: [f32; 4],
}

impl MaterialUniforms {
    pub(crate) fn from_material(material: &Material) -> Self {
        let [ru, rv] = material.uv_repeat();
        Self {
            base_color: material.base_color.extend(1.0).to_array(),
            params: [material.roughness, material.metalness, ru, rv],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// Interleave mesh attributes for the vertex buffer.
pub(crate) fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((&position, &normal), &uv)| Vertex {
            position,
            normal,
            uv,
        })
        .collect()
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    material: Material,
    uniform_buffer: wgpu::Buffer,
    /// Indexed like [`TextureSlot::ALL`]; `None` means the placeholder.
    textures: [Option<GpuTexture>; 3],
    bind_group: wgpu::BindGroup,
}

fn slot_index(slot: TextureSlot) -> usize {
    match slot {
        TextureSlot::Color => 0,
        TextureSlot::Normal => 1,
        TextureSlot::Roughness => 2,
    }
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MAX_INSTANCES: usize = 1024;

/// [`SceneBackend`] drawing to a window surface through wgpu.
pub struct WgpuBackend {
    gpu: GpuContext,
    scene: SceneGraph,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    placeholders: [GpuTexture; 3],
    meshes: Vec<GpuMesh>,
    materials: Vec<GpuMaterial>,
    instance_buffer: wgpu::Buffer,
    depth: wgpu::TextureView,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
                texture_entry(3),
                sampler_entry(4),
                texture_entry(5),
                sampler_entry(6),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("surface_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("surface_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SURFACE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("surface_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let placeholders = TextureSlot::ALL.map(|slot| textures::placeholder(device, &gpu.queue, slot));
        let (width, height) = gpu.size();
        let depth = create_depth_view(device, width, height);

        Self {
            gpu,
            scene: SceneGraph::new(),
            pipeline,
            frame_buffer,
            frame_bind_group,
            material_layout,
            placeholders,
            meshes: Vec::new(),
            materials: Vec::new(),
            instance_buffer,
            depth,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    fn frame_uniforms(&self, camera: NodeId) -> Result<FrameUniforms, RenderError> {
        let view_proj = self.scene.view_projection(camera)?;
        let eye = self.scene.world_matrix(camera)?.w_axis;
        let lights = self.scene.lights();
        Ok(FrameUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: eye.to_array(),
            sun_dir: lights.sun_direction.extend(0.0).to_array(),
            sun_color: lights.sun_color.extend(0.0).to_array(),
            ambient: lights.ambient.extend(0.0).to_array(),
        })
    }

    /// Draw the scene, then let `overlay` record extra passes (a HUD, say)
    /// into the same encoder before presenting.
    pub fn draw_frame_with<F>(&mut self, camera: NodeId, overlay: F)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let uniforms = match self.frame_uniforms(camera) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("frame skipped: {e}");
                return;
            }
        };
        let Some(frame) = self.gpu.acquire() else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let queue = &self.gpu.queue;
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut instances = self.scene.mesh_instances();
        if instances.len() > MAX_INSTANCES {
            tracing::warn!(
                count = instances.len(),
                "too many mesh instances, drawing the first {MAX_INSTANCES}"
            );
            instances.truncate(MAX_INSTANCES);
        }
        let instance_data: Vec<InstanceData> = instances
            .iter()
            .map(|(_, _, _, model)| InstanceData {
                model: model.to_cols_array_2d(),
            })
            .collect();
        if !instance_data.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instance_data));
        }

        let bg = self.scene.background();
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, (node, mesh, material, _)) in instances.iter().enumerate() {
                let (Some(gpu_mesh), Some(gpu_material)) = (
                    self.meshes.get(mesh.0 as usize),
                    self.materials.get(material.0 as usize),
                ) else {
                    tracing::warn!(node = node.0, "mesh node references unknown resources");
                    continue;
                };
                let i = i as u32;
                pass.set_bind_group(1, &gpu_material.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, i..i + 1);
            }
        }

        overlay(&self.gpu.device, queue, &mut encoder, &view);

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

impl SceneBackend for WgpuBackend {
    fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    fn add_mesh(&mut self, mesh: &MeshData) -> Result<MeshId, RenderError> {
        validate_mesh(mesh)?;
        let device = &self.gpu.device;
        let vertices = interleave(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        });
        tracing::debug!(
            mesh = id.0,
            vertices = vertices.len(),
            triangles = mesh.triangle_count(),
            "mesh uploaded"
        );
        Ok(id)
    }

    fn add_material(&mut self, material: Material) -> MaterialId {
        let uniform_buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("material_uniforms"),
                contents: bytemuck::bytes_of(&MaterialUniforms::from_material(&material)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let textures = [None, None, None];
        let bind_group = material_bind_group(
            &self.gpu.device,
            &self.material_layout,
            &self.placeholders,
            &uniform_buffer,
            &textures,
        );
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(GpuMaterial {
            material,
            uniform_buffer,
            textures,
            bind_group,
        });
        id
    }

    fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize).map(|m| &m.material)
    }

    fn bind_texture(
        &mut self,
        material: MaterialId,
        slot: TextureSlot,
        image: &TextureImage,
        settings: TextureSettings,
    ) -> Result<(), RenderError> {
        validate_texture(image)?;
        let max_anisotropy = self.max_anisotropy();
        let entry = self
            .materials
            .get_mut(material.0 as usize)
            .ok_or(RenderError::UnknownMaterial(material))?;
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;

        let texture = textures::upload(device, queue, slot, image, &settings, max_anisotropy);
        entry.textures[slot_index(slot)] = Some(texture);
        entry.material.textures.insert(
            slot,
            BoundTexture {
                width: image.width,
                height: image.height,
                settings,
            },
        );
        queue.write_buffer(
            &entry.uniform_buffer,
            0,
            bytemuck::bytes_of(&MaterialUniforms::from_material(&entry.material)),
        );
        entry.bind_group = material_bind_group(
            device,
            &self.material_layout,
            &self.placeholders,
            &entry.uniform_buffer,
            &entry.textures,
        );
        tracing::debug!(
            material = material.0,
            slot = slot.name(),
            width = image.width,
            height = image.height,
            "texture bound"
        );
        Ok(())
    }

    fn max_anisotropy(&self) -> u16 {
        self.gpu.max_anisotropy()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (w, h) = self.gpu.size();
        self.depth = create_depth_view(&self.gpu.device, w, h);
    }

    fn draw_frame(&mut self, camera: NodeId) {
        self.draw_frame_with(camera, |_, _, _, _| {});
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    placeholders: &[GpuTexture; 3],
    uniform: &wgpu::Buffer,
    textures: &[Option<GpuTexture>; 3],
) -> wgpu::BindGroup {
    let pick = |i: usize| textures[i].as_ref().unwrap_or(&placeholders[i]);
    let (color, normal, roughness) = (pick(0), pick(1), pick(2));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("material_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&color.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&color.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&normal.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: wgpu::BindingResource::TextureView(&roughness.view),
            },
            wgpu::BindGroupEntry {
                binding: 6,
                resource: wgpu::BindingResource::Sampler(&roughness.sampler),
            },
        ],
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
