use crate::camera::PerspectiveCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use roadster_common::{Color, Transform};
use roadster_render::{FrameView, Scene};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: Color) -> Self {
        let cols = model.to_cols_array_2d();
        let [r, g, b] = color.to_linear_f32();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
        }
    }
}

const GROUND_INSTANCE: u32 = 0;
const CAR_INSTANCE: u32 = 1;
const INSTANCE_COUNT: u32 = 2;

/// Unit cube centred on the origin.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-p, -p, p], [p, -p, p], [p, p, p], [-p, p, p]]),
        ([0.0, 0.0, -1.0], [[p, -p, -p], [-p, -p, -p], [-p, p, -p], [p, p, -p]]),
        ([1.0, 0.0, 0.0], [[p, -p, p], [p, -p, -p], [p, p, -p], [p, p, p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p, p], [-p, p, p], [-p, p, -p]]),
        ([0.0, 1.0, 0.0], [[-p, p, p], [p, p, p], [p, p, -p], [-p, p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [p, -p, -p], [p, -p, p], [-p, -p, p]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corners.map(|position| Vertex { position, normal }));
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// Unit quad in the XZ plane, facing +Y.
fn plane_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let normal = [0.0, 1.0, 0.0];
    let vertices = [[-p, 0.0, p], [p, 0.0, p], [p, 0.0, -p], [-p, 0.0, -p]]
        .map(|position| Vertex { position, normal })
        .to_vec();
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    fn upload(device: &wgpu::Device, name: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_vertex_buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_index_buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Model matrix of the car body: the simulation transform with the box
/// dimensions folded into the scale.
fn car_model(car: &Transform, size: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(car.scale * size, car.rotation, car.position)
}

fn ground_model(scene: &Scene) -> Mat4 {
    Mat4::from_scale(Vec3::new(scene.ground.width, 1.0, scene.ground.depth))
}

fn light_uniforms(scene: &Scene) -> ([f32; 4], [f32; 4], [f32; 4]) {
    let dir = scene.sun.direction();
    let sun = scene.sun.color.to_linear_f32().map(|c| c * scene.sun.intensity);
    let amb = scene
        .ambient
        .color
        .to_linear_f32()
        .map(|c| c * scene.ambient.intensity);
    (
        [dir.x, dir.y, dir.z, 0.0],
        [sun[0], sun[1], sun[2], 1.0],
        [amb[0], amb[1], amb[2], 1.0],
    )
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube: Mesh,
    plane: Mesh,
    instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    scene: Scene,
}

impl WgpuRenderer {
    /// Upload the static scene. Only the car instance and the camera change
    /// afterwards.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: Scene,
    ) -> Self {
        let (light_dir, light_color, ambient) = light_uniforms(&scene);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light_dir,
                light_color,
                ambient,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lambert_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LAMBERT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lambert_pipeline"),
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
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
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
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube = Mesh::upload(device, "cube", &cube_verts, &cube_indices);
        let (plane_verts, plane_indices) = plane_mesh();
        let plane = Mesh::upload(device, "plane", &plane_verts, &plane_indices);

        let instances = [
            InstanceData::new(ground_model(&scene), scene.ground.color),
            InstanceData::new(
                car_model(&Transform::default(), scene.car.size),
                scene.car.color,
            ),
        ];
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(
            background = %scene.background,
            ground = %scene.ground.color,
            car = %scene.car.color,
            "scene uploaded"
        );

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube,
            plane,
            instance_buffer,
            depth_texture,
            scene,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: ground plane, then the car at the frame's transform.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &PerspectiveCamera,
        frame: &FrameView,
    ) {
        let vp = camera.view_projection(&frame.camera);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&vp.to_cols_array_2d()),
        );

        let car = InstanceData::new(
            car_model(&frame.car, self.scene.car.size),
            self.scene.car.color,
        );
        queue.write_buffer(
            &self.instance_buffer,
            u64::from(CAR_INSTANCE) * std::mem::size_of::<InstanceData>() as u64,
            bytemuck::bytes_of(&car),
        );

        let [r, g, b] = self.scene.background.to_linear_f32();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for (mesh, instance) in [(&self.plane, GROUND_INSTANCE), (&self.cube, CAR_INSTANCE)] {
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
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
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_is_closed_unit_box() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        for v in &verts {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let (verts, indices) = cube_mesh();
        for tri in indices.chunks(3) {
            let [a, b, c] =
                [tri[0], tri[1], tri[2]].map(|i| Vec3::from(verts[i as usize].position));
            let n = (b - a).cross(c - a).normalize();
            let expected = Vec3::from(verts[tri[0] as usize].normal);
            assert!((n - expected).length() < 1e-5);
        }
    }

    #[test]
    fn plane_faces_up() {
        let (verts, indices) = plane_mesh();
        let [a, b, c] =
            [indices[0], indices[1], indices[2]].map(|i| Vec3::from(verts[i as usize].position));
        let n = (b - a).cross(c - a).normalize();
        assert!((n - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn car_model_scales_unit_cube_to_car_size() {
        let t = Transform::from_position_yaw(Vec3::new(1.0, 0.5, 2.0), 0.0);
        let m = car_model(&t, Vec3::new(2.0, 1.0, 4.0));
        let corner = m.transform_point3(Vec3::splat(0.5));
        assert!((corner - Vec3::new(2.0, 1.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn uniforms_layout_is_std140_friendly() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 112);
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
    }

    #[test]
    fn light_uniforms_scale_by_intensity() {
        let (dir, sun, amb) = light_uniforms(&Scene::default());
        assert!((Vec3::new(dir[0], dir[1], dir[2]).length() - 1.0).abs() < 1e-5);
        assert!((sun[0] - 1.0).abs() < 1e-5);
        assert!((amb[0] - 0.4).abs() < 1e-5);
    }
}
