use std::collections::HashMap;

use glow::HasContext;
use image::RgbaImage;

use decal_studio_lib::viewport::camera::ArcBallCamera;
use decal_studio_lib::viewport::mesh::{MeshData, VERTEX_STRIDE};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    /// Background color RGB
    pub bg_color: [u8; 3],
    /// Garment base color factor
    pub base_color: [f32; 4],
}

/// Per-frame snapshot of one decal to draw
pub struct DecalDraw {
    pub id: String,
    /// Upload key: the GPU copy is refreshed when this changes
    pub revision: u64,
    pub mesh: MeshData,
    pub canvas: RgbaImage,
    pub opacity: f32,
}

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuDecal {
    revision: u64,
    mesh: GpuMesh,
    texture: glow::Texture,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    garment: Option<GpuMesh>,
    garment_version: u64,
    /// Decal meshes and textures keyed by item id
    decals: HashMap<String, GpuDecal>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Self {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG);
        Self {
            mesh_program,
            garment: None,
            garment_version: 0,
            decals: HashMap::new(),
        }
    }

    /// Upload the garment mesh when its version changes
    pub fn sync_garment(&mut self, gl: &glow::Context, mesh: Option<&MeshData>, version: u64) {
        if version == self.garment_version && self.garment.is_some() == mesh.is_some() {
            return;
        }
        self.garment_version = version;

        if let Some(old) = self.garment.take() {
            delete_mesh(gl, &old);
        }
        if let Some(data) = mesh {
            self.garment = Some(upload_mesh(gl, data));
        }
    }

    /// Upload changed decals and drop GPU copies of removed items
    pub fn sync_decals(&mut self, gl: &glow::Context, draws: &[DecalDraw]) {
        // Remove decals that no longer exist
        let live: Vec<String> = draws.iter().map(|d| d.id.clone()).collect();
        let stale: Vec<String> = self
            .decals
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(old) = self.decals.remove(&id) {
                delete_mesh(gl, &old.mesh);
                unsafe { gl.delete_texture(old.texture) };
            }
        }

        for draw in draws {
            let up_to_date = self
                .decals
                .get(&draw.id)
                .is_some_and(|d| d.revision == draw.revision);
            if up_to_date {
                continue;
            }
            if let Some(old) = self.decals.remove(&draw.id) {
                delete_mesh(gl, &old.mesh);
                unsafe { gl.delete_texture(old.texture) };
            }
            if draw.mesh.is_empty() {
                continue;
            }
            self.decals.insert(
                draw.id.clone(),
                GpuDecal {
                    revision: draw.revision,
                    mesh: upload_mesh(gl, &draw.mesh),
                    texture: upload_texture(gl, &draw.canvas),
                },
            );
        }
    }

    /// Render the garment and its decals
    pub fn paint(
        &self,
        gl: &glow::Context,
        camera: &ArcBallCamera,
        params: &RenderParams,
        draws: &[DecalDraw],
    ) {
        let aspect = params.viewport[2] / params.viewport[3];
        let vp = camera.view_projection(aspect);

        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            gl.use_program(Some(self.mesh_program));
            set_uniform_mat4(gl, self.mesh_program, "u_mvp", &vp);

            // Light direction in world space
            let light_dir = glam::Vec3::new(0.3, 0.8, 0.5).normalize();
            set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);

            // Garment: opaque, base color, no texture
            if let Some(ref garment) = self.garment {
                set_uniform_vec4(gl, self.mesh_program, "u_color", &params.base_color);
                set_uniform_i32(gl, self.mesh_program, "u_use_texture", 0);
                draw_mesh(gl, garment);
            }

            // Decals: textured, blended, pulled toward the camera so
            // they win the depth fight against the garment surface
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.enable(glow::POLYGON_OFFSET_FILL);
            gl.polygon_offset(-4.0, -4.0);
            gl.depth_mask(false);

            set_uniform_i32(gl, self.mesh_program, "u_use_texture", 1);
            set_uniform_i32(gl, self.mesh_program, "u_texture", 0);
            gl.active_texture(glow::TEXTURE0);

            for draw in draws {
                if let Some(decal) = self.decals.get(&draw.id) {
                    set_uniform_vec4(
                        gl,
                        self.mesh_program,
                        "u_color",
                        &[1.0, 1.0, 1.0, draw.opacity],
                    );
                    gl.bind_texture(glow::TEXTURE_2D, Some(decal.texture));
                    draw_mesh(gl, &decal.mesh);
                }
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.depth_mask(true);
            gl.disable(glow::POLYGON_OFFSET_FILL);
            gl.disable(glow::BLEND);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    #[allow(dead_code)]
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
        }
        if let Some(ref garment) = self.garment {
            delete_mesh(gl, garment);
        }
        for decal in self.decals.values() {
            delete_mesh(gl, &decal.mesh);
            unsafe { gl.delete_texture(decal.texture) };
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> GpuMesh {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // uv: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        GpuMesh {
            vao,
            _vbo: vbo,
            ibo,
            index_count: data.indices.len() as i32,
        }
    }
}

fn upload_texture(gl: &glow::Context, canvas: &RgbaImage) -> glow::Texture {
    unsafe {
        let texture = gl.create_texture().unwrap();
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            canvas.width() as i32,
            canvas.height() as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(canvas.as_raw())),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        texture
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh._vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> glow::Program {
    unsafe {
        let program = gl.create_program().unwrap();

        let vert = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        program
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_vec4(gl: &glow::Context, program: glow::Program, name: &str, v: &[f32; 4]) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_4_f32(loc.as_ref(), v[0], v[1], v[2], v[3]);
    }
}

fn set_uniform_i32(gl: &glow::Context, program: glow::Program, name: &str, v: i32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_i32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

out vec3 v_normal;
out vec2 v_uv;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = a_normal;
    v_uv = a_uv;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform vec4 u_color;
uniform bool u_use_texture;
uniform sampler2D u_texture;

in vec3 v_normal;
in vec2 v_uv;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    float ambient = 0.25;
    float light = ambient + diffuse * 0.75;

    vec4 base = u_color;
    if (u_use_texture) {
        // Canvas rows are top-down; flip V for GL sampling
        vec4 texel = texture(u_texture, vec2(v_uv.x, 1.0 - v_uv.y));
        base = vec4(texel.rgb, texel.a * u_color.a);
    }
    frag_color = vec4(base.rgb * light, base.a);
}
"#;
