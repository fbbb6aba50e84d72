//! Textured-quad pipelines used by the verification draws.
//!
//! Two variants exist: one sampling a flat 2D texture, one sampling a cube
//! map with the face chosen by an integer selector uniform. Each is built
//! once per image-source pass and reused across that pass's cases.

use std::error::Error;
use std::ffi::CString;
use std::fmt;
use std::mem;
use std::ptr;

use crate::context::HarnessContext;
use crate::gl;

const QUAD_VERTEX_SHADER: &str = "
    #version 330 core

    layout(location = 0) in vec2 position;
    layout(location = 1) in vec2 tex_coord;

    out vec2 v_tex_coord;

    void main() {
        gl_Position = vec4(position, 0.0, 1.0);
        v_tex_coord = tex_coord;
    }
";

const FLAT_FRAGMENT_SHADER: &str = "
    #version 330 core

    uniform sampler2D tex;

    in vec2 v_tex_coord;
    out vec4 color;

    void main() {
        color = texture(tex, v_tex_coord);
    }
";

// Face directions follow the canonical +X, -X, +Y, -Y, +Z, -Z selector
// order; each maps the quad's texture coordinates onto the face so that
// row 0 of the uploaded image lands at sampling coordinate t = 0.
const CUBE_FRAGMENT_SHADER: &str = "
    #version 330 core

    uniform samplerCube tex;
    uniform int face;

    in vec2 v_tex_coord;
    out vec4 color;

    void main() {
        vec2 tc = 2.0 * v_tex_coord - 1.0;
        vec3 dir;
        if (face == 0)      dir = vec3( 1.0, -tc.y, -tc.x);
        else if (face == 1) dir = vec3(-1.0, -tc.y,  tc.x);
        else if (face == 2) dir = vec3( tc.x,  1.0,  tc.y);
        else if (face == 3) dir = vec3( tc.x, -1.0, -tc.y);
        else if (face == 4) dir = vec3( tc.x, -tc.y,  1.0);
        else                dir = vec3(-tc.x, -tc.y, -1.0);
        color = texture(tex, dir);
    }
";

// Full-viewport triangle strip; texture coordinate (0, 0) sits at the
// bottom-left corner of the surface.
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 16] = [
    // position     tex_coord
    -1.0, -1.0,     0.0, 0.0,
     1.0, -1.0,     1.0, 0.0,
    -1.0,  1.0,     0.0, 1.0,
     1.0,  1.0,     1.0, 1.0,
];

/// A linked textured-quad program together with its quad geometry.
pub struct QuadProgram {
    program: gl::types::GLuint,
    vao: gl::types::GLuint,
    vbo: gl::types::GLuint,
    face_location: Option<gl::types::GLint>,
}

impl QuadProgram {
    /// Builds the flat-sampling variant.
    pub fn textured_quad(ctx: &HarnessContext) -> Result<QuadProgram, ProgramCreationError> {
        QuadProgram::build(ctx, FLAT_FRAGMENT_SHADER, false)
    }

    /// Builds the cube-face-sampling variant.
    pub fn textured_quad_cube(ctx: &HarnessContext) -> Result<QuadProgram, ProgramCreationError> {
        QuadProgram::build(ctx, CUBE_FRAGMENT_SHADER, true)
    }

    fn build(
        ctx: &HarnessContext,
        fragment_source: &str,
        with_face_selector: bool,
    ) -> Result<QuadProgram, ProgramCreationError> {
        let gl = &ctx.gl;

        let vertex = compile_shader(gl, gl::VERTEX_SHADER, QUAD_VERTEX_SHADER)?;
        let fragment = match compile_shader(gl, gl::FRAGMENT_SHADER, fragment_source) {
            Ok(shader) => shader,
            Err(error) => {
                unsafe { gl.DeleteShader(vertex) };
                return Err(error);
            }
        };

        let program = link_program(gl, vertex, fragment);
        // shaders are owned by the program once linked
        unsafe {
            gl.DeleteShader(vertex);
            gl.DeleteShader(fragment);
        }
        let program = program?;

        let (vao, vbo) = unsafe { build_quad(gl) };

        let face_location = unsafe {
            gl.UseProgram(program);

            let sampler_name = CString::new("tex").unwrap();
            let sampler = gl.GetUniformLocation(program, sampler_name.as_ptr());
            gl.Uniform1i(sampler, 0);

            if with_face_selector {
                let face_name = CString::new("face").unwrap();
                Some(gl.GetUniformLocation(program, face_name.as_ptr()))
            } else {
                None
            }
        };

        Ok(QuadProgram {
            program,
            vao,
            vbo,
            face_location,
        })
    }

    /// Selects the cube face sampled by the next draw; no-op on the flat
    /// variant.
    pub fn set_face(&self, ctx: &HarnessContext, selector: i32) {
        if let Some(location) = self.face_location {
            unsafe {
                ctx.gl.UseProgram(self.program);
                ctx.gl.Uniform1i(location, selector);
            }
        }
    }

    /// Draws the full-viewport quad with this program.
    pub fn draw(&self, ctx: &HarnessContext) {
        unsafe {
            ctx.gl.UseProgram(self.program);
            ctx.gl.BindVertexArray(self.vao);
            ctx.gl.DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
        }
    }

    /// Releases the program and its geometry.
    pub fn destroy(self, ctx: &HarnessContext) {
        unsafe {
            ctx.gl.DeleteProgram(self.program);
            ctx.gl.DeleteBuffers(1, &self.vbo);
            ctx.gl.DeleteVertexArrays(1, &self.vao);
        }
    }
}

unsafe fn build_quad(gl: &gl::Gl) -> (gl::types::GLuint, gl::types::GLuint) {
    let mut vao = 0;
    gl.GenVertexArrays(1, &mut vao);
    gl.BindVertexArray(vao);

    let mut vbo = 0;
    gl.GenBuffers(1, &mut vbo);
    gl.BindBuffer(gl::ARRAY_BUFFER, vbo);
    gl.BufferData(
        gl::ARRAY_BUFFER,
        mem::size_of_val(&QUAD_VERTICES) as gl::types::GLsizeiptr,
        QUAD_VERTICES.as_ptr() as *const _,
        gl::STATIC_DRAW,
    );

    let stride = (4 * mem::size_of::<f32>()) as gl::types::GLsizei;
    gl.VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, stride, ptr::null());
    gl.EnableVertexAttribArray(0);
    gl.VertexAttribPointer(
        1,
        2,
        gl::FLOAT,
        gl::FALSE,
        stride,
        (2 * mem::size_of::<f32>()) as *const _,
    );
    gl.EnableVertexAttribArray(1);

    (vao, vbo)
}

fn compile_shader(
    gl: &gl::Gl,
    shader_type: gl::types::GLenum,
    source: &str,
) -> Result<gl::types::GLuint, ProgramCreationError> {
    unsafe {
        let shader = gl.CreateShader(shader_type);
        let source = CString::new(source).unwrap();
        let sources = [source.as_ptr()];
        gl.ShaderSource(shader, 1, sources.as_ptr(), ptr::null());
        gl.CompileShader(shader);

        let mut status = 0;
        gl.GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status == 0 {
            let log = shader_info_log(gl, shader);
            gl.DeleteShader(shader);
            return Err(ProgramCreationError::CompilationError(log));
        }

        Ok(shader)
    }
}

fn link_program(
    gl: &gl::Gl,
    vertex: gl::types::GLuint,
    fragment: gl::types::GLuint,
) -> Result<gl::types::GLuint, ProgramCreationError> {
    unsafe {
        let program = gl.CreateProgram();
        gl.AttachShader(program, vertex);
        gl.AttachShader(program, fragment);
        gl.LinkProgram(program);

        let mut status = 0;
        gl.GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status == 0 {
            let mut length = 0;
            gl.GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length);
            let mut log = vec![0u8; length.max(1) as usize];
            gl.GetProgramInfoLog(
                program,
                length,
                ptr::null_mut(),
                log.as_mut_ptr() as *mut _,
            );
            gl.DeleteProgram(program);
            return Err(ProgramCreationError::LinkingError(log_to_string(log)));
        }

        Ok(program)
    }
}

unsafe fn shader_info_log(gl: &gl::Gl, shader: gl::types::GLuint) -> String {
    let mut length = 0;
    gl.GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length);
    let mut log = vec![0u8; length.max(1) as usize];
    gl.GetShaderInfoLog(shader, length, ptr::null_mut(), log.as_mut_ptr() as *mut _);
    log_to_string(log)
}

fn log_to_string(mut log: Vec<u8>) -> String {
    if let Some(end) = log.iter().position(|&byte| byte == 0) {
        log.truncate(end);
    }
    String::from_utf8_lossy(&log).into_owned()
}

/// Error that can be triggered when creating a `QuadProgram`.
#[derive(Debug, Clone)]
pub enum ProgramCreationError {
    /// Error while compiling one of the shaders.
    CompilationError(String),
    /// Error while linking the program.
    LinkingError(String),
}

impl fmt::Display for ProgramCreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProgramCreationError::CompilationError(log) => {
                write!(formatter, "compilation error in one of the shaders: {}", log)
            }
            ProgramCreationError::LinkingError(log) => {
                write!(formatter, "error while linking shaders together: {}", log)
            }
        }
    }
}

impl Error for ProgramCreationError {}
