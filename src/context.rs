//! Harness-owned GL context and verification surface.
//!
//! The context is created against a hidden window; rendering and readback
//! go through an offscreen renderbuffer-backed framebuffer so results do
//! not depend on window visibility or pixel ownership.

use std::error::Error;
use std::ffi::CString;
use std::fmt;
use std::num::NonZeroU32;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use crate::gl;

/// Side length in pixels of the square verification surface.
pub const SURFACE_SIZE: u32 = 128;

/// The GL context, function pointers and offscreen surface of one run.
pub struct HarnessContext {
    /// Loaded GL entry points.
    pub gl: gl::Gl,
    framebuffer: gl::types::GLuint,
    renderbuffer: gl::types::GLuint,
    // Kept alive for the lifetime of the run and torn down in field
    // order: surface and context before the window, the never-pumped
    // event loop last.
    _surface: Surface<WindowSurface>,
    _context: PossiblyCurrentContext,
    _window: Window,
    _event_loop: EventLoop<()>,
}

impl HarnessContext {
    /// Creates a hidden window, a current GL 3.3 core context and the
    /// offscreen verification surface.
    pub fn new() -> Result<HarnessContext, ContextCreationError> {
        let event_loop = build_event_loop();

        let window_builder = WindowBuilder::new()
            .with_title("texconform")
            .with_inner_size(PhysicalSize::new(SURFACE_SIZE, SURFACE_SIZE))
            .with_visible(false);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(&event_loop, ConfigTemplateBuilder::new(), |mut configs| {
                configs.next().unwrap()
            })
            .map_err(|error| ContextCreationError::Display(error.to_string()))?;
        let window = window
            .ok_or_else(|| ContextCreationError::Display("no window was created".to_owned()))?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));
        let not_current_context = unsafe {
            gl_config
                .display()
                .create_context(&gl_config, &context_attributes)
                .map_err(ContextCreationError::Context)?
        };

        let (width, height): (u32, u32) = window.inner_size().into();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width.max(1)).unwrap(),
            NonZeroU32::new(height.max(1)).unwrap(),
        );
        let surface = unsafe {
            gl_config
                .display()
                .create_window_surface(&gl_config, &attrs)
                .map_err(ContextCreationError::Surface)?
        };
        let context = not_current_context
            .make_current(&surface)
            .map_err(ContextCreationError::MakeCurrent)?;

        let gl = gl::Gl::load_with(|symbol| {
            let symbol = CString::new(symbol).unwrap();
            gl_config.display().get_proc_address(symbol.as_c_str()) as *const _
        });

        let (framebuffer, renderbuffer) = unsafe { build_offscreen_surface(&gl)? };

        Ok(HarnessContext {
            gl,
            framebuffer,
            renderbuffer,
            _surface: surface,
            _context: context,
            _window: window,
            _event_loop: event_loop,
        })
    }

    /// Dimensions of the verification surface.
    pub fn dimensions(&self) -> (u32, u32) {
        (SURFACE_SIZE, SURFACE_SIZE)
    }

    /// Binds the verification surface for drawing and readback.
    pub fn bind_surface(&self) {
        unsafe {
            self.gl.BindFramebuffer(gl::FRAMEBUFFER, self.framebuffer);
            self.gl
                .Viewport(0, 0, SURFACE_SIZE as i32, SURFACE_SIZE as i32);
        }
    }

    /// Clears the verification surface to `color` with all channels
    /// writable.
    pub fn clear_surface(&self, color: [f32; 4]) {
        self.bind_surface();
        unsafe {
            self.gl.ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
            self.gl.ClearColor(color[0], color[1], color[2], color[3]);
            self.gl.Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// Reads an RGBA8 rectangle back from the verification surface.
    ///
    /// Coordinates are GL window coordinates: the origin is the bottom-left
    /// corner and the first returned row is the lowest one.
    pub fn read_rect(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; width as usize * height as usize * 4];

        self.bind_surface();
        unsafe {
            self.gl.PixelStorei(gl::PACK_ALIGNMENT, 1);
            self.gl.ReadPixels(
                x as gl::types::GLint,
                y as gl::types::GLint,
                width as gl::types::GLsizei,
                height as gl::types::GLsizei,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                data.as_mut_ptr() as *mut _,
            );
        }

        data
    }

    /// Creates a fresh texture object.
    pub fn gen_texture(&self) -> gl::types::GLuint {
        let mut texture = 0;
        unsafe {
            self.gl.GenTextures(1, &mut texture);
        }
        texture
    }

    /// Deletes a texture object once its verification pass is done.
    pub fn delete_texture(&self, texture: gl::types::GLuint) {
        unsafe {
            self.gl.DeleteTextures(1, &texture);
        }
    }

    /// Drains the GL error queue, returning the first pending error.
    pub fn pending_error(&self) -> Option<gl::types::GLenum> {
        let first = unsafe { self.gl.GetError() };
        if first == gl::NO_ERROR {
            return None;
        }

        // drain so a later query starts from a clean queue
        while unsafe { self.gl.GetError() } != gl::NO_ERROR {}

        Some(first)
    }
}

impl Drop for HarnessContext {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteFramebuffers(1, &self.framebuffer);
            self.gl.DeleteRenderbuffers(1, &self.renderbuffer);
        }
    }
}

fn build_event_loop() -> EventLoop<()> {
    let mut builder = EventLoopBuilder::new();

    // Harness contexts are routinely created from test threads.
    #[cfg(target_os = "linux")]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        use winit::platform::x11::EventLoopBuilderExtX11;

        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }
    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
    }

    builder.build()
}

unsafe fn build_offscreen_surface(
    gl: &gl::Gl,
) -> Result<(gl::types::GLuint, gl::types::GLuint), ContextCreationError> {
    let mut renderbuffer = 0;
    gl.GenRenderbuffers(1, &mut renderbuffer);
    gl.BindRenderbuffer(gl::RENDERBUFFER, renderbuffer);
    gl.RenderbufferStorage(
        gl::RENDERBUFFER,
        gl::RGBA8,
        SURFACE_SIZE as gl::types::GLsizei,
        SURFACE_SIZE as gl::types::GLsizei,
    );

    let mut framebuffer = 0;
    gl.GenFramebuffers(1, &mut framebuffer);
    gl.BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
    gl.FramebufferRenderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        renderbuffer,
    );

    let status = gl.CheckFramebufferStatus(gl::FRAMEBUFFER);
    if status != gl::FRAMEBUFFER_COMPLETE {
        gl.DeleteFramebuffers(1, &framebuffer);
        gl.DeleteRenderbuffers(1, &renderbuffer);
        return Err(ContextCreationError::IncompleteFramebuffer(status));
    }

    gl.Viewport(0, 0, SURFACE_SIZE as i32, SURFACE_SIZE as i32);

    Ok((framebuffer, renderbuffer))
}

/// Human-readable name of a GL error code, for diagnostics.
pub fn error_name(error: gl::types::GLenum) -> &'static str {
    match error {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

/// Error that can be triggered when creating a `HarnessContext`.
#[derive(Debug)]
pub enum ContextCreationError {
    /// The platform display or hidden window could not be built.
    Display(String),
    /// The GL context could not be created.
    Context(glutin::error::Error),
    /// The window surface could not be created.
    Surface(glutin::error::Error),
    /// The context could not be made current.
    MakeCurrent(glutin::error::Error),
    /// The offscreen verification framebuffer is incomplete.
    IncompleteFramebuffer(gl::types::GLenum),
}

impl fmt::Display for ContextCreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContextCreationError::Display(message) => {
                write!(formatter, "failed to create the display: {}", message)
            }
            ContextCreationError::Context(error) => {
                write!(formatter, "failed to create the GL context: {}", error)
            }
            ContextCreationError::Surface(error) => {
                write!(formatter, "failed to create the window surface: {}", error)
            }
            ContextCreationError::MakeCurrent(error) => {
                write!(formatter, "failed to make the context current: {}", error)
            }
            ContextCreationError::IncompleteFramebuffer(status) => {
                write!(
                    formatter,
                    "verification framebuffer is incomplete (status 0x{:x})",
                    status
                )
            }
        }
    }
}

impl Error for ContextCreationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ContextCreationError::Context(error)
            | ContextCreationError::Surface(error)
            | ContextCreationError::MakeCurrent(error) => Some(error),
            _ => None,
        }
    }
}
